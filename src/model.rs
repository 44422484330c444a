use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A stored record together with the key it lives under.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<T> {
    pub id: u64,
    pub value: T,
}

#[derive(async_graphql::Enum, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Sysadmin,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Movie {
    pub title: String,
    pub poster: Option<String>,
    pub backdrop_path: Option<String>,
    pub description: Option<String>,
    pub external_id: Option<i64>,
    pub vote_average: Option<f64>,
    pub release_date: Option<NaiveDate>,
    pub featured: bool,
    pub forum_category_id: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Genre {
    pub name: String,
    pub external_id: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct List {
    pub title: String,
    pub user_id: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ForumCategory {
    pub title: String,
    pub description: Option<String>,
    pub views: u32,
    pub posts: u32,
    pub movie_id: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ForumCategory {
    pub fn new(title: String, description: Option<String>) -> Self {
        let now = Utc::now();
        ForumCategory {
            title,
            description,
            views: 0,
            posts: 0,
            movie_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ForumTopic {
    pub title: String,
    pub message: String,
    pub views: u32,
    pub category_id: u64,
    pub user_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ForumPost {
    pub message: String,
    pub topic_id: u64,
    pub user_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Author {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Post {
    pub title: String,
    pub text: String,
    pub author_id: Option<u64>,
}
