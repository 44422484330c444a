mod forum;
mod genres;
mod lists;
mod movies;
mod relation;
mod table;
mod users;

pub use forum::ForumDb;
pub use genres::GenreDb;
pub use lists::ListDb;
pub use movies::{MovieDb, MoviePage, SuggestFilter};
pub use relation::Relation;
pub use table::Table;
pub use users::UserDb;

use crate::config::Config;
use crate::error::StoreResult;
use crate::model::*;
use log::info;

const AUTHORS: &str = "authors";
const POSTS: &str = "posts";
const USERS: &str = "users";
const USERS_EMAIL: &str = "users_email";
const MOVIES: &str = "movies";
const MOVIES_TITLE: &str = "movies_title";
const MOVIES_EXTERNAL_ID: &str = "movies_external_id";
const GENRES: &str = "genres";
const GENRES_EXTERNAL_ID: &str = "genres_external_id";
const LISTS: &str = "lists";
const FORUM_CATEGORIES: &str = "forum_categories";
const FORUM_TOPICS: &str = "forum_topics";
const FORUM_POSTS: &str = "forum_posts";
const USER_MOVIES: &str = "user_movies";
const LIST_MOVIES: &str = "list_movies";
const MOVIE_GENRES: &str = "movie_genres";

/// Handle to every table and association. Cloning is cheap, all clones share
/// the same database.
#[derive(Clone)]
pub struct Store {
    db: sled::Db,
    pub authors: Table<Author>,
    pub posts: Table<Post>,
    pub users: Table<User>,
    pub movies: Table<Movie>,
    pub genres: Table<Genre>,
    pub lists: Table<List>,
    pub forum_categories: Table<ForumCategory>,
    pub forum_topics: Table<ForumTopic>,
    pub forum_posts: Table<ForumPost>,
    /// user id -> movie id
    pub favorites: Relation,
    /// list id -> movie id
    pub list_movies: Relation,
    /// movie id -> genre id
    pub movie_genres: Relation,
    users_email: sled::Tree,
    movies_title: sled::Tree,
    movies_external_id: sled::Tree,
    genres_external_id: sled::Tree,
}

impl Store {
    pub fn open(config: &Config) -> StoreResult<Self> {
        let db = match &config.database_url {
            Some(path) => {
                info!("Opening store at {}", path.display());
                sled::open(path)?
            }
            None => {
                info!("Opening temporary store");
                sled::Config::new().temporary(true).open()?
            }
        };
        Self::from_db(db)
    }

    pub fn from_db(db: sled::Db) -> StoreResult<Self> {
        Ok(Store {
            authors: Table::open(&db, AUTHORS)?,
            posts: Table::open(&db, POSTS)?,
            users: Table::open(&db, USERS)?,
            movies: Table::open(&db, MOVIES)?,
            genres: Table::open(&db, GENRES)?,
            lists: Table::open(&db, LISTS)?,
            forum_categories: Table::open(&db, FORUM_CATEGORIES)?,
            forum_topics: Table::open(&db, FORUM_TOPICS)?,
            forum_posts: Table::open(&db, FORUM_POSTS)?,
            favorites: Relation::open(&db, USER_MOVIES)?,
            list_movies: Relation::open(&db, LIST_MOVIES)?,
            movie_genres: Relation::open(&db, MOVIE_GENRES)?,
            users_email: db.open_tree(USERS_EMAIL)?,
            movies_title: db.open_tree(MOVIES_TITLE)?,
            movies_external_id: db.open_tree(MOVIES_EXTERNAL_ID)?,
            genres_external_id: db.open_tree(GENRES_EXTERNAL_ID)?,
            db,
        })
    }

    /// Writes everything to disk. Called once on shutdown.
    pub fn flush(&self) -> StoreResult<usize> {
        Ok(self.db.flush()?)
    }

    #[cfg(test)]
    pub fn temporary() -> Self {
        let db = sled::Config::new().temporary(true).open().unwrap();
        Self::from_db(db).unwrap()
    }
}
