use crate::auth::Authenticator;
use crate::database::{ForumDb, GenreDb, MovieDb, Store, UserDb};
use crate::error::Error;
use crate::model::*;
use chrono::{NaiveDate, Utc};
use log::info;

/// Fills an empty store with demo accounts and content. Does nothing once
/// any user exists.
pub fn bootstrap(store: &Store, auth: &Authenticator) -> Result<(), Error> {
    if store.users.count() > 0 {
        return Ok(());
    }
    info!("Seeding empty store");

    let admin = store.add_user(User {
        email: "admin@email.com".to_owned(),
        password_hash: auth.hash_password("123")?,
        first_name: "James".to_owned(),
        last_name: "Bond".to_owned(),
        role: Role::Sysadmin,
    })?;
    let user = store.add_user(User {
        email: "user@email.com".to_owned(),
        password_hash: auth.hash_password("123")?,
        first_name: "Jane".to_owned(),
        last_name: "Doe".to_owned(),
        role: Role::User,
    })?;

    let category = store.forum_categories.create(ForumCategory::new(
        "First forum category".to_owned(),
        Some("This is a lorem ipsum category.".to_owned()),
    ))?;
    let topic = store.add_topic(ForumTopic {
        title: "This is a lorem ipsum topic.".to_owned(),
        message: "Hello, I have a question!".to_owned(),
        views: 0,
        category_id: category.id,
        user_id: Some(user.id),
        created_at: Utc::now(),
    })?;
    store.add_post(ForumPost {
        message: "This is a lorem ipsum post.".to_owned(),
        topic_id: topic.id,
        user_id: Some(admin.id),
        created_at: Utc::now(),
    })?;

    let adventure = store.find_or_create_genre(12, "Adventure")?;
    let movie = store.create_movie(
        Movie {
            title: "The Lord of the Rings: The Return of the King".to_owned(),
            poster: Some(
                "http://image.tmdb.org/t/p/w342/rCzpDGLbOoPwLjy3OAm5NUPOTrC.jpg".to_owned(),
            ),
            backdrop_path: Some(
                "http://image.tmdb.org/t/p/w780/2u7zbn8EudG6kLlBzUYqP8RyFU4.jpg".to_owned(),
            ),
            description: Some(
                "Aragorn is revealed as the heir to the ancient kings as he, Gandalf and the \
                 other members of the broken fellowship struggle to save Gondor."
                    .to_owned(),
            ),
            external_id: Some(122),
            vote_average: Some(8.0),
            release_date: NaiveDate::from_ymd_opt(2003, 12, 1),
            featured: true,
            forum_category_id: None,
        },
        &[adventure.id],
    )?;
    store.toggle_favorite(admin.id, movie.id)?;

    let favorites = store.lists.create(List {
        title: "My Favorite Movies".to_owned(),
        user_id: admin.id,
    })?;
    store.list_movies.add_related(favorites.id, movie.id)?;
    store.lists.create(List {
        title: "My Next Best Movies".to_owned(),
        user_id: admin.id,
    })?;

    store.posts.create(Post {
        title: "A Post".to_owned(),
        text: "A Text".to_owned(),
        author_id: None,
    })?;
    Ok(())
}
