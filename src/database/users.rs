use super::table::{abort, deserialize_id, serialize_id, Table};
use super::{Store, USERS_EMAIL};
use crate::error::{StoreError, StoreResult};
use crate::model::*;
use sled::Transactional;

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

pub trait UserDb {
    /// Fails with `Duplicate` if the email is already registered. Emails
    /// compare case-insensitively.
    fn add_user(&self, user: User) -> StoreResult<Row<User>>;
    fn get_user(&self, id: u64) -> StoreResult<Option<Row<User>>>;
    fn get_user_by_email(&self, email: &str) -> StoreResult<Option<Row<User>>>;
    fn favorites_of(&self, user_id: u64) -> StoreResult<Vec<Row<Movie>>>;
    /// Adds the movie to the user's favorites, or removes it if it already
    /// is one. Returns whether it is a favorite afterwards.
    fn toggle_favorite(&self, user_id: u64, movie_id: u64) -> StoreResult<bool>;
}

impl UserDb for Store {
    fn add_user(&self, user: User) -> StoreResult<Row<User>> {
        let id = self.users.next_id()?;
        let key = serialize_id(id);
        let email = email_key(&user.email);
        let data = Table::encode(&user)?;
        (self.users.tree(), &self.users_email).transaction(|(users, users_email)| {
            if users_email.insert(email.as_bytes(), &key[..])?.is_some() {
                return Err(abort(StoreError::Duplicate {
                    entity: "user",
                    field: "email",
                }));
            }
            users.insert(&key[..], data.as_slice())?;
            Ok(())
        })?;
        Ok(Row { id, value: user })
    }

    fn get_user(&self, id: u64) -> StoreResult<Option<Row<User>>> {
        self.users.find_by_key(id)
    }

    fn get_user_by_email(&self, email: &str) -> StoreResult<Option<Row<User>>> {
        match self.users_email.get(email_key(email))? {
            Some(id) => self.users.find_by_key(deserialize_id(id, USERS_EMAIL)?),
            None => Ok(None),
        }
    }

    fn favorites_of(&self, user_id: u64) -> StoreResult<Vec<Row<Movie>>> {
        let ids = self.favorites.get_related(user_id)?;
        self.movies.find_many(&ids)
    }

    fn toggle_favorite(&self, user_id: u64, movie_id: u64) -> StoreResult<bool> {
        if self.favorites.remove_related(user_id, movie_id)? {
            Ok(false)
        } else {
            self.favorites.add_related(user_id, movie_id)?;
            Ok(true)
        }
    }
}
