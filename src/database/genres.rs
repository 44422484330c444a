use super::table::{deserialize_id, serialize_id, Table};
use super::{Store, GENRES_EXTERNAL_ID};
use crate::error::{StoreError, StoreResult};
use crate::model::*;
use sled::transaction::ConflictableTransactionResult;
use sled::Transactional;

pub trait GenreDb {
    /// Returns the genre mirrored from the provider's `external_id`, creating
    /// it on first sight.
    fn find_or_create_genre(&self, external_id: i64, name: &str) -> StoreResult<Row<Genre>>;
    /// Deletes the genre and unlinks it from every movie.
    fn remove_genre(&self, id: u64) -> StoreResult<Option<Row<Genre>>>;
}

impl GenreDb for Store {
    fn find_or_create_genre(&self, external_id: i64, name: &str) -> StoreResult<Row<Genre>> {
        let id = self.genres.next_id()?;
        let key = serialize_id(id);
        let external_key = external_id.to_be_bytes();
        let genre = Genre {
            name: name.to_owned(),
            external_id: Some(external_id),
        };
        let data = Table::encode(&genre)?;

        let existing = (self.genres.tree(), &self.genres_external_id).transaction(
            |(genres, index)| -> ConflictableTransactionResult<_, StoreError> {
                if let Some(existing) = index.get(&external_key[..])? {
                    return Ok(Some(existing));
                }
                index.insert(&external_key[..], &key[..])?;
                genres.insert(&key[..], data.as_slice())?;
                Ok(None)
            },
        )?;

        match existing {
            Some(existing) => self
                .genres
                .find_by_key(deserialize_id(existing, GENRES_EXTERNAL_ID)?)?
                .ok_or(StoreError::CorruptKey(GENRES_EXTERNAL_ID)),
            None => Ok(Row { id, value: genre }),
        }
    }

    fn remove_genre(&self, id: u64) -> StoreResult<Option<Row<Genre>>> {
        let removed = match self.genres.destroy(id)? {
            Some(removed) => removed,
            None => return Ok(None),
        };
        if let Some(external_id) = removed.value.external_id {
            self.genres_external_id.remove(external_id.to_be_bytes())?;
        }
        self.movie_genres.remove_right(id)?;
        Ok(Some(removed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MovieDb;

    #[test]
    fn find_or_create_is_idempotent() {
        let store = Store::temporary();
        let first = store.find_or_create_genre(12, "Adventure").unwrap();
        let second = store.find_or_create_genre(12, "Adventure").unwrap();
        assert_eq!(first, second);
        assert_eq!(store.genres.count(), 1);
        let other = store.find_or_create_genre(18, "Drama").unwrap();
        assert_ne!(other.id, first.id);
    }

    #[test]
    fn removing_unlinks_movies() {
        let store = Store::temporary();
        let genre = store.find_or_create_genre(12, "Adventure").unwrap();
        let movie = store
            .create_movie(
                Movie {
                    title: "Heat".to_owned(),
                    ..Movie::default()
                },
                &[genre.id],
            )
            .unwrap();
        assert_eq!(store.genres_of(movie.id).unwrap(), vec![genre.clone()]);
        assert_eq!(store.remove_genre(genre.id).unwrap(), Some(genre));
        assert!(store.genres_of(movie.id).unwrap().is_empty());
        assert_eq!(store.remove_genre(999).unwrap(), None);
        let again = store.find_or_create_genre(12, "Adventure").unwrap();
        assert_eq!(store.genres.count(), 1);
        assert_eq!(again.value.name, "Adventure");
    }
}
