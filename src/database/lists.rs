use super::Store;
use crate::error::StoreResult;
use crate::model::*;

pub trait ListDb {
    fn lists_of(&self, user_id: u64) -> StoreResult<Vec<Row<List>>>;
    fn movies_in(&self, list_id: u64) -> StoreResult<Vec<Row<Movie>>>;
    /// Deletes the list along with its memberships.
    fn remove_list(&self, list_id: u64) -> StoreResult<Option<Row<List>>>;
}

impl ListDb for Store {
    fn lists_of(&self, user_id: u64) -> StoreResult<Vec<Row<List>>> {
        self.lists.find_all_by(|list| list.user_id == user_id)
    }

    fn movies_in(&self, list_id: u64) -> StoreResult<Vec<Row<Movie>>> {
        let ids = self.list_movies.get_related(list_id)?;
        self.movies.find_many(&ids)
    }

    fn remove_list(&self, list_id: u64) -> StoreResult<Option<Row<List>>> {
        let removed = self.lists.destroy(list_id)?;
        if removed.is_some() {
            self.list_movies.remove_left(list_id)?;
        }
        Ok(removed)
    }
}
