use crate::error::{StoreError, StoreResult};
use crate::model::Row;
use serde::{de::DeserializeOwned, Serialize};
use sled::transaction::ConflictableTransactionError;
use std::marker::PhantomData;
use std::ops::Bound;

/// Ids are stored big-endian so that key order is creation order.
pub fn serialize_id(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

pub fn deserialize_id<V: AsRef<[u8]>>(id: V, tree: &'static str) -> StoreResult<u64> {
    use std::convert::TryInto;
    let bytes: [u8; 8] = id
        .as_ref()
        .try_into()
        .map_err(|_| StoreError::CorruptKey(tree))?;
    Ok(u64::from_be_bytes(bytes))
}

pub(crate) fn abort<E: Into<StoreError>>(err: E) -> ConflictableTransactionError<StoreError> {
    ConflictableTransactionError::Abort(err.into())
}

/// One entity kind, stored as bincode rows in its own tree.
pub struct Table<T> {
    name: &'static str,
    db: sled::Db,
    tree: sled::Tree,
    _row: PhantomData<fn() -> T>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Table {
            name: self.name,
            db: self.db.clone(),
            tree: self.tree.clone(),
            _row: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> Table<T> {
    pub fn open(db: &sled::Db, name: &'static str) -> StoreResult<Self> {
        Ok(Table {
            name,
            db: db.clone(),
            tree: db.open_tree(name)?,
            _row: PhantomData,
        })
    }

    pub(crate) fn tree(&self) -> &sled::Tree {
        &self.tree
    }

    /// Ids are unique across the whole database and never 0.
    pub fn next_id(&self) -> StoreResult<u64> {
        Ok(self.db.generate_id()? + 1)
    }

    pub fn encode(value: &T) -> StoreResult<Vec<u8>> {
        Ok(bincode::serialize(value)?)
    }

    fn decode<K: AsRef<[u8]>, V: AsRef<[u8]>>(&self, key: K, data: V) -> StoreResult<Row<T>> {
        Ok(Row {
            id: deserialize_id(key, self.name)?,
            value: bincode::deserialize(data.as_ref())?,
        })
    }

    pub fn find_by_key(&self, id: u64) -> StoreResult<Option<Row<T>>> {
        match self.tree.get(serialize_id(id))? {
            Some(data) => Ok(Some(Row {
                id,
                value: bincode::deserialize(&data)?,
            })),
            None => Ok(None),
        }
    }

    /// Rows for the given ids, in the given order. Ids without a row are skipped.
    pub fn find_many(&self, ids: &[u64]) -> StoreResult<Vec<Row<T>>> {
        let mut rows = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(row) = self.find_by_key(*id)? {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    pub fn find_all(&self) -> StoreResult<Vec<Row<T>>> {
        self.find_all_by(|_| true)
    }

    pub fn find_all_by<P: Fn(&T) -> bool>(&self, predicate: P) -> StoreResult<Vec<Row<T>>> {
        let mut rows = Vec::new();
        for item in self.tree.iter() {
            let (key, data) = item?;
            let row = self.decode(key, data)?;
            if predicate(&row.value) {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    pub fn find_one<P: Fn(&T) -> bool>(&self, predicate: P) -> StoreResult<Option<Row<T>>> {
        for item in self.tree.iter() {
            let (key, data) = item?;
            let row = self.decode(key, data)?;
            if predicate(&row.value) {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    pub fn create(&self, value: T) -> StoreResult<Row<T>> {
        let id = self.next_id()?;
        self.tree.insert(serialize_id(id), Self::encode(&value)?)?;
        Ok(Row { id, value })
    }

    /// Applies `change` to the stored row atomically. `change` may run more
    /// than once if the row is written concurrently.
    pub fn update<F: Fn(&mut T)>(&self, id: u64, change: F) -> StoreResult<Option<Row<T>>> {
        let key = serialize_id(id);
        let updated = self.tree.transaction(|tree| {
            let data = match tree.get(&key[..])? {
                Some(data) => data,
                None => return Ok(None),
            };
            let mut value: T = bincode::deserialize(&data).map_err(abort)?;
            change(&mut value);
            tree.insert(&key[..], bincode::serialize(&value).map_err(abort)?)?;
            Ok(Some(value))
        })?;
        Ok(updated.map(|value| Row { id, value }))
    }

    pub fn destroy(&self, id: u64) -> StoreResult<Option<Row<T>>> {
        match self.tree.remove(serialize_id(id))? {
            Some(data) => Ok(Some(Row {
                id,
                value: bincode::deserialize(&data)?,
            })),
            None => Ok(None),
        }
    }

    /// Up to `limit` rows with an id strictly greater than `after`.
    pub fn after(&self, after: Option<u64>, limit: usize) -> StoreResult<Vec<Row<T>>> {
        let start = match after {
            Some(id) => Bound::Excluded(serialize_id(id).to_vec()),
            None => Bound::Unbounded,
        };
        let mut rows = Vec::new();
        for item in self
            .tree
            .range::<Vec<u8>, _>((start, Bound::Unbounded))
            .take(limit)
        {
            let (key, data) = item?;
            rows.push(self.decode(key, data)?);
        }
        Ok(rows)
    }

    pub fn any_after(&self, id: u64) -> StoreResult<bool> {
        let start = Bound::Excluded(serialize_id(id).to_vec());
        match self
            .tree
            .range::<Vec<u8>, _>((start, Bound::Unbounded))
            .next()
        {
            Some(item) => item.map(|_| true).map_err(StoreError::from),
            None => Ok(false),
        }
    }

    pub fn count(&self) -> usize {
        self.tree.len()
    }
}
