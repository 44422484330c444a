use super::table::{deserialize_id, serialize_id};
use crate::error::StoreResult;

pub fn pair_key(left: u64, right: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&serialize_id(left));
    key[8..].copy_from_slice(&serialize_id(right));
    key
}

/// A many-to-many association stored as a set of `(left, right)` keys.
#[derive(Clone)]
pub struct Relation {
    name: &'static str,
    tree: sled::Tree,
}

impl Relation {
    pub fn open(db: &sled::Db, name: &'static str) -> StoreResult<Self> {
        Ok(Relation {
            name,
            tree: db.open_tree(name)?,
        })
    }

    pub(crate) fn tree(&self) -> &sled::Tree {
        &self.tree
    }

    pub fn get_related(&self, left: u64) -> StoreResult<Vec<u64>> {
        let mut related = Vec::new();
        for item in self.tree.scan_prefix(serialize_id(left)) {
            let (key, _) = item?;
            related.push(deserialize_id(&key[8..], self.name)?);
        }
        Ok(related)
    }

    pub fn contains(&self, left: u64, right: u64) -> StoreResult<bool> {
        Ok(self.tree.contains_key(pair_key(left, right))?)
    }

    /// Returns `false` if the pair was already present.
    pub fn add_related(&self, left: u64, right: u64) -> StoreResult<bool> {
        Ok(self
            .tree
            .insert(pair_key(left, right), &b""[..])?
            .is_none())
    }

    /// Returns `false` if the pair was not present.
    pub fn remove_related(&self, left: u64, right: u64) -> StoreResult<bool> {
        Ok(self.tree.remove(pair_key(left, right))?.is_some())
    }

    pub fn set_related(&self, left: u64, rights: &[u64]) -> StoreResult<()> {
        let mut batch = sled::Batch::default();
        for item in self.tree.scan_prefix(serialize_id(left)) {
            let (key, _) = item?;
            batch.remove(key);
        }
        for right in rights {
            batch.insert(&pair_key(left, *right)[..], &b""[..]);
        }
        Ok(self.tree.apply_batch(batch)?)
    }

    pub fn remove_left(&self, left: u64) -> StoreResult<()> {
        self.set_related(left, &[])
    }

    pub fn remove_right(&self, right: u64) -> StoreResult<()> {
        let mut batch = sled::Batch::default();
        for item in self.tree.iter() {
            let (key, _) = item?;
            if deserialize_id(&key[8..], self.name)? == right {
                batch.remove(key);
            }
        }
        Ok(self.tree.apply_batch(batch)?)
    }
}
