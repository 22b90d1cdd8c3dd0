//! In-memory document store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde_json::Value;

use crate::store::{check_collection, check_key, merge_json, DocumentStore, StoreError};

type Key = (String, String);

/// A store that keeps documents in memory. Used for previews and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<Key, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents across all collections.
    pub fn len(&self) -> usize {
        self.docs.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("memory store lock poisoned".to_string())
}

impl DocumentStore for MemoryStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        check_key(collection, id)?;
        let docs = self.docs.read().map_err(poisoned)?;
        Ok(docs
            .get(&(collection.to_string(), id.to_string()))
            .cloned())
    }

    fn set(
        &self,
        collection: &str,
        id: &str,
        value: Value,
        merge: bool,
    ) -> Result<(), StoreError> {
        check_key(collection, id)?;
        let mut docs = self.docs.write().map_err(poisoned)?;
        let key = (collection.to_string(), id.to_string());

        if merge {
            if let Some(existing) = docs.get_mut(&key) {
                merge_json(existing, value);
                return Ok(());
            }
        }
        docs.insert(key, value);
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        check_key(collection, id)?;
        let mut docs = self.docs.write().map_err(poisoned)?;
        Ok(docs
            .remove(&(collection.to_string(), id.to_string()))
            .is_some())
    }

    fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError> {
        check_collection(collection)?;
        let docs = self.docs.read().map_err(poisoned)?;
        Ok(docs
            .iter()
            .filter(|((c, _), _)| c == collection)
            .map(|((_, id), doc)| (id.clone(), doc.clone()))
            .collect())
    }
}
