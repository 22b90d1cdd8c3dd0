//! The document store contract.

use serde_json::Value;

/// Errors that can occur when talking to a store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid document key: {0}")]
    InvalidKey(String),

    #[error("Failed to read {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    WriteError { path: String, message: String },

    #[error("Stored document {collection}/{id} is malformed: {message}")]
    Corrupt {
        collection: String,
        id: String,
        message: String,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A document store addressed by collection name and document id.
///
/// Collections may be nested with `/` (`clients/abc/inquiries`). Writes are
/// last-writer-wins; there is no versioning.
pub trait DocumentStore: Send + Sync {
    /// Fetch one document.
    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Write a document. With `merge`, object fields are merged into the
    /// stored document instead of replacing it.
    fn set(&self, collection: &str, id: &str, value: Value, merge: bool)
        -> Result<(), StoreError>;

    /// Delete a document. Returns whether it existed.
    fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// Every document in a collection, sorted by id.
    fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError>;

    /// Documents whose top-level `field` equals `value`.
    fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Value)>, StoreError> {
        Ok(self
            .list(collection)?
            .into_iter()
            .filter(|(_, doc)| doc.get(field) == Some(value))
            .collect())
    }
}

/// Deep-merge `patch` into `target`.
///
/// Objects merge key by key; every other value, arrays included, replaces
/// what was there.
pub fn merge_json(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

/// Check that a collection path and id are safe to use as storage keys.
pub(crate) fn check_key(collection: &str, id: &str) -> Result<(), StoreError> {
    check_collection(collection)?;
    if !is_safe_segment(id) {
        return Err(StoreError::InvalidKey(id.to_string()));
    }
    Ok(())
}

pub(crate) fn check_collection(collection: &str) -> Result<(), StoreError> {
    if collection.split('/').all(is_safe_segment) {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(collection.to_string()))
    }
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.len() <= 128
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
