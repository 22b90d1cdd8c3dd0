//! JSON file document store.
//!
//! Documents live at `<root>/<collection>/<id>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;

use crate::store::{check_collection, check_key, merge_json, DocumentStore, StoreError};

/// A store backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::WriteError {
            path: root.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { root })
    }

    /// Directory holding the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, collection: &str, id: &str) -> PathBuf {
        self.root.join(collection).join(format!("{}.json", id))
    }

    fn read(&self, path: &Path, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|e| StoreError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                collection: collection.to_string(),
                id: id.to_string(),
                message: e.to_string(),
            })
    }
}

fn write_error(path: &Path, e: impl ToString) -> StoreError {
    StoreError::WriteError {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

impl DocumentStore for FileStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        check_key(collection, id)?;
        self.read(&self.document_path(collection, id), collection, id)
    }

    fn set(
        &self,
        collection: &str,
        id: &str,
        value: Value,
        merge: bool,
    ) -> Result<(), StoreError> {
        check_key(collection, id)?;
        let path = self.document_path(collection, id);

        let value = match self.read(&path, collection, id)? {
            Some(mut existing) if merge => {
                merge_json(&mut existing, value);
                existing
            }
            _ => value,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
        }

        let json = serde_json::to_string_pretty(&value).map_err(|e| write_error(&path, e))?;

        // Write to a sibling temp file first so readers never see a partial document
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| write_error(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| write_error(&path, e))?;

        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        check_key(collection, id)?;
        let path = self.document_path(collection, id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| write_error(&path, e))?;
        Ok(true)
    }

    fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError> {
        check_collection(collection)?;
        let dir = self.root.join(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut docs = Vec::new();
        for entry in WalkDir::new(&dir)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            // One unreadable file must not hide the rest of the collection
            match self.read(path, collection, id) {
                Ok(Some(doc)) => docs.push((id.to_string(), doc)),
                Ok(None) => {}
                Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
            }
        }

        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn round_trips_documents_on_disk() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path().join("data")).unwrap();

        store
            .set("sites", "ana", json!({ "clientId": "ana" }), false)
            .unwrap();

        assert!(temp.path().join("data/sites/ana.json").exists());
        assert_eq!(
            store.get("sites", "ana").unwrap(),
            Some(json!({ "clientId": "ana" }))
        );
    }

    #[test]
    fn merges_into_existing_file() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        store
            .set("sites", "ana", json!({ "a": 1, "colors": { "text": "#000" } }), false)
            .unwrap();

        store
            .set("sites", "ana", json!({ "colors": { "accent": "#f00" } }), true)
            .unwrap();

        assert_eq!(
            store.get("sites", "ana").unwrap(),
            Some(json!({ "a": 1, "colors": { "text": "#000", "accent": "#f00" } }))
        );
    }

    #[test]
    fn lists_nested_collections_only() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        store
            .set("clients/ana/inquiries", "q2", json!({ "n": 2 }), false)
            .unwrap();
        store
            .set("clients/ana/inquiries", "q1", json!({ "n": 1 }), false)
            .unwrap();
        store.set("sites", "ana", json!({}), false).unwrap();

        let listed = store.list("clients/ana/inquiries").unwrap();
        let ids: Vec<&str> = listed.iter().map(|(id, _)| id.as_str()).collect();

        assert_eq!(ids, vec!["q1", "q2"]);
        assert!(store.list("missing").unwrap().is_empty());
    }

    #[test]
    fn reports_corrupt_documents() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        fs::create_dir_all(temp.path().join("sites")).unwrap();
        fs::write(temp.path().join("sites/bad.json"), "{ not json").unwrap();

        assert!(matches!(
            store.get("sites", "bad"),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn deletes_files() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        store.set("sites", "ana", json!({}), false).unwrap();

        assert!(store.delete("sites", "ana").unwrap());
        assert_eq!(store.get("sites", "ana").unwrap(), None);
    }

    #[test]
    fn list_skips_corrupt_files() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        store
            .set("sites", "ana", json!({ "clientId": "ana" }), false)
            .unwrap();
        fs::write(temp.path().join("sites/bad.json"), "{ not json").unwrap();

        let docs = store.list("sites").unwrap();

        assert_eq!(docs, vec![("ana".to_string(), json!({ "clientId": "ana" }))]);
    }
}
