//! Namespaced key-value preference store.
//!
//! Persists model-cache metadata as a flat JSON object on disk. Per
//! artifact there are two entries, `<ns>.<model>.model-hash` and
//! `<ns>.<model>.model-size`, where `<ns>` is the `<bundle-id>.<app-name>`
//! namespace. Writes set both keys together, removal deletes both, and a
//! record with either key missing reads as "not cached".

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::record::ModelCacheRecord;

/// Key suffix for the content-hash entry.
pub const HASH_SUFFIX: &str = "model-hash";

/// Key suffix for the size entry.
pub const SIZE_SUFFIX: &str = "model-size";

/// Error types for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access preference store: {0}")]
    Io(#[from] io::Error),

    #[error("malformed preference store: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A preference store scoped to one `<bundle-id>.<app-name>` namespace.
///
/// All entries (any namespace) live in one JSON object file; an instance
/// only reads and writes keys under its own namespace. Saves are
/// write-through with a temp-file rename, so the file on disk is never half
/// written.
#[derive(Debug)]
pub struct PrefStore {
    path: PathBuf,
    namespace: String,
    entries: BTreeMap<String, String>,
}

impl PrefStore {
    /// Open (or create) the store file at `path`, scoped to `namespace`.
    pub fn open(path: impl Into<PathBuf>, namespace: impl Into<String>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => {
                let object: Map<String, Value> = serde_json::from_str(&contents)?;
                object
                    .into_iter()
                    .filter_map(|(k, v)| match v {
                        Value::String(s) => Some((k, s)),
                        _ => None,
                    })
                    .collect()
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            namespace: namespace.into(),
            entries,
        })
    }

    /// The store's namespace prefix.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn hash_key(&self, model: &str) -> String {
        format!("{}.{}.{}", self.namespace, model, HASH_SUFFIX)
    }

    fn size_key(&self, model: &str) -> String {
        format!("{}.{}.{}", self.namespace, model, SIZE_SUFFIX)
    }

    /// Persist a record: both entries are set together, then written
    /// through to disk.
    pub fn save_record(&mut self, record: &ModelCacheRecord) -> Result<(), StoreError> {
        self.entries
            .insert(self.hash_key(&record.name), record.sha256.clone());
        self.entries
            .insert(self.size_key(&record.name), record.size_bytes.to_string());
        self.persist()
    }

    /// Read the record for `model`. Absence of either entry, or a size that
    /// does not parse, reads as not cached.
    pub fn load_record(&self, model: &str) -> Option<ModelCacheRecord> {
        let sha256 = self.entries.get(&self.hash_key(model))?;
        let size_bytes: u64 = self.entries.get(&self.size_key(model))?.parse().ok()?;
        Some(ModelCacheRecord::new(model, sha256.clone(), size_bytes))
    }

    /// Drop both entries for `model` and write through. Removing a model
    /// that was never cached is a no-op.
    pub fn remove_record(&mut self, model: &str) -> Result<(), StoreError> {
        let had_hash = self.entries.remove(&self.hash_key(model)).is_some();
        let had_size = self.entries.remove(&self.size_key(model)).is_some();
        if had_hash || had_size {
            self.persist()?;
        }
        Ok(())
    }

    /// True when both entries for `model` are present.
    pub fn is_cached(&self, model: &str) -> bool {
        self.load_record(model).is_some()
    }

    fn persist(&self) -> Result<(), StoreError> {
        let object: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        let json = serde_json::to_string_pretty(&Value::Object(object))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "com.example.app.DemoApp";

    fn record(name: &str) -> ModelCacheRecord {
        ModelCacheRecord::new(name, "ab".repeat(32), 2048)
    }

    fn open_store(tmp: &tempfile::TempDir) -> PrefStore {
        PrefStore::open(tmp.path().join("prefs.json"), NS).unwrap()
    }

    #[test]
    fn test_save_sets_both_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = open_store(&tmp);
        store.save_record(&record("ranker")).unwrap();

        let contents = fs::read_to_string(tmp.path().join("prefs.json")).unwrap();
        assert!(contents.contains("com.example.app.DemoApp.ranker.model-hash"));
        assert!(contents.contains("com.example.app.DemoApp.ranker.model-size"));
    }

    #[test]
    fn test_load_roundtrips_record() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = open_store(&tmp);
        let original = record("ranker");
        store.save_record(&original).unwrap();

        assert_eq!(store.load_record("ranker"), Some(original));
        assert!(store.is_cached("ranker"));
    }

    #[test]
    fn test_absent_model_reads_as_not_cached() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(&tmp);
        assert_eq!(store.load_record("ranker"), None);
        assert!(!store.is_cached("ranker"));
    }

    #[test]
    fn test_missing_size_key_reads_as_not_cached() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("prefs.json");
        fs::write(
            &path,
            format!(r#"{{"{}.ranker.model-hash": "abcd"}}"#, NS),
        )
        .unwrap();

        let store = PrefStore::open(&path, NS).unwrap();
        assert_eq!(store.load_record("ranker"), None);
    }

    #[test]
    fn test_unparsable_size_reads_as_not_cached() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("prefs.json");
        fs::write(
            &path,
            format!(
                r#"{{"{ns}.ranker.model-hash": "abcd", "{ns}.ranker.model-size": "lots"}}"#,
                ns = NS
            ),
        )
        .unwrap();

        let store = PrefStore::open(&path, NS).unwrap();
        assert_eq!(store.load_record("ranker"), None);
    }

    #[test]
    fn test_remove_deletes_both_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = open_store(&tmp);
        store.save_record(&record("ranker")).unwrap();
        store.remove_record("ranker").unwrap();

        assert!(!store.is_cached("ranker"));
        let contents = fs::read_to_string(tmp.path().join("prefs.json")).unwrap();
        assert!(!contents.contains("ranker"));
    }

    #[test]
    fn test_remove_uncached_model_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = open_store(&tmp);
        store.remove_record("never-saved").unwrap();
        assert!(!tmp.path().join("prefs.json").exists());
    }

    #[test]
    fn test_reopen_sees_persisted_state() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("prefs.json");
        {
            let mut store = PrefStore::open(&path, NS).unwrap();
            store.save_record(&record("ranker")).unwrap();
        }

        let reopened = PrefStore::open(&path, NS).unwrap();
        assert!(reopened.is_cached("ranker"));
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("prefs.json");
        {
            let mut store = PrefStore::open(&path, "com.example.app.A").unwrap();
            store.save_record(&record("ranker")).unwrap();
        }
        {
            let mut other = PrefStore::open(&path, "com.example.app.B").unwrap();
            assert!(!other.is_cached("ranker"));
            other.save_record(&record("ranker")).unwrap();
            other.remove_record("ranker").unwrap();
        }

        let original = PrefStore::open(&path, "com.example.app.A").unwrap();
        assert!(original.is_cached("ranker"));
    }

    #[test]
    fn test_open_rejects_malformed_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            PrefStore::open(&path, NS),
            Err(StoreError::Parse(_))
        ));
    }
}
