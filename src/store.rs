//! Persistent translation store.
//!
//! Durable key-value cache keyed by `(source_text, target_locale)`. Records
//! are write-once: `put` uses `INSERT OR IGNORE` on the composite primary
//! key, so the first writer wins and concurrent duplicate inserts for the
//! same key are harmless no-ops. No retranslation is ever performed for an
//! existing key.

use crate::error::StoreError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Composite key uniquely identifying one translation unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationKey {
    pub text: String,
    pub locale: String,
}

impl TranslationKey {
    pub fn new(text: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            locale: locale.into(),
        }
    }
}

/// One cached translation. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub source_text: String,
    pub target_locale: String,
    pub translated_text: String,
    /// RFC 3339 timestamp of the original provider success.
    pub created_at: String,
}

impl TranslationRecord {
    pub fn new(key: &TranslationKey, translated_text: impl Into<String>) -> Self {
        Self {
            source_text: key.text.clone(),
            target_locale: key.locale.clone(),
            translated_text: translated_text.into(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn key(&self) -> TranslationKey {
        TranslationKey::new(&self.source_text, &self.target_locale)
    }
}

/// Durable cache tier backed by an embedded SQLite database.
///
/// Clones share one connection; callers on the resolution path treat any
/// error from `get` as a miss.
#[derive(Clone)]
pub struct TranslationStore {
    conn: Arc<Mutex<Connection>>,
}

impl TranslationStore {
    /// Open (or create) the store at `path` and ensure the schema exists.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS translations (
                source_text TEXT NOT NULL,
                target_locale TEXT NOT NULL,
                translated_text TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (source_text, target_locale)
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Look up the cached translation for a composite key.
    pub fn get(&self, key: &TranslationKey) -> Result<Option<TranslationRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT source_text, target_locale, translated_text, created_at
             FROM translations
             WHERE source_text = ?1 AND target_locale = ?2",
        )?;

        let record = stmt
            .query_row(params![key.text, key.locale], |row| {
                Ok(TranslationRecord {
                    source_text: row.get(0)?,
                    target_locale: row.get(1)?,
                    translated_text: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })
            .optional()?;

        Ok(record)
    }

    /// Insert a record if its key is not already present.
    ///
    /// Idempotent: a duplicate insert (same key, any value) is a no-op, so
    /// concurrent resolutions racing on one key cannot corrupt the store.
    pub fn put(&self, record: &TranslationRecord) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO translations
                (source_text, target_locale, translated_text, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.source_text,
                record.target_locale,
                record.translated_text,
                record.created_at
            ],
        )?;
        Ok(())
    }

    /// All persisted records, oldest first. Used by the snapshot export.
    pub fn all(&self) -> Result<Vec<TranslationRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT source_text, target_locale, translated_text, created_at
             FROM translations
             ORDER BY created_at, source_text, target_locale",
        )?;

        let records = stmt
            .query_map([], |row| {
                Ok(TranslationRecord {
                    source_text: row.get(0)?,
                    target_locale: row.get(1)?,
                    translated_text: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Number of persisted records.
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM translations", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TranslationStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("translations.db");
        let store =
            TranslationStore::open(db_path.to_str().unwrap()).expect("Failed to open store");
        (store, temp_dir)
    }

    // ==================== Open/Schema Tests ====================

    #[test]
    fn test_store_creation() {
        let (store, _temp_dir) = create_test_store();
        assert_eq!(store.count().expect("count"), 0);
    }

    #[test]
    fn test_invalid_store_path() {
        let result = TranslationStore::open("/non/existent/path/db.db");
        assert!(result.is_err());
    }

    // ==================== get/put Tests ====================

    #[test]
    fn test_put_then_get() {
        let (store, _temp_dir) = create_test_store();

        let key = TranslationKey::new("Hello", "hi");
        let record = TranslationRecord::new(&key, "नमस्ते");
        store.put(&record).expect("put");

        let fetched = store.get(&key).expect("get").expect("should exist");
        assert_eq!(fetched.translated_text, "नमस्ते");
        assert_eq!(fetched.source_text, "Hello");
        assert_eq!(fetched.target_locale, "hi");
    }

    #[test]
    fn test_get_missing_key() {
        let (store, _temp_dir) = create_test_store();

        let key = TranslationKey::new("Never seen", "fr");
        assert!(store.get(&key).expect("get").is_none());
    }

    #[test]
    fn test_same_text_different_locales() {
        let (store, _temp_dir) = create_test_store();

        let hi = TranslationKey::new("Hello", "hi");
        let mr = TranslationKey::new("Hello", "mr");
        store.put(&TranslationRecord::new(&hi, "नमस्ते")).expect("put hi");
        store.put(&TranslationRecord::new(&mr, "नमस्कार")).expect("put mr");

        assert_eq!(
            store.get(&hi).expect("get").expect("hi").translated_text,
            "नमस्ते"
        );
        assert_eq!(
            store.get(&mr).expect("get").expect("mr").translated_text,
            "नमस्कार"
        );
        assert_eq!(store.count().expect("count"), 2);
    }

    // ==================== Write-Once Semantics ====================

    #[test]
    fn test_put_is_idempotent() {
        let (store, _temp_dir) = create_test_store();

        let key = TranslationKey::new("Hello", "hi");
        let record = TranslationRecord::new(&key, "नमस्ते");
        store.put(&record).expect("put 1");
        store.put(&record).expect("put 2");
        store.put(&record).expect("put 3");

        assert_eq!(store.count().expect("count"), 1);
    }

    #[test]
    fn test_duplicate_put_keeps_first_value() {
        let (store, _temp_dir) = create_test_store();

        let key = TranslationKey::new("Hello", "hi");
        store
            .put(&TranslationRecord::new(&key, "first"))
            .expect("put first");
        store
            .put(&TranslationRecord::new(&key, "second"))
            .expect("put second");

        let fetched = store.get(&key).expect("get").expect("exists");
        assert_eq!(
            fetched.translated_text, "first",
            "First write wins; no retranslation for an existing key"
        );
    }

    #[test]
    fn test_concurrent_duplicate_puts() {
        let (store, _temp_dir) = create_test_store();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let key = TranslationKey::new("Hello", "hi");
                    store
                        .put(&TranslationRecord::new(&key, "नमस्ते"))
                        .expect("put should not fail");
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread");
        }

        assert_eq!(store.count().expect("count"), 1);
    }

    // ==================== Persistence Tests ====================

    #[test]
    fn test_records_survive_reopen() {
        let temp_dir = TempDir::new().expect("temp dir");
        let db_path = temp_dir.path().join("translations.db");
        let path_str = db_path.to_str().unwrap();

        {
            let store = TranslationStore::open(path_str).expect("open");
            let key = TranslationKey::new("Hello", "hi");
            store.put(&TranslationRecord::new(&key, "नमस्ते")).expect("put");
        }

        {
            let store = TranslationStore::open(path_str).expect("reopen");
            let key = TranslationKey::new("Hello", "hi");
            let fetched = store.get(&key).expect("get").expect("should persist");
            assert_eq!(fetched.translated_text, "नमस्ते");
        }
    }

    // ==================== all() Tests ====================

    #[test]
    fn test_all_returns_every_record() {
        let (store, _temp_dir) = create_test_store();

        for i in 0..5 {
            let key = TranslationKey::new(format!("Text {}", i), "hi");
            store
                .put(&TranslationRecord::new(&key, format!("अनुवाद {}", i)))
                .expect("put");
        }

        let all = store.all().expect("all");
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_all_empty_store() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.all().expect("all").is_empty());
    }

    // ==================== Record Tests ====================

    #[test]
    fn test_record_created_at_is_rfc3339() {
        let key = TranslationKey::new("Hello", "hi");
        let record = TranslationRecord::new(&key, "नमस्ते");

        chrono::DateTime::parse_from_rfc3339(&record.created_at)
            .expect("created_at should be valid RFC3339");
    }

    #[test]
    fn test_record_key_roundtrip() {
        let key = TranslationKey::new("Hello", "hi");
        let record = TranslationRecord::new(&key, "नमस्ते");
        assert_eq!(record.key(), key);
    }

    #[test]
    fn test_special_characters_in_text() {
        let (store, _temp_dir) = create_test_store();

        let key = TranslationKey::new("It's \"quoted\" & <tagged>", "hi");
        store.put(&TranslationRecord::new(&key, "अनुवादित")).expect("put");

        let fetched = store.get(&key).expect("get").expect("exists");
        assert_eq!(fetched.source_text, "It's \"quoted\" & <tagged>");
    }

    #[test]
    fn test_sql_injection_in_key() {
        let (store, _temp_dir) = create_test_store();

        let key = TranslationKey::new("'; DROP TABLE translations; --", "hi");
        store.put(&TranslationRecord::new(&key, "ok")).expect("put");

        assert_eq!(store.count().expect("count"), 1);
        assert!(store.get(&key).expect("get").is_some());
    }

    // ==================== Clone Semantics ====================

    #[test]
    fn test_store_clone_shares_connection() {
        let (store, _temp_dir) = create_test_store();
        let clone = store.clone();

        let key = TranslationKey::new("Hello", "hi");
        store.put(&TranslationRecord::new(&key, "नमस्ते")).expect("put");

        assert!(clone.get(&key).expect("get").is_some());
        assert_eq!(clone.count().expect("count"), 1);
    }
}
