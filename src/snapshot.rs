//! Offline snapshot manager.
//!
//! `export` serializes every persisted record to a versioned JSON file; it is
//! an administrative operation, never on the hot path. `OfflineIndex` loads
//! that file once at startup into an in-memory map consulted strictly after
//! the provider chain is exhausted: the snapshot is stale relative to the
//! live store by design, a fallback rather than a mirror.

use crate::error::SnapshotError;
use crate::store::{TranslationKey, TranslationRecord, TranslationStore};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Bump when the file layout changes; `OfflineIndex::load` rejects others.
pub const SNAPSHOT_VERSION: u32 = 1;

/// On-disk layout of the snapshot artifact.
#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub version: u32,
    pub exported_at: String,
    pub records: Vec<TranslationRecord>,
}

/// Serialize all persisted records to `path`. Returns the record count.
pub fn export(store: &TranslationStore, path: &Path) -> Result<usize> {
    let records = store
        .all()
        .context("Failed to read records from the persistent store")?;
    let count = records.len();

    let snapshot = SnapshotFile {
        version: SNAPSHOT_VERSION,
        exported_at: Utc::now().to_rfc3339(),
        records,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create snapshot directory {:?}", parent))?;
    }

    let json = serde_json::to_vec_pretty(&snapshot).context("Failed to serialize snapshot")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write snapshot file {:?}", path))?;

    info!("Exported {} records to snapshot {:?}", count, path);
    Ok(count)
}

/// Last-resort in-memory index built from the snapshot file.
#[derive(Debug, Default)]
pub struct OfflineIndex {
    entries: HashMap<TranslationKey, String>,
}

impl OfflineIndex {
    /// An index with no entries; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the snapshot file at `path`.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        if !path.exists() {
            return Err(SnapshotError::Missing(path.display().to_string()));
        }

        let data = std::fs::read(path)?;
        let snapshot: SnapshotFile = serde_json::from_slice(&data)?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let entries = snapshot
            .records
            .into_iter()
            .map(|r| (r.key(), r.translated_text))
            .collect();

        Ok(Self { entries })
    }

    /// Startup variant: a missing file just skips the tier, and a corrupt
    /// file is logged and skipped rather than aborting the process.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(index) => {
                info!("Loaded offline snapshot ({} entries)", index.len());
                index
            }
            Err(SnapshotError::Missing(p)) => {
                info!("No offline snapshot at {}; tier will be skipped", p);
                Self::empty()
            }
            Err(e) => {
                warn!("Offline snapshot load failed ({}); tier will be skipped", e);
                Self::empty()
            }
        }
    }

    /// Replace the index contents from the file. Returns the new entry count.
    pub fn reload(&mut self, path: &Path) -> Result<usize, SnapshotError> {
        let fresh = Self::load(path)?;
        self.entries = fresh.entries;
        Ok(self.entries.len())
    }

    pub fn get(&self, key: &TranslationKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
