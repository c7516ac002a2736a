//! Runtime memory cache.
//!
//! Process-local map from composite key to translated text. Populated on
//! every successful resolution below the bundle tier and cleared on restart;
//! never shared across processes. Kept separate from the durable store on
//! purpose: this tier answers without touching the database at all.

use crate::store::TranslationKey;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct RuntimeCache {
    entries: RwLock<HashMap<TranslationKey, String>>,
}

impl RuntimeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &TranslationKey) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn insert(&self, key: TranslationKey, translated: String) {
        self.entries.write().await.insert(key, translated);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
