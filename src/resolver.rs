//! Translation facade: the pipeline's only entry point.
//!
//! `resolve` walks the tiers in strict cost order with an early return at the
//! first hit:
//!
//! ```text
//! BUNDLE -> RUNTIME -> PERSISTENT -> PROVIDER(1..n) -> OFFLINE -> ORIGINAL
//! ```
//!
//! Each tier is terminal on success and a failure advances to the next one.
//! The final state cannot fail, so `resolve` never surfaces an error: the
//! caller always gets back some usable string. Translation is a best-effort
//! enhancement, not a correctness-critical path.

use crate::bundle::BundleResolver;
use crate::cache::RuntimeCache;
use crate::config::Config;
use crate::provider::{self, ProviderDescriptor};
use crate::snapshot::OfflineIndex;
use crate::store::{TranslationKey, TranslationRecord, TranslationStore};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Which tier produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// The text was already in the source locale (or empty); nothing to do.
    Source,
    /// Static shipped bundle.
    Bundle,
    /// Process-local runtime cache.
    Runtime,
    /// Durable persistent store.
    Persistent,
    /// Fresh success from an external provider.
    Provider,
    /// Offline snapshot consulted after chain exhaustion.
    Offline,
    /// Every tier failed; the original text is returned unchanged.
    Fallback,
}

impl Tier {
    /// Whether the result came out of a cache rather than being computed
    /// fresh (or degraded). A `Fallback` result is distinguishable from a
    /// hit by `served_from_cache == false` plus `text == input`.
    pub fn served_from_cache(&self) -> bool {
        matches!(
            self,
            Tier::Bundle | Tier::Runtime | Tier::Persistent | Tier::Offline
        )
    }
}

/// Outcome of one `resolve` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub text: String,
    pub tier: Tier,
}

impl Resolution {
    pub fn served_from_cache(&self) -> bool {
        self.tier.served_from_cache()
    }
}

/// The translation facade.
///
/// Cheap tiers are consulted lock-free; before the costly tiers (persistent
/// store and provider chain) concurrent callers for an identical composite
/// key are coalesced behind a per-key gate so that at most one of them walks
/// the chain and writes through. Cancelling one caller does not cancel the
/// shared flight other callers are waiting on.
pub struct Translator {
    client: reqwest::Client,
    source_locale: String,
    provider_timeout: Duration,
    providers: Vec<ProviderDescriptor>,
    cache: RuntimeCache,
    store: TranslationStore,
    offline: RwLock<OfflineIndex>,
    inflight: Mutex<HashMap<TranslationKey, Arc<Mutex<()>>>>,
}

impl Translator {
    pub fn new(config: &Config, store: TranslationStore, offline: OfflineIndex) -> Self {
        Self {
            client: reqwest::Client::new(),
            source_locale: config.source_locale.clone(),
            provider_timeout: config.provider_timeout,
            providers: config.providers.clone(),
            cache: RuntimeCache::new(),
            store,
            offline: RwLock::new(offline),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `(text, target_locale)` to a best-effort translated string.
    /// Infallible by contract.
    pub async fn resolve(&self, text: &str, target_locale: &str) -> Resolution {
        if text.trim().is_empty() || target_locale == self.source_locale {
            return Resolution {
                text: text.to_string(),
                tier: Tier::Source,
            };
        }

        // Shipped bundles win over every dynamic tier.
        if let Some(hit) = BundleResolver::get().lookup(text, target_locale) {
            debug!("Bundle hit for ({}, {})", text, target_locale);
            return Resolution {
                text: hit.to_string(),
                tier: Tier::Bundle,
            };
        }

        let key = TranslationKey::new(text, target_locale);

        if let Some(hit) = self.cache.get(&key).await {
            debug!("Runtime cache hit for ({}, {})", text, target_locale);
            return Resolution {
                text: hit,
                tier: Tier::Runtime,
            };
        }

        // Single-flight: coalesce concurrent callers for the same key before
        // touching the store or the rate-limited provider mirrors.
        let gate = self.flight_gate(&key).await;
        let guard = gate.lock().await;

        // A flight that landed while we waited has populated the cache.
        if let Some(hit) = self.cache.get(&key).await {
            drop(guard);
            self.release_gate(&key).await;
            return Resolution {
                text: hit,
                tier: Tier::Runtime,
            };
        }

        let resolution = self.resolve_uncached(&key).await;

        drop(guard);
        self.release_gate(&key).await;
        resolution
    }

    /// Costly tiers, executed by exactly one flight per key at a time.
    async fn resolve_uncached(&self, key: &TranslationKey) -> Resolution {
        match self.store.get(key) {
            Ok(Some(record)) => {
                debug!("Persistent hit for ({}, {})", key.text, key.locale);
                self.cache
                    .insert(key.clone(), record.translated_text.clone())
                    .await;
                return Resolution {
                    text: record.translated_text,
                    tier: Tier::Persistent,
                };
            }
            Ok(None) => {}
            // Store trouble degrades to a cache miss; the chain still runs.
            Err(e) => warn!("Persistent store read failed, treating as miss: {}", e),
        }

        match provider::resolve_via_chain(
            &self.client,
            &self.providers,
            &key.text,
            &self.source_locale,
            &key.locale,
            self.provider_timeout,
        )
        .await
        {
            Ok(success) => {
                info!(
                    "Translated ({}, {}) via provider '{}' after {} attempt(s)",
                    key.text, key.locale, success.provider, success.attempts
                );
                let record = TranslationRecord::new(key, success.text.clone());
                if let Err(e) = self.store.put(&record) {
                    warn!("Failed to persist translation: {}", e);
                }
                self.cache.insert(key.clone(), success.text.clone()).await;
                Resolution {
                    text: success.text,
                    tier: Tier::Provider,
                }
            }
            Err(e) => {
                warn!(
                    "Provider chain exhausted for ({}, {}): {}",
                    key.text, key.locale, e
                );
                let offline_hit = self.offline.read().await.get(key).map(str::to_string);
                match offline_hit {
                    Some(hit) => {
                        self.cache.insert(key.clone(), hit.clone()).await;
                        Resolution {
                            text: hit,
                            tier: Tier::Offline,
                        }
                    }
                    None => {
                        debug!("Offline snapshot miss; returning original text");
                        Resolution {
                            text: key.text.clone(),
                            tier: Tier::Fallback,
                        }
                    }
                }
            }
        }
    }

    async fn flight_gate(&self, key: &TranslationKey) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().await;
        inflight
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the gate once a flight lands. Late joiners already hold the Arc;
    /// callers arriving after removal create a fresh gate, which is harmless
    /// because every flight re-checks the runtime cache after acquisition.
    async fn release_gate(&self, key: &TranslationKey) {
        self.inflight.lock().await.remove(key);
    }

    /// Replace the offline snapshot index from `path` without a restart.
    pub async fn reload_snapshot(&self, path: &Path) -> Result<usize, crate::error::SnapshotError> {
        let mut offline = self.offline.write().await;
        let count = offline.reload(path)?;
        info!("Reloaded offline snapshot ({} entries)", count);
        Ok(count)
    }

    /// Entries currently held by the runtime cache tier.
    pub async fn runtime_cache_len(&self) -> usize {
        self.cache.len().await
    }
}
