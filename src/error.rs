//! Error taxonomy for the translation pipeline.
//!
//! Provider and store failures are recoverable by design: a provider error
//! advances the fallback chain, a store error degrades to a cache miss, and
//! a missing snapshot skips that tier. None of them ever reach the caller of
//! `Translator::resolve`.

use thiserror::Error;

/// Failure of a single provider attempt.
///
/// Caught by the chain orchestrator and logged; never propagated past it.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Timeout, connection refused, DNS failure, or any other transport error.
    #[error("network failure: {0}")]
    Network(String),

    /// Non-2xx status, unparseable body, or a missing/empty response field.
    #[error("bad response: {0}")]
    BadResponse(String),
}

/// Terminal failure of the whole provider chain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("all {attempts} translation providers exhausted")]
    AllProvidersExhausted { attempts: usize },
}

/// Persistent store failure. On the resolution path this is treated as a
/// cache miss, not as a fatal condition.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistent store unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),
}

/// Offline snapshot import/export failure.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// No snapshot file exists yet. At startup this just skips the tier.
    #[error("no snapshot file at {0}")]
    Missing(String),

    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("failed to read snapshot file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse snapshot file: {0}")]
    Parse(#[from] serde_json::Error),
}
