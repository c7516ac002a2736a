//! Multi-tier translation resolution for a data-portal backend.
//!
//! Source-language UI strings and record fields are resolved to a target
//! locale through a chain of tiers ordered by cost: a compiled-in bundle, a
//! process-local cache, a durable SQLite store, a sequence of free public
//! translation mirrors, and an offline snapshot. A lookup that falls off the
//! end of the chain returns the original text, so callers never handle a
//! translation error.

pub mod bundle;
pub mod cache;
pub mod config;
pub mod error;
pub mod provider;
pub mod resolver;
pub mod security;
pub mod server;
pub mod snapshot;
pub mod store;

pub use config::Config;
pub use resolver::{Resolution, Tier, Translator};
pub use store::{TranslationKey, TranslationRecord, TranslationStore};
