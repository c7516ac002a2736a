use crate::provider::ProviderDescriptor;
use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Storage
    pub database_path: String,
    pub snapshot_path: String,

    // Resolution
    pub source_locale: String,
    pub provider_timeout: Duration,
    pub providers: Vec<ProviderDescriptor>,

    // Admin (export endpoint is disabled when unset)
    pub admin_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/translations.db".to_string()),
            snapshot_path: std::env::var("SNAPSHOT_PATH")
                .unwrap_or_else(|_| "data/offline_snapshot.json".to_string()),

            source_locale: std::env::var("SOURCE_LOCALE").unwrap_or_else(|_| "en".to_string()),
            provider_timeout: Duration::from_secs(
                std::env::var("PROVIDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            ),
            providers: load_providers()?,

            admin_api_key: std::env::var("ADMIN_API_KEY").ok(),
        })
    }
}

/// The chain ships with sensible defaults; `PROVIDER_CHAIN` (a JSON array of
/// descriptors) overrides it without a rebuild.
fn load_providers() -> Result<Vec<ProviderDescriptor>> {
    match std::env::var("PROVIDER_CHAIN") {
        Ok(json) => {
            let providers: Vec<ProviderDescriptor> =
                serde_json::from_str(&json).context("PROVIDER_CHAIN is not valid JSON")?;
            anyhow::ensure!(!providers.is_empty(), "PROVIDER_CHAIN must not be empty");
            Ok(providers)
        }
        Err(_) => Ok(ProviderDescriptor::default_chain()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var mutation is process-global, so these tests only cover the
    // pure parts and the default construction path.

    #[test]
    fn test_default_chain_is_used_without_override() {
        if std::env::var("PROVIDER_CHAIN").is_ok() {
            return;
        }
        let providers = load_providers().expect("defaults");
        assert_eq!(providers, ProviderDescriptor::default_chain());
    }

    #[test]
    fn test_provider_chain_json_shape() {
        let json = r#"[
            {
                "name": "local-mirror",
                "style": "json-post",
                "endpoint": "http://localhost:5000/translate",
                "response_field": "translatedText"
            }
        ]"#;

        let providers: Vec<ProviderDescriptor> = serde_json::from_str(json).expect("parse");
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].name, "local-mirror");
    }

    #[test]
    fn test_config_clone_and_debug() {
        let config = Config {
            port: 8080,
            database_path: "data/test.db".to_string(),
            snapshot_path: "data/test.json".to_string(),
            source_locale: "en".to_string(),
            provider_timeout: Duration::from_secs(5),
            providers: ProviderDescriptor::default_chain(),
            admin_api_key: None,
        };

        let cloned = config.clone();
        assert_eq!(config.port, cloned.port);
        assert_eq!(config.providers.len(), cloned.providers.len());

        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("Config"));
        assert!(debug_str.contains("source_locale"));
    }
}
