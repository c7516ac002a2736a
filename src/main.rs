use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use translation_relay::config::Config;
use translation_relay::resolver::Translator;
use translation_relay::server::{self, AppState};
use translation_relay::snapshot::OfflineIndex;
use translation_relay::store::TranslationStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translation_relay=info".parse()?),
        )
        .init();

    info!("Starting translation relay");

    // Load configuration from environment
    let config = Config::from_env()?;

    if let Some(parent) = Path::new(&config.database_path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory {:?}", parent))?;
    }

    let store = TranslationStore::open(&config.database_path)
        .with_context(|| format!("Failed to open store at {}", config.database_path))?;
    info!(
        "Persistent store ready ({} cached translations)",
        store.count()?
    );

    let offline = OfflineIndex::load_or_empty(Path::new(&config.snapshot_path));

    let translator = Arc::new(Translator::new(&config, store.clone(), offline));
    let port = config.port;

    let state = AppState {
        config: Arc::new(config),
        translator,
        store,
    };

    let app = server::router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on 0.0.0.0:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}
