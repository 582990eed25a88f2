// region:    --- Imports
use auction_marketplace::config::Config;
use auction_marketplace::database::DatabaseManager;
use auction_marketplace::handlers;
use auction_marketplace::store::{MarketStore, MemoryStore, PostgresStore};
use auction_marketplace::AuctionEngine;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{:<12} --> invalid configuration: {}", "Main", e);
            return Err(e.into());
        }
    };

    let store: Arc<dyn MarketStore> = match &config.database_url {
        Some(url) => {
            let db_manager = Arc::new(DatabaseManager::connect(url, &config.store).await?);
            if let Err(e) = db_manager.initialize_database().await {
                error!("{:<12} --> schema initialization failed: {:?}", "Main", e);
                return Err(e.into());
            }
            info!("{:<12} --> schema ready", "Main");
            Arc::new(PostgresStore::new(db_manager))
        }
        None => {
            warn!(
                "{:<12} --> DATABASE_URL not set, using in-memory store",
                "Main"
            );
            Arc::new(MemoryStore::new())
        }
    };

    let routes_all = handlers::routes(AuctionEngine::new(store));

    let listener = TcpListener::bind(config.bind_addr.as_str()).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
