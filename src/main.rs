// studio-cache - Cost-control cache, voice command shortcuts and savings analytics for AI provider calls

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use studio_cache::analytics::AnalyticsAggregator;
use studio_cache::cache::CacheService;
use studio_cache::cli::Args;
use studio_cache::config::AppConfig;
use studio_cache::server::{create_router, AppState};
use studio_cache::store::{self, Store};
use studio_cache::utils::logging;
use studio_cache::voice::{PatternMatcher, VoiceCommandResolver};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if args.print_config {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting studio-cache v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Connect the backing store
    let store = store::connect(&config.store).await?;
    info!("Using '{}' store", store.name());
    if !config.cache.enabled {
        warn!("Caching disabled by configuration; every lookup is a miss");
    }

    // Phase 4: Wire cache, analytics and voice components
    let cache = Arc::new(CacheService::new(store, config.cache.clone()));
    let analytics = Arc::new(AnalyticsAggregator::new(cache.clone(), &config.analytics));
    let matcher = Arc::new(PatternMatcher::new());
    let voice = Arc::new(VoiceCommandResolver::new(
        matcher,
        cache.clone(),
        config.voice.intent_model.clone(),
    ));

    // Phase 5: Build and start admin server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let app = create_router(AppState {
        cache,
        analytics,
        voice,
    });

    info!("Starting admin server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 6: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
