use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kiosk::api::{create_router, AppState};
use kiosk::config::Config;
use kiosk::ocr::EngineMode;

/// How often the cache purge task sweeps expired entries.
const CACHE_PURGE_INTERVAL_SECS: u64 = 60;

#[derive(Parser)]
#[command(name = "kiosk")]
#[command(about = "A collection of small HTTP utility endpoints")]
struct Args {
    /// Skip the traineddata prefetch at startup (models are then fetched
    /// on first use).
    #[arg(long)]
    no_prefetch: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kiosk=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Initializing application state...");
    let state = AppState::new(config.clone())?;

    if args.no_prefetch {
        tracing::info!("Skipping traineddata prefetch");
    } else {
        tracing::info!(languages = %config.ocr.languages, "Prefetching traineddata...");
        if let Err(e) = state
            .pipeline
            .fetcher()
            .ensure(EngineMode::Fast, &config.ocr.languages)
            .await
        {
            tracing::warn!(error = %e, "Traineddata prefetch failed; models will be fetched on first use");
        }
    }

    let cancel_token = CancellationToken::new();

    tracing::info!("Starting cache purge task...");
    let purge_state = state.clone();
    let token = cancel_token.child_token();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Cache purge task shutting down...");
                    break;
                }
                _ = tokio::time::sleep(tokio::time::Duration::from_secs(CACHE_PURGE_INTERVAL_SECS)) => {
                    let removed = purge_state.purge_caches();
                    if removed > 0 {
                        tracing::debug!(removed, "Purged expired cache entries");
                    }
                }
            }
        }
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Kiosk starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling background tasks...");
    cancel_token.cancel();
}
