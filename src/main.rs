use clap::Parser; // for cli
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use weather_proxy::config::Config;
use weather_proxy::error::StartupError;
use weather_proxy::rate_limit::purge_task;
use weather_proxy::state::AppState;

// this is main async function with tokio
#[tokio::main]
async fn main() -> Result<(), StartupError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // parse cli arguments (env vars as fallback)
    let config = Config::parse();
    let state = Arc::new(AppState::new(&config)?);

    // spawn the background sweeper for expired rate limit windows
    tokio::spawn(purge_task(Arc::clone(&state.rate_limiter)));

    let app = weather_proxy::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(port = config.port, "server running");
    tracing::info!(upstream = %config.upstream_url, "forwarding to weather provider");
    tracing::info!(
        "rate limit: {} requests per {} seconds",
        config.rate_limit,
        config.rate_window
    );
    if config.geo_lookup {
        tracing::info!(geo_url = %config.geo_url, "client location logging enabled");
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
