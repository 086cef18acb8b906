use anyhow::Result;
use std::sync::Arc;

use axum::http::Request;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

use contact_list::build_state;
use contact_list::config::Config;
use contact_list::handlers::build_router;
use contact_list::redis::RedisManager;
use contact_list::seed;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays free for supervisors that capture it
    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Arc::new(Config::load());

    let redis = Arc::new(RedisManager::new_with_config(&config).await?);

    // Fixed categories, subcategories and roles the API expects to exist
    seed::ensure_seed_data(&redis).await?;

    let state = build_state(config.clone(), redis);
    let router = build_router(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &Request<_>| {
                tracing::info_span!("http_request", method = %req.method(), uri = %req.uri())
            })
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    let listener = tokio::net::TcpListener::bind(config.server.bind.as_str()).await?;
    tracing::info!(
        bind = %config.server.bind,
        version = %config.server.version,
        "Starting contact list API"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
