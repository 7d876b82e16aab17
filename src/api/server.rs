use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use super::handlers;
use crate::session::SessionController;

pub fn create_router(controller: Arc<SessionController>) -> Router {
    // Configure CORS based on environment
    // Set ALLOWED_ORIGINS="https://your-dapp.example" for production
    // If not set, allows any origin (development mode)
    let cors = match std::env::var("ALLOWED_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            log::info!("CORS configured for origins: {}", origins);
            let origin_list: Vec<_> = origins
                .split(',')
                .map(|s| s.trim().parse().expect("Invalid CORS origin"))
                .collect();
            CorsLayer::new()
                .allow_origin(origin_list)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        _ => {
            log::warn!("CORS: Allowing all origins (development mode). Set ALLOWED_ORIGINS env var for production.");
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    Router::new()
        .route("/api/health", get(handlers::health_handler))
        .route("/api/session", get(handlers::get_session_handler))
        .route("/api/session/connect", post(handlers::connect_handler))
        .route(
            "/api/session/disconnect",
            post(handlers::disconnect_handler),
        )
        .route("/api/session/transfer", post(handlers::transfer_handler))
        .route(
            "/api/session/dismiss-transfer-error",
            post(handlers::dismiss_transfer_error_handler),
        )
        .route(
            "/api/session/dismiss-network-error",
            post(handlers::dismiss_network_error_handler),
        )
        .layer(cors)
        .with_state(controller)
}

pub async fn start_server(
    controller: Arc<SessionController>,
    addr: &str,
) -> anyhow::Result<()> {
    let app = create_router(controller);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Intent API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            log::info!("Received SIGTERM signal");
        },
    }

    log::info!("Shutdown signal received, exiting gracefully...");
}
