/// Axum HTTP server setup and routing
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::*;
use crate::state::MockChain;

pub fn create_router(chain: Arc<MockChain>) -> Router {
    // Allow the session service and tests to connect from anywhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // JSON-RPC surface
        .route("/", post(rpc_handler))
        // Dev control endpoints
        .route("/mock/accounts", post(set_accounts))
        .route("/mock/network", post(set_network))
        .route("/mock/fund", post(fund_account))
        // Shared state
        .with_state(chain)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(chain: Arc<MockChain>, host: String, port: u16) -> anyhow::Result<()> {
    let app = create_router(chain);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("🚀 Chain mock listening on http://{}", addr);
    log::info!("🪙 Token ledger ready");
    log::info!("🔧 Control endpoints: POST /mock/accounts, /mock/network, /mock/fund");

    axum::serve(listener, app).await?;

    Ok(())
}
