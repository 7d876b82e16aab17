use axum::{extract::State, Json};
use num_bigint::BigUint;
use std::sync::Arc;

use super::types::{HealthResponse, TransferRequest};
use crate::error::SessionError;
use crate::session::{SessionController, SessionSnapshot};

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn get_session_handler(
    State(controller): State<Arc<SessionController>>,
) -> Json<SessionSnapshot> {
    Json(controller.snapshot().await)
}

pub async fn connect_handler(
    State(controller): State<Arc<SessionController>>,
) -> Result<Json<SessionSnapshot>, SessionError> {
    let snapshot = controller.connect().await?;
    Ok(Json(snapshot))
}

pub async fn disconnect_handler(
    State(controller): State<Arc<SessionController>>,
) -> Json<SessionSnapshot> {
    Json(controller.disconnect().await)
}

pub async fn transfer_handler(
    State(controller): State<Arc<SessionController>>,
    Json(req): Json<TransferRequest>,
) -> Result<Json<SessionSnapshot>, SessionError> {
    let amount = BigUint::parse_bytes(req.amount.as_bytes(), 10)
        .ok_or_else(|| SessionError::InvalidInput(format!("not a token amount: {}", req.amount)))?;

    let snapshot = controller.transfer(req.to, amount).await?;
    Ok(Json(snapshot))
}

pub async fn dismiss_transfer_error_handler(
    State(controller): State<Arc<SessionController>>,
) -> Json<SessionSnapshot> {
    Json(controller.dismiss_transfer_error().await)
}

pub async fn dismiss_network_error_handler(
    State(controller): State<Arc<SessionController>>,
) -> Json<SessionSnapshot> {
    Json(controller.dismiss_network_error().await)
}
