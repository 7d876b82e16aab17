use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No wallet available: {0}")]
    WalletUnavailable(String),

    #[error("Wrong network: expected {expected}, wallet is on {actual}")]
    NetworkMismatch { expected: String, actual: String },

    #[error("Rejected by user")]
    UserRejected,

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Contract call failed: {0}")]
    Contract(String),

    #[error("No active session")]
    NotConnected,

    #[error("A transfer is already awaiting confirmation")]
    TransferPending,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Classify a provider-level error for the session layer.
    ///
    /// The wallet's own rejection signal maps to [`SessionError::UserRejected`];
    /// everything else keeps the most specific diagnostic text the provider
    /// attached.
    pub fn from_provider(err: ProviderError) -> Self {
        if err.is_user_rejection() {
            return SessionError::UserRejected;
        }
        match err {
            ProviderError::Unavailable(msg) => SessionError::WalletUnavailable(msg),
            other => SessionError::Transaction(other.detail().to_string()),
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            SessionError::WalletUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            SessionError::NetworkMismatch { .. } => (StatusCode::CONFLICT, self.to_string()),
            SessionError::UserRejected => (StatusCode::BAD_REQUEST, self.to_string()),
            SessionError::Transaction(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            SessionError::Contract(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            SessionError::NotConnected => (StatusCode::CONFLICT, self.to_string()),
            SessionError::TransferPending => (StatusCode::CONFLICT, self.to_string()),
            SessionError::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            SessionError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::RpcErrorObject;

    #[test]
    fn test_user_rejection_is_classified() {
        let err = ProviderError::Rpc(RpcErrorObject {
            code: ProviderError::USER_REJECTED_CODE,
            message: "User rejected the request.".to_string(),
            data: None,
        });
        assert!(matches!(
            SessionError::from_provider(err),
            SessionError::UserRejected
        ));
    }

    #[test]
    fn test_transport_failure_means_no_wallet() {
        let err = ProviderError::Unavailable("connection refused".to_string());
        assert!(matches!(
            SessionError::from_provider(err),
            SessionError::WalletUnavailable(_)
        ));
    }
}
