//! HTTP error mapping.
//!
//! Handlers return [`ServerError`]; internal details are logged and the
//! client only sees a short status message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use proactive_bot_integration::AdapterError;
use rootcause::Report;
use std::fmt;

/// Errors surfaced by the HTTP routes.
#[derive(Debug)]
pub enum ServerError {
    /// The posted activity cannot start a turn.
    InvalidActivity { reason: String },
    /// The turn failed and could not be recovered.
    TurnFailed { details: String },
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidActivity { reason } => write!(f, "invalid activity: {reason}"),
            Self::TurnFailed { details } => write!(f, "turn failed: {details}"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<Report<AdapterError>> for ServerError {
    fn from(report: Report<AdapterError>) -> Self {
        match report.current_context() {
            AdapterError::InvalidActivity { reason } => Self::InvalidActivity {
                reason: reason.clone(),
            },
            _ => Self::TurnFailed {
                details: report.to_string(),
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidActivity { reason } => {
                tracing::warn!(%reason, "rejected inbound activity");
                (StatusCode::BAD_REQUEST, "Invalid activity")
            }
            Self::TurnFailed { details } => {
                tracing::error!(%details, "turn failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, message).into_response()
    }
}
