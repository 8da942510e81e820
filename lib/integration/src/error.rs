//! Error types for the integration crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `ConnectorError`: Errors posting activities to a channel
//! - `CredentialError`: Errors acquiring a channel access token
//! - `TurnError`: Errors raised by an activity handler during a turn
//! - `AdapterError`: High-level wrapper for adapter operations

use std::fmt;

/// Errors from posting activities to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    /// The activity cannot be addressed (missing service URL or conversation).
    Unaddressable { reason: String },
    /// The service URL could not be turned into an endpoint.
    InvalidServiceUrl { service_url: String, reason: String },
    /// The HTTP request never produced a response.
    ConnectionFailed { reason: String },
    /// The channel answered with a non-success status.
    Rejected { status: u16, body: String },
    /// The channel's response body could not be decoded.
    ProtocolError { reason: String },
    /// No access token could be attached to the request.
    AuthenticationFailed,
}

impl fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unaddressable { reason } => {
                write!(f, "activity cannot be addressed: {reason}")
            }
            Self::InvalidServiceUrl {
                service_url,
                reason,
            } => {
                write!(f, "invalid service url '{service_url}': {reason}")
            }
            Self::ConnectionFailed { reason } => {
                write!(f, "connection failed: {reason}")
            }
            Self::Rejected { status, body } => {
                if body.is_empty() {
                    write!(f, "channel rejected activity with status {status}")
                } else {
                    write!(f, "channel rejected activity with status {status}: {body}")
                }
            }
            Self::ProtocolError { reason } => {
                write!(f, "protocol error: {reason}")
            }
            Self::AuthenticationFailed => write!(f, "could not authenticate with the channel"),
        }
    }
}

impl std::error::Error for ConnectorError {}

/// Errors from acquiring channel access tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The token endpoint is not a valid URL.
    InvalidEndpoint { endpoint: String, reason: String },
    /// The HTTP client for the token endpoint could not be built.
    ClientSetup { reason: String },
    /// The token endpoint refused the exchange.
    TokenExchange { reason: String },
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEndpoint { endpoint, reason } => {
                write!(f, "invalid token endpoint '{endpoint}': {reason}")
            }
            Self::ClientSetup { reason } => {
                write!(f, "failed to build token client: {reason}")
            }
            Self::TokenExchange { reason } => {
                write!(f, "token exchange failed: {reason}")
            }
        }
    }
}

impl std::error::Error for CredentialError {}

/// Errors raised while an activity handler runs a turn.
///
/// Use these as context when wrapping lower-level reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnError {
    /// Capturing the conversation reference failed.
    ReferenceCapture,
    /// Sending an activity during the turn failed.
    SendFailed,
    /// Handler-specific failure.
    Handler { reason: String },
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReferenceCapture => write!(f, "failed to capture conversation reference"),
            Self::SendFailed => write!(f, "failed to send activity"),
            Self::Handler { reason } => write!(f, "handler failed: {reason}"),
        }
    }
}

impl std::error::Error for TurnError {}

/// High-level adapter errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// The inbound activity cannot start a turn.
    InvalidActivity { reason: String },
    /// The turn failed and the turn-error policy could not report it.
    TurnFailed { conversation_id: String },
    /// A proactive continuation failed (use as context wrapper).
    ContinuationFailed {
        user_id: String,
        conversation_id: String,
    },
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidActivity { reason } => {
                write!(f, "invalid activity: {reason}")
            }
            Self::TurnFailed { conversation_id } => {
                write!(f, "turn failed in conversation {conversation_id}")
            }
            Self::ContinuationFailed {
                user_id,
                conversation_id,
            } => {
                write!(
                    f,
                    "proactive turn for user {user_id} in conversation {conversation_id} failed"
                )
            }
        }
    }
}

impl std::error::Error for AdapterError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_display_includes_status_and_body() {
        let err = ConnectorError::Rejected {
            status: 403,
            body: "forbidden".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "channel rejected activity with status 403: forbidden"
        );
    }

    #[test]
    fn rejected_display_without_body() {
        let err = ConnectorError::Rejected {
            status: 502,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "channel rejected activity with status 502");
    }

    #[test]
    fn continuation_failed_display() {
        let err = AdapterError::ContinuationFailed {
            user_id: "user-1".to_string(),
            conversation_id: "conv-1".to_string(),
        };
        assert!(err.to_string().contains("user-1"));
        assert!(err.to_string().contains("conv-1"));
    }
}
