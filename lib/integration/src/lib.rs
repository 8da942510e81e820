//! Channel boundary for the proactive bot.
//!
//! This crate provides:
//!
//! - **Channel connector**: posts activities back to the channel's service URL
//! - **App credentials**: client-credentials tokens for outbound calls
//! - **Turn context**: per-activity state and reply addressing
//! - **Activity handler**: type-based routing of a turn to bot hooks
//! - **Bot adapter**: runs inbound and proactive turns with the turn-error policy

pub mod adapter;
pub mod connector;
pub mod credential;
pub mod error;
pub mod handler;
pub mod turn;

pub use adapter::BotAdapter;
pub use connector::{ChannelConnector, HttpChannelConnector};
pub use credential::{AppCredentials, DEFAULT_OAUTH_ENDPOINT, DEFAULT_OAUTH_SCOPE};
pub use error::{AdapterError, ConnectorError, CredentialError, TurnError};
pub use handler::{ActivityHandler, dispatch_conversation_update};
pub use turn::TurnContext;
