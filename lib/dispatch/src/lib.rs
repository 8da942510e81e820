//! Proactive messaging on top of the channel adapter.
//!
//! This crate provides:
//!
//! - **Proactive bot**: records conversation references, welcomes new
//!   members and echoes messages
//! - **Dispatcher**: replays every stored reference and sends one message
//!   into each conversation

pub mod bot;
pub mod dispatcher;

pub use bot::{DEFAULT_NOTIFY_URL, ProactiveBot};
pub use dispatcher::{
    DEFAULT_PROACTIVE_MESSAGE, DispatchFailure, DispatchReport, ProactiveDispatcher,
};
