//! Core types shared by every proactive-bot crate.
//!
//! This crate provides the `Result` alias used for layered error reports and
//! the strongly-typed ids that correlate turns and proactive dispatches in
//! logs.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{DispatchId, ParseIdError, TurnId};
