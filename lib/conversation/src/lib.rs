//! Conversation bookkeeping for the proactive bot.
//!
//! This crate provides:
//!
//! - **Activity schema**: the wire types exchanged with the channel
//! - **Conversation references**: addressing captured from inbound activities
//! - **Reference store**: the user id → reference map replayed by the
//!   proactive dispatcher

pub mod activity;
pub mod error;
pub mod reference;
pub mod store;

pub use activity::{
    Activity, ActivityType, ChannelAccount, ConversationAccount, EMULATOR_CHANNEL_ID,
    ResourceResponse,
};
pub use error::ConversationError;
pub use reference::{CONTINUE_CONVERSATION_EVENT, ConversationReference};
pub use store::{InMemoryReferenceStore, ReferenceStore};
