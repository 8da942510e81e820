//! The proactive bot.
//!
//! Every message and conversation update records the sender's conversation
//! reference so the dispatcher can reach them later. New members are welcomed
//! with a pointer to the notify endpoint and messages are echoed back.

use async_trait::async_trait;
use proactive_bot_conversation::{ChannelAccount, ReferenceStore};
use proactive_bot_integration::{
    ActivityHandler, TurnContext, TurnError, dispatch_conversation_update,
};
use rootcause::Report;
use rootcause::prelude::ResultExt;
use std::sync::Arc;
use tracing::debug;

/// Notify URL advertised when none is configured.
pub const DEFAULT_NOTIFY_URL: &str = "http://localhost:3978/api/notify";

/// Returns the welcome text pointing at `notify_url`.
#[must_use]
pub fn welcome_text(notify_url: &str) -> String {
    format!(
        "Welcome to the Proactive Bot sample.  Navigate to {notify_url} to proactively message everyone who has previously messaged this bot."
    )
}

/// Returns the echo reply for an inbound message.
#[must_use]
pub fn echo_text(text: &str) -> String {
    format!("You sent: {text}")
}

/// Activity handler that remembers everyone it talks to.
pub struct ProactiveBot {
    store: Arc<dyn ReferenceStore>,
    notify_url: String,
}

impl std::fmt::Debug for ProactiveBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProactiveBot")
            .field("notify_url", &self.notify_url)
            .finish_non_exhaustive()
    }
}

impl ProactiveBot {
    /// Creates a bot that records references into `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ReferenceStore>) -> Self {
        Self {
            store,
            notify_url: DEFAULT_NOTIFY_URL.to_string(),
        }
    }

    /// Overrides the notify URL shown in the welcome text.
    #[must_use]
    pub fn with_notify_url(mut self, notify_url: impl Into<String>) -> Self {
        self.notify_url = notify_url.into();
        self
    }

    #[must_use]
    pub fn notify_url(&self) -> &str {
        &self.notify_url
    }

    async fn record_reference(&self, turn: &TurnContext) -> Result<(), Report<TurnError>> {
        self.store
            .upsert(turn.activity())
            .await
            .context(TurnError::ReferenceCapture)?;
        Ok(())
    }
}

#[async_trait]
impl ActivityHandler for ProactiveBot {
    async fn on_conversation_update_activity(
        &self,
        turn: &TurnContext,
    ) -> Result<(), Report<TurnError>> {
        self.record_reference(turn).await?;
        dispatch_conversation_update(self, turn).await
    }

    async fn on_members_added(
        &self,
        members_added: &[ChannelAccount],
        turn: &TurnContext,
    ) -> Result<(), Report<TurnError>> {
        let bot_id = turn.activity().recipient.as_ref().map(|r| r.id.as_str());

        for member in members_added {
            if Some(member.id.as_str()) == bot_id {
                continue;
            }
            turn.send_text(welcome_text(&self.notify_url))
                .await
                .context(TurnError::SendFailed)?;
            debug!(member_id = %member.id, "welcomed new member");
        }
        Ok(())
    }

    async fn on_message_activity(&self, turn: &TurnContext) -> Result<(), Report<TurnError>> {
        self.record_reference(turn).await?;
        turn.send_text(echo_text(turn.activity().text_or_empty()))
            .await
            .context(TurnError::SendFailed)?;
        Ok(())
    }
}
