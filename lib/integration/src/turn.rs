//! Turn context.
//!
//! A turn is the processing of one activity, either received from the channel
//! or synthesised for a proactive continuation. The context carries that
//! activity and addresses everything sent during the turn back into the same
//! conversation.

use crate::connector::ChannelConnector;
use crate::error::ConnectorError;
use proactive_bot_conversation::{Activity, ConversationReference, ResourceResponse};
use proactive_bot_core::TurnId;
use rootcause::Report;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Context for a single turn.
pub struct TurnContext {
    id: TurnId,
    activity: Activity,
    connector: Arc<dyn ChannelConnector>,
    responded: AtomicBool,
}

impl std::fmt::Debug for TurnContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnContext")
            .field("id", &self.id)
            .field("activity_type", &self.activity.activity_type)
            .field("responded", &self.responded())
            .finish_non_exhaustive()
    }
}

impl TurnContext {
    /// Creates a context for `activity`.
    #[must_use]
    pub fn new(activity: Activity, connector: Arc<dyn ChannelConnector>) -> Self {
        Self {
            id: TurnId::new(),
            activity,
            connector,
            responded: AtomicBool::new(false),
        }
    }

    /// Returns the turn id.
    #[must_use]
    pub fn id(&self) -> TurnId {
        self.id
    }

    /// Returns the activity that started the turn.
    #[must_use]
    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    /// Returns true once anything has been sent during this turn.
    #[must_use]
    pub fn responded(&self) -> bool {
        self.responded.load(Ordering::Acquire)
    }

    /// Sends a text message into the turn's conversation.
    ///
    /// # Errors
    ///
    /// Returns an error if the connector fails to post the message.
    pub async fn send_text(
        &self,
        text: impl Into<String>,
    ) -> Result<ResourceResponse, Report<ConnectorError>> {
        self.send_activity(Activity::message(text)).await
    }

    /// Addresses `activity` to the turn's conversation and sends it.
    ///
    /// The bot becomes the sender, the user the recipient, and the activity
    /// is posted as a reply to the turn's activity when that has an id.
    ///
    /// # Errors
    ///
    /// Returns an error if the turn's activity cannot be addressed or the
    /// connector fails to post.
    pub async fn send_activity(
        &self,
        activity: Activity,
    ) -> Result<ResourceResponse, Report<ConnectorError>> {
        let reference = ConversationReference::from_activity(&self.activity).map_err(|e| {
            ConnectorError::Unaddressable {
                reason: e.to_string(),
            }
        })?;
        let outgoing = reference.address_outgoing(activity);

        let response = self.connector.send_activity(&outgoing).await?;
        self.responded.store(true, Ordering::Release);

        debug!(
            turn_id = %self.id,
            activity_type = ?outgoing.activity_type,
            resource_id = %response.id,
            "sent activity"
        );
        Ok(response)
    }
}
