//! Conversation references.
//!
//! A reference is the addressing information captured from an inbound
//! activity that lets the bot post into the same conversation later, without
//! waiting for the user to speak first.

use crate::activity::{Activity, ActivityType, ChannelAccount, ConversationAccount};
use crate::error::ConversationError;
use rootcause::Report;
use serde::{Deserialize, Serialize};

/// Event name carried by proactive continuation activities.
pub const CONTINUE_CONVERSATION_EVENT: &str = "ContinueConversation";

/// Durable addressing information for a conversation.
///
/// Immutable once captured; fields are only readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    activity_id: Option<String>,
    user: ChannelAccount,
    bot: ChannelAccount,
    conversation: ConversationAccount,
    channel_id: String,
    service_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    locale: Option<String>,
}

impl ConversationReference {
    /// Captures the reference of an inbound activity.
    ///
    /// The sender becomes the user and the recipient becomes the bot.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationError::MissingField`] if the activity lacks the
    /// sender, recipient, conversation, channel id or service URL, and
    /// [`ConversationError::EmptyUserId`] if the sender id is blank.
    pub fn from_activity(activity: &Activity) -> Result<Self, Report<ConversationError>> {
        let user = activity
            .from
            .clone()
            .ok_or(ConversationError::MissingField { field: "from" })?;
        if user.id.trim().is_empty() {
            return Err(ConversationError::EmptyUserId.into());
        }

        let bot = activity
            .recipient
            .clone()
            .ok_or(ConversationError::MissingField { field: "recipient" })?;
        let conversation = activity
            .conversation
            .clone()
            .ok_or(ConversationError::MissingField {
                field: "conversation",
            })?;
        let channel_id = activity
            .channel_id
            .clone()
            .ok_or(ConversationError::MissingField { field: "channelId" })?;
        let service_url = activity
            .service_url
            .clone()
            .ok_or(ConversationError::MissingField {
                field: "serviceUrl",
            })?;

        Ok(Self {
            activity_id: activity.id.clone(),
            user,
            bot,
            conversation,
            channel_id,
            service_url,
            locale: activity.locale.clone(),
        })
    }

    /// Id of the activity the reference was captured from.
    #[must_use]
    pub fn activity_id(&self) -> Option<&str> {
        self.activity_id.as_deref()
    }

    /// The user side of the conversation.
    #[must_use]
    pub fn user(&self) -> &ChannelAccount {
        &self.user
    }

    /// The bot side of the conversation.
    #[must_use]
    pub fn bot(&self) -> &ChannelAccount {
        &self.bot
    }

    #[must_use]
    pub fn conversation(&self) -> &ConversationAccount {
        &self.conversation
    }

    #[must_use]
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Base URL of the channel's REST surface.
    #[must_use]
    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Addresses an activity the bot is about to send into this conversation.
    ///
    /// The bot becomes the sender, the user the recipient, and the activity
    /// is threaded under the captured activity id when there is one. Channel,
    /// service URL and locale are only filled in where the activity has none.
    #[must_use]
    pub fn address_outgoing(&self, mut activity: Activity) -> Activity {
        self.fill_common(&mut activity);
        activity.from = Some(self.bot.clone());
        activity.recipient = Some(self.user.clone());
        if let Some(id) = &self.activity_id {
            activity.reply_to_id = Some(id.clone());
        }
        activity
    }

    /// Builds the synthetic inbound activity that opens a proactive turn.
    ///
    /// It reads as if the user had sent a `ContinueConversation` event, so
    /// replies made during the turn are addressed back to the user. The
    /// captured activity id is not carried over: proactive messages start a
    /// new thread rather than replying to the last inbound message.
    #[must_use]
    pub fn continuation_activity(&self) -> Activity {
        let mut activity = Activity::new(ActivityType::Event);
        activity.name = Some(CONTINUE_CONVERSATION_EVENT.to_string());
        self.fill_common(&mut activity);
        activity.from = Some(self.user.clone());
        activity.recipient = Some(self.bot.clone());
        activity
    }

    fn fill_common(&self, activity: &mut Activity) {
        activity.channel_id = Some(self.channel_id.clone());
        activity.service_url = Some(self.service_url.clone());
        activity.conversation = Some(self.conversation.clone());
        if activity.locale.is_none() {
            activity.locale = self.locale.clone();
        }
    }
}
