//! Activity wire types.
//!
//! These mirror the JSON the channel posts to `/api/messages` and expects back
//! on its REST surface. Only the fields the bot reads or writes are modelled;
//! everything is camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Channel id used by the Bot Framework Emulator.
pub const EMULATOR_CHANNEL_ID: &str = "emulator";

/// The kind of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityType {
    /// A user sent text or attachments.
    Message,
    /// Conversation membership or metadata changed.
    ConversationUpdate,
    /// A named event, also used for proactive continuations.
    Event,
    /// A typing indicator.
    Typing,
    /// The conversation ended.
    EndOfConversation,
    /// A request expecting a synchronous response.
    Invoke,
    /// Diagnostic information, shown only by the Emulator.
    Trace,
    /// The bot was installed or uninstalled.
    InstallationUpdate,
    /// A reaction was added to or removed from a message.
    MessageReaction,
    /// Any type this bot does not know about.
    #[serde(other)]
    Unknown,
}

/// A user or bot account on a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAccount {
    /// Channel-scoped account id.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aad_object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl ChannelAccount {
    /// Creates an account with only an id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            aad_object_id: None,
            role: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// The conversation an activity belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAccount {
    /// Channel-scoped conversation id.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_group: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl ConversationAccount {
    /// Creates a conversation with only an id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            is_group: None,
            conversation_type: None,
            tenant_id: None,
        }
    }
}

/// A single inbound or outbound event in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_added: Vec<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_removed: Vec<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_data: Option<JsonValue>,
}

impl Activity {
    /// Creates an empty activity of the given type.
    #[must_use]
    pub fn new(activity_type: ActivityType) -> Self {
        Self {
            activity_type,
            id: None,
            timestamp: None,
            service_url: None,
            channel_id: None,
            from: None,
            conversation: None,
            recipient: None,
            text: None,
            locale: None,
            members_added: Vec::new(),
            members_removed: Vec::new(),
            reply_to_id: None,
            name: None,
            label: None,
            value: None,
            value_type: None,
            channel_data: None,
        }
    }

    /// Creates an outgoing text message.
    #[must_use]
    pub fn message(text: impl Into<String>) -> Self {
        let mut activity = Self::new(ActivityType::Message);
        activity.text = Some(text.into());
        activity
    }

    /// Creates a trace activity. Only the Emulator renders these.
    #[must_use]
    pub fn trace(
        name: impl Into<String>,
        label: impl Into<String>,
        value_type: impl Into<String>,
        value: JsonValue,
    ) -> Self {
        let mut activity = Self::new(ActivityType::Trace);
        activity.name = Some(name.into());
        activity.label = Some(label.into());
        activity.value_type = Some(value_type.into());
        activity.value = Some(value);
        activity
    }

    /// Returns the activity text, or an empty string.
    #[must_use]
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Returns true if this activity arrived from the Emulator.
    #[must_use]
    pub fn is_from_emulator(&self) -> bool {
        self.channel_id.as_deref() == Some(EMULATOR_CHANNEL_ID)
    }
}

/// The channel's reply to a posted activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponse {
    /// Id the channel assigned to the activity. Some channels leave it empty.
    #[serde(default)]
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_emulator_message() {
        let payload = json!({
            "type": "message",
            "id": "4c1d",
            "timestamp": "2024-05-01T10:00:00.000Z",
            "serviceUrl": "http://localhost:56120",
            "channelId": "emulator",
            "from": { "id": "user-1", "name": "User", "role": "user" },
            "conversation": { "id": "conv-1" },
            "recipient": { "id": "bot-1", "name": "Bot", "role": "bot" },
            "text": "hello",
            "locale": "en-US"
        });

        let activity: Activity = serde_json::from_value(payload).expect("deserialize");

        assert_eq!(activity.activity_type, ActivityType::Message);
        assert_eq!(activity.text_or_empty(), "hello");
        assert_eq!(activity.from.as_ref().map(|a| a.id.as_str()), Some("user-1"));
        assert_eq!(activity.conversation.as_ref().map(|c| c.id.as_str()), Some("conv-1"));
        assert!(activity.is_from_emulator());
        assert!(activity.members_added.is_empty());
    }

    #[test]
    fn deserializes_members_added() {
        let payload = json!({
            "type": "conversationUpdate",
            "membersAdded": [{ "id": "bot-1" }, { "id": "user-1" }],
            "recipient": { "id": "bot-1" }
        });

        let activity: Activity = serde_json::from_value(payload).expect("deserialize");

        assert_eq!(activity.activity_type, ActivityType::ConversationUpdate);
        assert_eq!(activity.members_added.len(), 2);
    }

    #[test]
    fn unknown_type_is_tolerated() {
        let activity: Activity =
            serde_json::from_value(json!({ "type": "handoff" })).expect("deserialize");
        assert_eq!(activity.activity_type, ActivityType::Unknown);
    }

    #[test]
    fn outgoing_message_omits_empty_fields() {
        let value = serde_json::to_value(Activity::message("hi")).expect("serialize");
        assert_eq!(value, json!({ "type": "message", "text": "hi" }));
    }

    #[test]
    fn trace_activity_shape() {
        let activity = Activity::trace("n", "l", "vt", json!("boom"));
        let value = serde_json::to_value(activity).expect("serialize");
        assert_eq!(value["type"], "trace");
        assert_eq!(value["valueType"], "vt");
        assert_eq!(value["value"], "boom");
    }

    #[test]
    fn text_or_empty_without_text() {
        assert_eq!(Activity::new(ActivityType::Message).text_or_empty(), "");
    }
}
