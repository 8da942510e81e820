//! Activity handler trait.
//!
//! `on_turn` routes a turn to a per-type hook. Every hook has a default, so a
//! bot only overrides what it cares about; unknown activity types fall
//! through to a no-op.

use crate::error::TurnError;
use crate::turn::TurnContext;
use async_trait::async_trait;
use proactive_bot_conversation::{ActivityType, ChannelAccount};
use rootcause::Report;

/// Handles the turns the adapter runs.
#[async_trait]
pub trait ActivityHandler: Send + Sync {
    /// Entry point for every turn.
    async fn on_turn(&self, turn: &TurnContext) -> Result<(), Report<TurnError>> {
        match turn.activity().activity_type {
            ActivityType::Message => self.on_message_activity(turn).await,
            ActivityType::ConversationUpdate => self.on_conversation_update_activity(turn).await,
            _ => self.on_unrecognized_activity(turn).await,
        }
    }

    /// A user sent a message.
    async fn on_message_activity(&self, _turn: &TurnContext) -> Result<(), Report<TurnError>> {
        Ok(())
    }

    /// Conversation membership changed.
    ///
    /// Overrides that still want the member hooks should finish with
    /// [`dispatch_conversation_update`].
    async fn on_conversation_update_activity(
        &self,
        turn: &TurnContext,
    ) -> Result<(), Report<TurnError>> {
        dispatch_conversation_update(self, turn).await
    }

    /// Members joined the conversation. The bot itself may be among them.
    async fn on_members_added(
        &self,
        _members_added: &[ChannelAccount],
        _turn: &TurnContext,
    ) -> Result<(), Report<TurnError>> {
        Ok(())
    }

    /// Members left the conversation.
    async fn on_members_removed(
        &self,
        _members_removed: &[ChannelAccount],
        _turn: &TurnContext,
    ) -> Result<(), Report<TurnError>> {
        Ok(())
    }

    /// Any activity type without a dedicated hook.
    async fn on_unrecognized_activity(
        &self,
        _turn: &TurnContext,
    ) -> Result<(), Report<TurnError>> {
        Ok(())
    }
}

/// Default conversation-update handling: runs the member hooks for whatever
/// the activity lists as added or removed.
///
/// # Errors
///
/// Propagates the first hook failure.
pub async fn dispatch_conversation_update<H>(
    handler: &H,
    turn: &TurnContext,
) -> Result<(), Report<TurnError>>
where
    H: ActivityHandler + ?Sized,
{
    let activity = turn.activity();
    if !activity.members_added.is_empty() {
        handler.on_members_added(&activity.members_added, turn).await?;
    }
    if !activity.members_removed.is_empty() {
        handler
            .on_members_removed(&activity.members_removed, turn)
            .await?;
    }
    Ok(())
}
