//! Bot adapter.
//!
//! The adapter is the boundary between the HTTP layer and bot logic. It
//! validates inbound activities, wraps them in a [`TurnContext`], runs the
//! handler, and applies the turn-error policy when the handler fails. It
//! also opens proactive turns from stored conversation references.

use crate::connector::ChannelConnector;
use crate::error::{AdapterError, TurnError};
use crate::handler::ActivityHandler;
use crate::turn::TurnContext;
use proactive_bot_conversation::{Activity, ConversationReference};
use rootcause::Report;
use serde_json::Value as JsonValue;
use std::future::Future;
use std::sync::Arc;
use tracing::{Instrument, error, info_span, instrument};

/// First message sent to the user when a turn fails.
pub const TURN_ERROR_MESSAGE: &str = "The bot encountered an error or bug.";

/// Second message sent to the user when a turn fails.
pub const TURN_ERROR_FOLLOW_UP: &str = "To continue to run this bot, please fix the bot source code.";

/// Value type of the trace activity sent to the Emulator on turn errors.
pub const TURN_ERROR_VALUE_TYPE: &str = "https://www.botframework.com/schemas/error";

/// Runs turns against a channel connector.
#[derive(Clone)]
pub struct BotAdapter {
    connector: Arc<dyn ChannelConnector>,
}

impl BotAdapter {
    /// Creates an adapter that sends through `connector`.
    #[must_use]
    pub fn new(connector: Arc<dyn ChannelConnector>) -> Self {
        Self { connector }
    }

    /// Runs one inbound activity through `handler`.
    ///
    /// A handler failure is logged and reported to the conversation, after
    /// which the turn counts as handled.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidActivity`] if the activity lacks
    /// addressing, and [`AdapterError::TurnFailed`] if the handler failed and
    /// the failure could not be reported to the conversation.
    #[instrument(
        skip(self, activity, handler),
        fields(
            activity_type = ?activity.activity_type,
            channel_id = activity.channel_id.as_deref().unwrap_or_default(),
        )
    )]
    pub async fn process_activity(
        &self,
        activity: Activity,
        handler: &dyn ActivityHandler,
    ) -> Result<(), Report<AdapterError>> {
        validate_inbound(&activity)?;

        let turn = TurnContext::new(activity, self.connector.clone());
        let span = info_span!("turn", turn_id = %turn.id());

        async {
            match handler.on_turn(&turn).await {
                Ok(()) => Ok(()),
                Err(report) => self.on_turn_error(&turn, &report).await,
            }
        }
        .instrument(span)
        .await
    }

    /// Opens a proactive turn in the conversation `reference` points at and
    /// runs `callback` with its context.
    ///
    /// # Errors
    ///
    /// Returns the callback's error.
    pub async fn continue_conversation<F, Fut, T, E>(
        &self,
        reference: &ConversationReference,
        callback: F,
    ) -> Result<T, E>
    where
        F: FnOnce(TurnContext) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let turn = TurnContext::new(reference.continuation_activity(), self.connector.clone());
        let span = info_span!(
            "proactive_turn",
            turn_id = %turn.id(),
            user_id = %reference.user().id,
            conversation_id = %reference.conversation().id,
        );

        callback(turn).instrument(span).await
    }

    /// Logs the failure and tells the conversation about it.
    async fn on_turn_error(
        &self,
        turn: &TurnContext,
        report: &Report<TurnError>,
    ) -> Result<(), Report<AdapterError>> {
        error!(error = %report, "unhandled error during turn");

        let conversation_id = turn
            .activity()
            .conversation
            .as_ref()
            .map(|c| c.id.clone())
            .unwrap_or_default();
        let failed = |e: &dyn std::fmt::Display| {
            error!(error = %e, "failed to report turn error to the conversation");
            AdapterError::TurnFailed {
                conversation_id: conversation_id.clone(),
            }
        };

        turn.send_text(TURN_ERROR_MESSAGE)
            .await
            .map_err(|e| failed(&e))?;
        turn.send_text(TURN_ERROR_FOLLOW_UP)
            .await
            .map_err(|e| failed(&e))?;

        if turn.activity().is_from_emulator() {
            let trace = Activity::trace(
                "OnTurnError Trace",
                "TurnError",
                TURN_ERROR_VALUE_TYPE,
                JsonValue::String(report.to_string()),
            );
            turn.send_activity(trace).await.map_err(|e| failed(&e))?;
        }

        Ok(())
    }
}

/// Checks that an inbound activity can be answered.
fn validate_inbound(activity: &Activity) -> Result<(), Report<AdapterError>> {
    let missing = [
        ("conversation", activity.conversation.is_none()),
        ("from", activity.from.is_none()),
        ("recipient", activity.recipient.is_none()),
        ("serviceUrl", activity.service_url.is_none()),
        ("channelId", activity.channel_id.is_none()),
    ]
    .into_iter()
    .filter_map(|(field, absent)| absent.then_some(field))
    .collect::<Vec<_>>();

    if !missing.is_empty() {
        return Err(AdapterError::InvalidActivity {
            reason: format!("missing {}", missing.join(", ")),
        }
        .into());
    }

    // Replies and stored references are keyed on the sender id.
    if activity
        .from
        .as_ref()
        .is_some_and(|from| from.id.trim().is_empty())
    {
        return Err(AdapterError::InvalidActivity {
            reason: "sender has an empty id".to_string(),
        }
        .into());
    }

    Ok(())
}
