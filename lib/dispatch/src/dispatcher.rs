//! Proactive fan-out.
//!
//! The dispatcher replays every stored conversation reference through the
//! adapter and sends one message into each conversation. Sends run
//! concurrently and independently; a failed send is logged and reported but
//! never stops the others.

use futures::future::join_all;
use proactive_bot_conversation::{ConversationReference, ReferenceStore};
use proactive_bot_core::DispatchId;
use proactive_bot_integration::{AdapterError, BotAdapter};
use rootcause::Report;
use rootcause::prelude::ResultExt;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Message sent when none is configured.
pub const DEFAULT_PROACTIVE_MESSAGE: &str = "proactive hello";

/// One reference the dispatcher could not deliver to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchFailure {
    pub user_id: String,
    pub conversation_id: String,
    pub reason: String,
}

/// Outcome of a single `notify_all` run.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub dispatch_id: DispatchId,
    /// Number of references a send was attempted for.
    pub attempted: usize,
    /// Number of sends the channel accepted.
    pub delivered: usize,
    pub failures: Vec<DispatchFailure>,
}

impl DispatchReport {
    /// Returns true when every attempted send was delivered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Sends a proactive message to everyone in the reference store.
#[derive(Clone)]
pub struct ProactiveDispatcher {
    adapter: BotAdapter,
    store: Arc<dyn ReferenceStore>,
    message: String,
}

impl std::fmt::Debug for ProactiveDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProactiveDispatcher")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl ProactiveDispatcher {
    #[must_use]
    pub fn new(adapter: BotAdapter, store: Arc<dyn ReferenceStore>) -> Self {
        Self {
            adapter,
            store,
            message: DEFAULT_PROACTIVE_MESSAGE.to_string(),
        }
    }

    /// Overrides the text sent to each conversation.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Sends the proactive message into every stored conversation.
    ///
    /// Returns once every send has been attempted.
    #[instrument(skip(self), fields(dispatch_id = tracing::field::Empty))]
    pub async fn notify_all(&self) -> DispatchReport {
        let dispatch_id = DispatchId::new();
        tracing::Span::current().record("dispatch_id", tracing::field::display(dispatch_id));

        let references = self.store.all().await;
        let attempted = references.len();

        let outcomes = join_all(references.iter().map(|r| self.notify_one(r))).await;

        let failures = references
            .iter()
            .zip(outcomes)
            .filter_map(|(reference, outcome)| {
                let report = outcome.err()?;
                let failure = DispatchFailure {
                    user_id: reference.user().id.clone(),
                    conversation_id: reference.conversation().id.clone(),
                    reason: report.to_string(),
                };
                warn!(
                    user_id = %failure.user_id,
                    conversation_id = %failure.conversation_id,
                    error = %failure.reason,
                    "proactive send failed"
                );
                Some(failure)
            })
            .collect::<Vec<_>>();

        let delivered = attempted - failures.len();
        info!(attempted, delivered, failed = failures.len(), "proactive dispatch finished");

        DispatchReport {
            dispatch_id,
            attempted,
            delivered,
            failures,
        }
    }

    async fn notify_one(
        &self,
        reference: &ConversationReference,
    ) -> Result<(), Report<AdapterError>> {
        let message = self.message.clone();
        self.adapter
            .continue_conversation(reference, |turn| async move {
                turn.send_text(message).await
            })
            .await
            .context(AdapterError::ContinuationFailed {
                user_id: reference.user().id.clone(),
                conversation_id: reference.conversation().id.clone(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::tests::{RecordingConnector, message_from};
    use proactive_bot_conversation::InMemoryReferenceStore;

    async fn seeded(users: &[(&str, &str)]) -> InMemoryReferenceStore {
        let store = InMemoryReferenceStore::new();
        for (user, conversation) in users {
            store
                .upsert(&message_from(user, conversation, "hi"))
                .await
                .unwrap();
        }
        store
    }

    fn dispatcher(
        store: &InMemoryReferenceStore,
        connector: Arc<RecordingConnector>,
    ) -> ProactiveDispatcher {
        ProactiveDispatcher::new(BotAdapter::new(connector), Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn empty_store_sends_nothing() {
        let store = InMemoryReferenceStore::new();
        let connector = Arc::new(RecordingConnector::default());

        let report = dispatcher(&store, connector.clone()).notify_all().await;

        assert_eq!(report.attempted, 0);
        assert_eq!(report.delivered, 0);
        assert!(report.is_complete());
        assert!(connector.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn every_reference_gets_the_message() {
        let store = seeded(&[("alice", "c-a"), ("bob", "c-b"), ("carol", "c-c")]).await;
        let connector = Arc::new(RecordingConnector::default());

        let report = dispatcher(&store, connector.clone()).notify_all().await;

        assert_eq!(report.attempted, 3);
        assert_eq!(report.delivered, 3);
        assert_eq!(connector.texts(), vec![DEFAULT_PROACTIVE_MESSAGE; 3]);

        let mut recipients = connector
            .sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|a| a.recipient.as_ref().map(|r| r.id.clone()))
            .collect::<Vec<_>>();
        recipients.sort();
        assert_eq!(recipients, vec!["alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn proactive_messages_are_not_replies() {
        let store = seeded(&[("alice", "c-a")]).await;
        let connector = Arc::new(RecordingConnector::default());

        dispatcher(&store, connector.clone()).notify_all().await;

        let sent = connector.sent.lock().unwrap();
        assert!(sent[0].reply_to_id.is_none());
        assert_eq!(sent[0].conversation.as_ref().map(|c| c.id.as_str()), Some("c-a"));
    }

    #[tokio::test]
    async fn failures_do_not_stop_other_sends() {
        let store = seeded(&[("alice", "c-a"), ("bob", "c-b"), ("carol", "c-c")]).await;
        let connector = Arc::new(RecordingConnector::failing(&["c-b"]));

        let report = dispatcher(&store, connector.clone()).notify_all().await;

        assert_eq!(report.attempted, 3);
        assert_eq!(report.delivered, 2);
        assert_eq!(connector.sent.lock().unwrap().len(), 3);
        assert_eq!(report.failures.len(), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.user_id, "bob");
        assert_eq!(failure.conversation_id, "c-b");
        assert!(failure.reason.contains("user bob"));
    }

    #[tokio::test]
    async fn all_failing_still_attempts_everyone() {
        let store = seeded(&[("alice", "c-a"), ("bob", "c-b")]).await;
        let connector = Arc::new(RecordingConnector::failing(&["c-a", "c-b"]));

        let report = dispatcher(&store, connector.clone()).notify_all().await;

        assert_eq!(report.attempted, 2);
        assert_eq!(report.delivered, 0);
        assert!(!report.is_complete());
        assert_eq!(connector.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn configured_message_is_sent() {
        let store = seeded(&[("alice", "c-a")]).await;
        let connector = Arc::new(RecordingConnector::default());

        dispatcher(&store, connector.clone())
            .with_message("system maintenance at noon")
            .notify_all()
            .await;

        assert_eq!(connector.texts(), vec!["system maintenance at noon"]);
    }

    #[tokio::test]
    async fn each_run_has_its_own_dispatch_id() {
        let store = seeded(&[("alice", "c-a")]).await;
        let connector = Arc::new(RecordingConnector::default());
        let dispatcher = dispatcher(&store, connector);

        let first = dispatcher.notify_all().await;
        let second = dispatcher.notify_all().await;

        assert_ne!(first.dispatch_id, second.dispatch_id);
        assert!(first.dispatch_id.to_string().starts_with("dsp_"));
    }
}
