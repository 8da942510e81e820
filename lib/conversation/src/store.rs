//! Conversation reference storage.
//!
//! The store maps a user id to the most recent conversation reference seen
//! from that user. Entries are overwritten on every capture and never removed.

use crate::activity::Activity;
use crate::error::ConversationError;
use crate::reference::ConversationReference;
use async_trait::async_trait;
use rootcause::Report;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Trait for conversation reference storage.
///
/// Implementations must tolerate concurrent upserts and snapshot reads.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// Captures the reference of `activity` under its sender's id, replacing
    /// any earlier entry for that user. Returns the stored reference.
    async fn upsert(
        &self,
        activity: &Activity,
    ) -> Result<ConversationReference, Report<ConversationError>>;

    /// Returns a snapshot of every stored reference.
    async fn all(&self) -> Vec<ConversationReference>;

    /// Returns the reference stored for a user, if any.
    async fn get(&self, user_id: &str) -> Option<ConversationReference>;

    /// Returns the number of users with a stored reference.
    async fn len(&self) -> usize;

    /// Returns true if no reference has been stored yet.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Process-lifetime reference store held in memory.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReferenceStore {
    references: Arc<RwLock<HashMap<String, ConversationReference>>>,
}

impl InMemoryReferenceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReferenceStore for InMemoryReferenceStore {
    async fn upsert(
        &self,
        activity: &Activity,
    ) -> Result<ConversationReference, Report<ConversationError>> {
        let reference = ConversationReference::from_activity(activity)?;
        let user_id = reference.user().id.clone();

        let previous = self
            .references
            .write()
            .await
            .insert(user_id.clone(), reference.clone());

        debug!(
            user_id = %user_id,
            conversation_id = %reference.conversation().id,
            replaced = previous.is_some(),
            "stored conversation reference"
        );

        Ok(reference)
    }

    async fn all(&self) -> Vec<ConversationReference> {
        self.references.read().await.values().cloned().collect()
    }

    async fn get(&self, user_id: &str) -> Option<ConversationReference> {
        self.references.read().await.get(user_id).cloned()
    }

    async fn len(&self) -> usize {
        self.references.read().await.len()
    }
}
