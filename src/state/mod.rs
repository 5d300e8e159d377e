//! Conversation and user state records, behind a get-or-create store.

mod memory;

pub use memory::MemoryStateStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::activity::{ConversationId, UserId};
use crate::error::StateError;

/// Per-conversation mutable record, created lazily on first access.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    /// Number of message turns routed in this conversation.
    pub turn_count: u32,
    /// Label of the last routed intent.
    pub last_intent: Option<String>,
    /// Key/value data handed over by the host in a skill-begin event.
    pub skill_context: serde_json::Map<String, Value>,
}

/// Per-user mutable record, same lifecycle as [`ConversationState`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserState {
    pub preferences: serde_json::Map<String, Value>,
}

/// Host-owned state store. Loads never fail with "not found" — an absent
/// record comes back freshly defaulted.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the conversation record, creating a defaulted one if absent.
    async fn conversation(&self, id: &ConversationId) -> Result<ConversationState, StateError>;

    /// Persist the conversation record.
    async fn save_conversation(
        &self,
        id: &ConversationId,
        state: &ConversationState,
    ) -> Result<(), StateError>;

    /// Load the user record, creating a defaulted one if absent.
    async fn user(&self, id: &UserId) -> Result<UserState, StateError>;

    /// Persist the user record.
    async fn save_user(&self, id: &UserId, state: &UserState) -> Result<(), StateError>;
}
