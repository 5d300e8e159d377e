//! In-process state store for tests and the demo binary.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::activity::{ConversationId, UserId};
use crate::error::StateError;
use crate::state::{ConversationState, StateStore, UserState};

/// Mutex-map backed [`StateStore`]. Records live for the process lifetime.
#[derive(Default)]
pub struct MemoryStateStore {
    conversations: Mutex<HashMap<ConversationId, ConversationState>>,
    users: Mutex<HashMap<UserId, UserState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn conversation(&self, id: &ConversationId) -> Result<ConversationState, StateError> {
        let map = self.conversations.lock().await;
        Ok(map.get(id).cloned().unwrap_or_default())
    }

    async fn save_conversation(
        &self,
        id: &ConversationId,
        state: &ConversationState,
    ) -> Result<(), StateError> {
        let mut map = self.conversations.lock().await;
        map.insert(id.clone(), state.clone());
        Ok(())
    }

    async fn user(&self, id: &UserId) -> Result<UserState, StateError> {
        let map = self.users.lock().await;
        Ok(map.get(id).cloned().unwrap_or_default())
    }

    async fn save_user(&self, id: &UserId, state: &UserState) -> Result<(), StateError> {
        let mut map = self.users.lock().await;
        map.insert(id.clone(), state.clone());
        Ok(())
    }
}
