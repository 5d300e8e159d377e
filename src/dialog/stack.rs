//! Per-conversation stack of active dialog frames.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::activity::{ConversationId, TurnContext};
use crate::dialog::{Dialog, DialogOptions, DialogTurn, ResumeInput};
use crate::error::DialogError;

struct Frame {
    dialog: String,
    state: Value,
}

/// Dialog engine: a name-keyed registry of dialogs plus one frame stack per
/// conversation. Turn delivery is serialized per conversation by the host,
/// so a single mutex over all stacks is enough.
#[derive(Default)]
pub struct DialogStack {
    dialogs: HashMap<String, Arc<dyn Dialog>>,
    stacks: Mutex<HashMap<ConversationId, Vec<Frame>>>,
}

impl DialogStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dialog under its own name.
    pub fn register(&mut self, dialog: Arc<dyn Dialog>) {
        self.dialogs.insert(dialog.name().to_string(), dialog);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_dialog(mut self, dialog: Arc<dyn Dialog>) -> Self {
        self.register(dialog);
        self
    }

    /// Whether the conversation has an active dialog.
    pub async fn is_active(&self, conversation: &ConversationId) -> bool {
        let stacks = self.stacks.lock().await;
        stacks.get(conversation).is_some_and(|s| !s.is_empty())
    }

    /// Begin the named dialog on top of the conversation's stack.
    pub async fn begin(
        &self,
        ctx: &TurnContext,
        name: &str,
        options: &DialogOptions,
    ) -> Result<DialogTurn, DialogError> {
        let dialog = self
            .dialogs
            .get(name)
            .ok_or_else(|| DialogError::UnknownDialog(name.to_string()))?;

        let mut state = Value::Null;
        let turn = dialog.begin(ctx, &mut state, options).await?;

        if turn == DialogTurn::Waiting {
            let mut stacks = self.stacks.lock().await;
            stacks
                .entry(ctx.conversation().clone())
                .or_default()
                .push(Frame {
                    dialog: name.to_string(),
                    state,
                });
        }
        debug!(dialog = name, conversation = %ctx.conversation(), "Began dialog");
        Ok(turn)
    }

    /// Resume the active dialog with new input.
    ///
    /// With nothing on the stack this reports `Complete(None)` — there is
    /// no dialog left waiting.
    pub async fn resume(
        &self,
        ctx: &TurnContext,
        input: ResumeInput,
    ) -> Result<DialogTurn, DialogError> {
        let mut stacks = self.stacks.lock().await;
        let Some(frame) = stacks
            .get_mut(ctx.conversation())
            .and_then(|s| s.last_mut())
        else {
            return Ok(DialogTurn::Complete(None));
        };

        let dialog = self
            .dialogs
            .get(&frame.dialog)
            .ok_or_else(|| DialogError::UnknownDialog(frame.dialog.clone()))?;

        let turn = dialog.resume(ctx, &mut frame.state, input).await?;

        if turn != DialogTurn::Waiting {
            if let Some(stack) = stacks.get_mut(ctx.conversation()) {
                stack.pop();
            }
        }
        Ok(turn)
    }

    /// Clear the conversation's entire stack.
    pub async fn cancel_all(&self, conversation: &ConversationId) {
        let mut stacks = self.stacks.lock().await;
        if let Some(stack) = stacks.remove(conversation) {
            debug!(
                conversation = %conversation,
                cancelled = stack.len(),
                "Cancelled all dialogs"
            );
        }
    }

    /// Pop the active dialog frame, if any.
    pub async fn end_active(&self, conversation: &ConversationId) {
        let mut stacks = self.stacks.lock().await;
        if let Some(stack) = stacks.get_mut(conversation) {
            stack.pop();
        }
    }
}
