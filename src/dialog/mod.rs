//! Sub-dialog abstraction and the per-conversation dialog stack.

mod sample;
mod stack;

pub use sample::{SAMPLE_DIALOG_NAME, SampleDialog};
pub use stack::DialogStack;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::activity::TurnContext;
use crate::error::DialogError;

/// Options passed to a sub-dialog when it begins.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DialogOptions {
    /// Whether the router runs embedded in a host bot.
    pub skill_mode: bool,
}

/// Input delivered when a waiting dialog is resumed.
#[derive(Debug, Clone)]
pub enum ResumeInput {
    /// The next user message.
    Message(String),
    /// An OAuth token response for a waiting auth prompt.
    TokenResponse(Value),
}

/// Outcome of one dialog turn.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogTurn {
    /// The dialog awaits further input; it stays on the stack.
    Waiting,
    /// The dialog finished, optionally with a result for the host.
    Complete(Option<Value>),
    /// The dialog aborted without a result.
    Cancelled,
}

/// A polymorphic sub-dialog, addressable by name.
///
/// Dialog instance state is an opaque serde value owned by the stack; the
/// dialog reads and mutates it each turn.
#[async_trait]
pub trait Dialog: Send + Sync {
    /// Name the dialog is registered and begun under.
    fn name(&self) -> &str;

    /// Start the dialog.
    async fn begin(
        &self,
        ctx: &TurnContext,
        state: &mut Value,
        options: &DialogOptions,
    ) -> Result<DialogTurn, DialogError>;

    /// Resume a waiting dialog with new input.
    async fn resume(
        &self,
        ctx: &TurnContext,
        state: &mut Value,
        input: ResumeInput,
    ) -> Result<DialogTurn, DialogError>;
}
