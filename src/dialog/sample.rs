//! Sample sub-dialog — a two-step demo flow.
//!
//! Asks for the user's name, greets them, and completes with the collected
//! name as its result.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::activity::TurnContext;
use crate::dialog::{Dialog, DialogOptions, DialogTurn, ResumeInput};
use crate::error::DialogError;

/// Default registration name.
pub const SAMPLE_DIALOG_NAME: &str = "sample";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Step {
    AskName,
}

#[derive(Debug, Serialize, Deserialize)]
struct SampleState {
    step: Step,
    skill_mode: bool,
}

pub struct SampleDialog;

impl SampleDialog {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SampleDialog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Dialog for SampleDialog {
    fn name(&self) -> &str {
        SAMPLE_DIALOG_NAME
    }

    async fn begin(
        &self,
        ctx: &TurnContext,
        state: &mut Value,
        options: &DialogOptions,
    ) -> Result<DialogTurn, DialogError> {
        let dialog_state = SampleState {
            step: Step::AskName,
            skill_mode: options.skill_mode,
        };
        *state = serde_json::to_value(&dialog_state).map_err(|e| DialogError::Failed {
            name: SAMPLE_DIALOG_NAME.to_string(),
            reason: e.to_string(),
        })?;

        ctx.send_text("What is your name?")
            .await
            .map_err(|e| DialogError::Failed {
                name: SAMPLE_DIALOG_NAME.to_string(),
                reason: e.to_string(),
            })?;
        Ok(DialogTurn::Waiting)
    }

    async fn resume(
        &self,
        ctx: &TurnContext,
        state: &mut Value,
        input: ResumeInput,
    ) -> Result<DialogTurn, DialogError> {
        let dialog_state: SampleState =
            serde_json::from_value(state.clone()).map_err(|e| DialogError::InvalidState(e.to_string()))?;

        let text = match input {
            ResumeInput::Message(text) => text,
            ResumeInput::TokenResponse(_) => {
                // Not an auth flow; keep waiting for the name.
                debug!("Sample dialog ignoring token response");
                return Ok(DialogTurn::Waiting);
            }
        };

        match dialog_state.step {
            Step::AskName => {
                let name = text.trim().to_string();
                ctx.send_text(format!("Nice to meet you, {}!", name))
                    .await
                    .map_err(|e| DialogError::Failed {
                        name: SAMPLE_DIALOG_NAME.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(DialogTurn::Complete(Some(serde_json::json!({
                    "name": name
                }))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{Activity, ConversationId, OutboundActivity, UserId};
    use crate::adapter::ChannelAdapter;
    use crate::error::ChannelError;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct Recording {
        sent: Mutex<Vec<OutboundActivity>>,
    }

    #[async_trait]
    impl ChannelAdapter for Recording {
        fn name(&self) -> &str {
            "recording"
        }
        async fn send(&self, activity: &OutboundActivity) -> Result<(), ChannelError> {
            self.sent.lock().await.push(activity.clone());
            Ok(())
        }
    }

    fn setup() -> (TurnContext, Arc<Recording>) {
        let adapter = Arc::new(Recording {
            sent: Mutex::new(Vec::new()),
        });
        let ctx = TurnContext::new(
            Activity::message(
                ConversationId::new("c1"),
                UserId::new("u1"),
                "en",
                "run the sample",
            ),
            adapter.clone(),
        );
        (ctx, adapter)
    }

    #[tokio::test]
    async fn asks_for_name_then_greets() {
        let (ctx, adapter) = setup();
        let dialog = SampleDialog::new();
        let mut state = Value::Null;

        let turn = dialog
            .begin(&ctx, &mut state, &DialogOptions::default())
            .await
            .unwrap();
        assert_eq!(turn, DialogTurn::Waiting);

        let turn = dialog
            .resume(&ctx, &mut state, ResumeInput::Message("  Alice ".into()))
            .await
            .unwrap();
        assert_eq!(
            turn,
            DialogTurn::Complete(Some(serde_json::json!({"name": "Alice"})))
        );

        let sent = adapter.sent.lock().await;
        assert_eq!(sent.len(), 2);
        match &sent[1] {
            OutboundActivity::Message { text, .. } => {
                assert_eq!(text, "Nice to meet you, Alice!")
            }
            other => panic!("expected Message, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn token_response_keeps_waiting() {
        let (ctx, _adapter) = setup();
        let dialog = SampleDialog::new();
        let mut state = Value::Null;

        dialog
            .begin(&ctx, &mut state, &DialogOptions::default())
            .await
            .unwrap();
        let turn = dialog
            .resume(
                &ctx,
                &mut state,
                ResumeInput::TokenResponse(serde_json::json!({"token": "abc"})),
            )
            .await
            .unwrap();
        assert_eq!(turn, DialogTurn::Waiting);
    }
}
