//! Turn router — the per-turn dispatch core.
//!
//! Flow for a message turn:
//! 1. Interruption check against the shared "general" model
//! 2. If nothing fired: resume the active dialog, or classify against the
//!    skill model and dispatch
//!
//! Out-of-band events (skill begin, token response) bypass both steps.
//! Missing model registrations are configuration errors: the turn aborts
//! with no user-facing message.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::activity::{ActivityKind, OutboundActivity, SkillEvent, TurnContext};
use crate::adapter::TokenProvider;
use crate::config::RouterConfig;
use crate::dialog::{DialogOptions, DialogStack, DialogTurn, ResumeInput};
use crate::error::{ConfigError, Result};
use crate::nlu::{GeneralIntent, NluCatalog, SkillIntent};
use crate::responses::{ResponseCatalog, ResponseKey};
use crate::state::StateStore;

/// Outcome of the interruption check, signalling whether normal routing
/// should still run for the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionAction {
    /// Nothing fired; normal routing proceeds.
    NoAction,
    /// A response was sent; skip routing for this turn.
    MessageSent,
    /// An interruption took over the conversation; skip routing.
    StartedDialog,
}

impl InterruptionAction {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoAction => "no_action",
            Self::MessageSent => "message_sent",
            Self::StartedDialog => "started_dialog",
        }
    }
}

/// Per-turn dialog router for a conversational skill.
///
/// All collaborators are injected at construction; nothing is looked up
/// from ambient context.
pub struct TurnRouter {
    config: RouterConfig,
    state: Arc<dyn StateStore>,
    nlu: NluCatalog,
    responses: ResponseCatalog,
    dialogs: DialogStack,
    tokens: Option<Arc<dyn TokenProvider>>,
}

impl TurnRouter {
    pub fn new(
        config: RouterConfig,
        state: Arc<dyn StateStore>,
        nlu: NluCatalog,
        responses: ResponseCatalog,
        dialogs: DialogStack,
        tokens: Option<Arc<dyn TokenProvider>>,
    ) -> Self {
        Self {
            config,
            state,
            nlu,
            responses,
            dialogs,
            tokens,
        }
    }

    /// Per-turn driver the host calls with each inbound activity.
    pub async fn handle_turn(&self, ctx: &TurnContext) -> Result<()> {
        match &ctx.activity.kind {
            ActivityKind::ConversationStarted => self.on_conversation_start(ctx).await,
            ActivityKind::Event(event) => self.on_event(ctx, &event.clone()).await,
            ActivityKind::Message { text } => {
                let action = self.on_interrupt(ctx).await?;
                if action != InterruptionAction::NoAction {
                    debug!(action = action.label(), "Interruption handled the turn");
                    return Ok(());
                }
                if self.dialogs.is_active(ctx.conversation()).await {
                    let turn = self
                        .dialogs
                        .resume(ctx, ResumeInput::Message(text.clone()))
                        .await?;
                    match turn {
                        DialogTurn::Waiting => Ok(()),
                        DialogTurn::Complete(result) => self.complete(ctx, result).await,
                        DialogTurn::Cancelled => self.complete(ctx, None).await,
                    }
                } else {
                    self.route(ctx).await
                }
            }
        }
    }

    /// Conversation-start handler. Standalone mode greets the user; in
    /// skill mode the host owns the greeting, so this is a no-op.
    pub async fn on_conversation_start(&self, ctx: &TurnContext) -> Result<()> {
        if self.config.skill_mode {
            return Ok(());
        }
        ctx.send_text(self.responses.render(ctx.locale(), ResponseKey::Welcome))
            .await?;
        Ok(())
    }

    /// Interruption check — runs before normal routing on message turns.
    ///
    /// Classifies against the shared "general" model and handles the
    /// higher-priority global intents. Everything else reports `NoAction`
    /// so routing proceeds.
    pub async fn on_interrupt(&self, ctx: &TurnContext) -> Result<InterruptionAction> {
        let ActivityKind::Message { text } = &ctx.activity.kind else {
            return Ok(InterruptionAction::NoAction);
        };

        let classifier = self
            .nlu
            .resolve(ctx.locale(), &self.config.general_model_key)?;
        let recognition = classifier.recognize(text, ctx.locale()).await?;

        match GeneralIntent::from_label(&recognition.intent) {
            GeneralIntent::Cancel => {
                info!(conversation = %ctx.conversation(), "Cancel interruption");
                ctx.send_text(self.responses.render(ctx.locale(), ResponseKey::Cancelled))
                    .await?;
                self.complete(ctx, None).await?;
                self.dialogs.cancel_all(ctx.conversation()).await;
                Ok(InterruptionAction::StartedDialog)
            }
            GeneralIntent::Help => {
                ctx.send_text(self.responses.render(ctx.locale(), ResponseKey::Help))
                    .await?;
                Ok(InterruptionAction::MessageSent)
            }
            GeneralIntent::Logout => {
                self.sign_out(ctx).await?;
                Ok(InterruptionAction::StartedDialog)
            }
            GeneralIntent::None => Ok(InterruptionAction::NoAction),
        }
    }

    /// Default per-turn handler when no interruption fired and no dialog
    /// is active: classify against the skill model and dispatch.
    pub async fn route(&self, ctx: &TurnContext) -> Result<()> {
        let mut state = self.state.conversation(ctx.conversation()).await?;

        let classifier = self
            .nlu
            .resolve(ctx.locale(), &self.config.skill_model_key)?;
        let text = match &ctx.activity.kind {
            ActivityKind::Message { text } => text.as_str(),
            _ => "",
        };
        let recognition = classifier.recognize(text, ctx.locale()).await?;
        let intent = SkillIntent::from_label(&recognition.intent);
        debug!(
            conversation = %ctx.conversation(),
            intent = intent.label(),
            score = recognition.score,
            "Routing turn"
        );

        state.turn_count += 1;
        state.last_intent = Some(intent.label().to_string());
        self.state
            .save_conversation(ctx.conversation(), &state)
            .await?;

        match intent {
            SkillIntent::Sample => {
                let options = DialogOptions {
                    skill_mode: self.config.skill_mode,
                };
                let turn = self
                    .dialogs
                    .begin(ctx, &self.config.sample_dialog_name, &options)
                    .await?;
                match turn {
                    DialogTurn::Waiting => Ok(()),
                    DialogTurn::Complete(result) => self.complete(ctx, result).await,
                    DialogTurn::Cancelled => self.complete(ctx, None).await,
                }
            }
            SkillIntent::None => {
                ctx.send_text(self.responses.render(ctx.locale(), ResponseKey::Confused))
                    .await?;
                if self.config.skill_mode {
                    self.complete(ctx, None).await?;
                }
                Ok(())
            }
            SkillIntent::Unsupported(name) => {
                debug!(intent = %name, "Recognized but unhandled intent");
                ctx.send_text(
                    self.responses
                        .render(ctx.locale(), ResponseKey::FeatureUnavailable),
                )
                .await?;
                if self.config.skill_mode {
                    self.complete(ctx, None).await?;
                }
                Ok(())
            }
        }
    }

    /// Centralized end-of-conversation. In skill mode, signals the host
    /// with exactly one EndOfConversation activity before ending the
    /// active dialog; standalone just ends the dialog.
    pub async fn complete(&self, ctx: &TurnContext, result: Option<Value>) -> Result<()> {
        if self.config.skill_mode {
            ctx.send(OutboundActivity::EndOfConversation {
                result: result.clone(),
            })
            .await?;
        }
        self.dialogs.end_active(ctx.conversation()).await;
        info!(
            conversation = %ctx.conversation(),
            has_result = result.is_some(),
            "Conversation completed"
        );
        Ok(())
    }

    /// Out-of-band event handler.
    pub async fn on_event(&self, ctx: &TurnContext, event: &SkillEvent) -> Result<()> {
        match event {
            SkillEvent::Begin { payload } => {
                let mut state = self.state.conversation(ctx.conversation()).await?;
                // Extension point: stash host-supplied key/value context so
                // sub-dialogs can read it later.
                if let Value::Object(map) = payload {
                    for (key, value) in map {
                        state.skill_context.insert(key.clone(), value.clone());
                    }
                }
                self.state
                    .save_conversation(ctx.conversation(), &state)
                    .await?;
                debug!(
                    conversation = %ctx.conversation(),
                    keys = state.skill_context.len(),
                    "Skill begin event"
                );
                Ok(())
            }
            SkillEvent::TokenResponse { token } => {
                let turn = self
                    .dialogs
                    .resume(ctx, ResumeInput::TokenResponse(token.clone()))
                    .await?;
                if turn != DialogTurn::Waiting && self.config.skill_mode {
                    ctx.send(OutboundActivity::EndOfConversation { result: None })
                        .await?;
                }
                Ok(())
            }
            SkillEvent::Unknown { name, .. } => {
                debug!(event = %name, "Ignoring unknown event");
                Ok(())
            }
        }
    }

    /// Logout interruption: requires the token capability, clears the
    /// dialog stack, revokes every stored token, then confirms.
    async fn sign_out(&self, ctx: &TurnContext) -> Result<()> {
        let tokens = self
            .tokens
            .as_ref()
            .ok_or(ConfigError::TokenSupportUnavailable)?;

        self.dialogs.cancel_all(ctx.conversation()).await;

        let statuses = tokens.token_status(ctx.sender()).await?;
        let mut revoked = 0usize;
        for status in &statuses {
            if let Err(e) = tokens.sign_out(ctx.sender(), &status.connection_name).await {
                warn!(
                    connection = %status.connection_name,
                    error = %e,
                    "Failed to revoke token"
                );
            } else {
                revoked += 1;
            }
        }
        info!(user = %ctx.sender(), revoked, total = statuses.len(), "Signed user out");

        ctx.send_text(self.responses.render(ctx.locale(), ResponseKey::SignedOut))
            .await?;
        Ok(())
    }
}
