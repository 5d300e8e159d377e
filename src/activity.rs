//! Activity types — the per-turn payloads exchanged with the host.
//!
//! The host delivers one inbound [`Activity`] per turn and the router emits
//! zero or more [`OutboundActivity`] values through the channel adapter.
//! Event names are parsed into [`SkillEvent`] once at the boundary so the
//! rest of the crate dispatches on enums, not strings.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::adapter::ChannelAdapter;
use crate::error::ChannelError;

/// Wire name of the skill-begin event.
pub const EVENT_SKILL_BEGIN: &str = "skillBegin";
/// Wire name of the OAuth token-response event.
pub const EVENT_TOKEN_RESPONSE: &str = "tokens/response";

/// Conversation identifier assigned by the host channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User identifier assigned by the host channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Inbound ─────────────────────────────────────────────────────────

/// An inbound conversational turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Unique activity ID.
    pub id: Uuid,
    /// Conversation this turn belongs to.
    pub conversation: ConversationId,
    /// Who sent it.
    pub sender: UserId,
    /// UI locale of the turn (e.g. "en-us").
    pub locale: String,
    /// When the host received it.
    pub received_at: DateTime<Utc>,
    /// What kind of turn this is.
    pub kind: ActivityKind,
}

impl Activity {
    fn new(conversation: ConversationId, sender: UserId, locale: &str, kind: ActivityKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation,
            sender,
            locale: locale.to_string(),
            received_at: Utc::now(),
            kind,
        }
    }

    /// Build a message turn.
    pub fn message(
        conversation: ConversationId,
        sender: UserId,
        locale: &str,
        text: impl Into<String>,
    ) -> Self {
        Self::new(
            conversation,
            sender,
            locale,
            ActivityKind::Message { text: text.into() },
        )
    }

    /// Build an out-of-band event turn.
    pub fn event(
        conversation: ConversationId,
        sender: UserId,
        locale: &str,
        event: SkillEvent,
    ) -> Self {
        Self::new(conversation, sender, locale, ActivityKind::Event(event))
    }

    /// Build a conversation-start turn.
    pub fn conversation_started(
        conversation: ConversationId,
        sender: UserId,
        locale: &str,
    ) -> Self {
        Self::new(conversation, sender, locale, ActivityKind::ConversationStarted)
    }
}

/// The kind of an inbound turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A user message.
    Message { text: String },
    /// An out-of-band event from the host.
    Event(SkillEvent),
    /// The host opened a new conversation.
    ConversationStarted,
}

/// An out-of-band event, parsed from its wire name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillEvent {
    /// A host-triggered skill start, optionally carrying key/value context.
    Begin { payload: Value },
    /// An OAuth token response for a waiting auth prompt.
    TokenResponse { token: Value },
    /// Anything else. Logged and ignored.
    Unknown { name: String, payload: Value },
}

impl SkillEvent {
    /// Parse a wire-level event name and payload into a typed event.
    pub fn parse(name: &str, payload: Value) -> Self {
        match name {
            EVENT_SKILL_BEGIN => Self::Begin { payload },
            EVENT_TOKEN_RESPONSE => Self::TokenResponse { token: payload },
            other => Self::Unknown {
                name: other.to_string(),
                payload,
            },
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &str {
        match self {
            Self::Begin { .. } => EVENT_SKILL_BEGIN,
            Self::TokenResponse { .. } => EVENT_TOKEN_RESPONSE,
            Self::Unknown { name, .. } => name,
        }
    }
}

// ── Outbound ────────────────────────────────────────────────────────

/// An activity emitted toward the user or the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboundActivity {
    /// Localized templated text toward the user.
    Message { text: String, locale: String },
    /// Signals the host to close the skill invocation.
    EndOfConversation { result: Option<Value> },
}

// ── Turn context ────────────────────────────────────────────────────

/// Ephemeral per-turn context: the inbound activity plus the means to emit
/// outbound activities. Supplied by the host per invocation, discarded after.
pub struct TurnContext {
    pub activity: Activity,
    adapter: Arc<dyn ChannelAdapter>,
}

impl TurnContext {
    pub fn new(activity: Activity, adapter: Arc<dyn ChannelAdapter>) -> Self {
        Self { activity, adapter }
    }

    pub fn conversation(&self) -> &ConversationId {
        &self.activity.conversation
    }

    pub fn sender(&self) -> &UserId {
        &self.activity.sender
    }

    pub fn locale(&self) -> &str {
        &self.activity.locale
    }

    /// Emit an outbound activity through the channel adapter.
    pub async fn send(&self, activity: OutboundActivity) -> Result<(), ChannelError> {
        self.adapter.send(&activity).await
    }

    /// Emit a plain text message in the turn's locale.
    pub async fn send_text(&self, text: impl Into<String>) -> Result<(), ChannelError> {
        self.send(OutboundActivity::Message {
            text: text.into(),
            locale: self.activity.locale.clone(),
        })
        .await
    }
}
