//! Channel boundary — pure I/O, no routing logic.

mod cli;

pub use cli::CliAdapter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::activity::{OutboundActivity, UserId};
use crate::error::ChannelError;

/// Outbound side of a message channel.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Channel name (e.g. "cli", "webchat").
    fn name(&self) -> &str;

    /// Deliver an outbound activity.
    async fn send(&self, activity: &OutboundActivity) -> Result<(), ChannelError>;
}

/// Status of a stored auth token for one connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenStatus {
    /// OAuth connection name the token belongs to.
    pub connection_name: String,
    /// Whether a token is currently stored.
    pub has_token: bool,
}

/// Token operations of a channel that supports them.
///
/// Resolved once at router construction: an adapter either provides this
/// capability or it does not. Sign-out against a channel without it is a
/// configuration error.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Enumerate stored tokens for a user across all connections.
    async fn token_status(&self, user: &UserId) -> Result<Vec<TokenStatus>, ChannelError>;

    /// Revoke the user's token for one connection.
    async fn sign_out(&self, user: &UserId, connection_name: &str) -> Result<(), ChannelError>;
}
