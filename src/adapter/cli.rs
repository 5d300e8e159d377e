//! CLI adapter — writes outbound activities to stdout for local testing.

use async_trait::async_trait;

use crate::activity::OutboundActivity;
use crate::adapter::ChannelAdapter;
use crate::error::ChannelError;

/// Prints messages to stdout. End-of-conversation signals go to stderr so
/// piped output stays clean.
pub struct CliAdapter;

impl CliAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CliAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChannelAdapter for CliAdapter {
    fn name(&self) -> &str {
        "cli"
    }

    async fn send(&self, activity: &OutboundActivity) -> Result<(), ChannelError> {
        match activity {
            OutboundActivity::Message { text, .. } => {
                println!("\n{}\n", text);
            }
            OutboundActivity::EndOfConversation { result } => match result {
                Some(value) => eprintln!("[conversation ended: {}]", value),
                None => eprintln!("[conversation ended]"),
            },
        }
        Ok(())
    }
}
