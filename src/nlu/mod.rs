//! Intent classification boundary.
//!
//! The classifier itself is an external collaborator — only the trait and a
//! deterministic keyword implementation live here. Classifier output is a
//! raw string label; the router parses it into [`SkillIntent`] /
//! [`GeneralIntent`] so dispatch is an exhaustive match.

mod catalog;
mod keyword;

pub use catalog::NluCatalog;
pub use keyword::KeywordClassifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::NluError;

/// Intent label returned by a classifier when nothing matched.
pub const INTENT_NONE: &str = "None";

/// Raw classifier output. Confidence and entities are carried through but
/// unused by the router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recognition {
    /// Top intent label.
    pub intent: String,
    /// Confidence score for the top intent.
    pub score: f32,
    /// Extracted entities, classifier-specific shape.
    pub entities: Value,
}

impl Recognition {
    /// A "nothing matched" result.
    pub fn none() -> Self {
        Self {
            intent: INTENT_NONE.to_string(),
            score: 0.0,
            entities: Value::Null,
        }
    }
}

/// Natural-language intent classifier, keyed by a named model per locale
/// in the [`NluCatalog`].
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classifier name for logging.
    fn name(&self) -> &str;

    /// Classify a message, returning the top intent.
    async fn recognize(&self, text: &str, locale: &str) -> Result<Recognition, NluError>;
}

impl std::fmt::Debug for dyn IntentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentClassifier")
            .field("name", &self.name())
            .finish()
    }
}

// ── Typed intents ───────────────────────────────────────────────────

/// Intents of the skill's own model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillIntent {
    /// Start the sample sub-dialog.
    Sample,
    /// Nothing recognized.
    None,
    /// Recognized but not handled by this skill.
    Unsupported(String),
}

impl SkillIntent {
    /// Parse a classifier label.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Sample" => Self::Sample,
            "" | INTENT_NONE => Self::None,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Label for logging and state records.
    pub fn label(&self) -> &str {
        match self {
            Self::Sample => "Sample",
            Self::None => INTENT_NONE,
            Self::Unsupported(name) => name,
        }
    }
}

/// Higher-priority global intents, checked before normal routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralIntent {
    Cancel,
    Help,
    Logout,
    /// Anything else, including "none" — lets normal routing proceed.
    None,
}

impl GeneralIntent {
    /// Parse a classifier label.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Cancel" => Self::Cancel,
            "Help" => Self::Help,
            "Logout" => Self::Logout,
            _ => Self::None,
        }
    }
}
