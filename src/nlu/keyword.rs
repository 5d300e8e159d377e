//! Deterministic keyword classifier — regex rules, first match wins.
//!
//! Used by the demo binary and tests. Real deployments inject a model-backed
//! [`IntentClassifier`] instead.

use async_trait::async_trait;
use regex::RegexBuilder;

use crate::error::NluError;
use crate::nlu::{IntentClassifier, Recognition};

#[derive(Debug)]
struct Rule {
    intent: String,
    pattern: regex::Regex,
}

/// Regex-rule classifier. Rules are evaluated in registration order; the
/// first match wins with a score of 1.0, otherwise the result is "None".
#[derive(Debug)]
pub struct KeywordClassifier {
    name: String,
    rules: Vec<Rule>,
}

impl KeywordClassifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Add a case-insensitive rule mapping `pattern` to `intent`.
    pub fn rule(mut self, intent: impl Into<String>, pattern: &str) -> Result<Self, NluError> {
        let compiled = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| NluError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
        self.rules.push(Rule {
            intent: intent.into(),
            pattern: compiled,
        });
        Ok(self)
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn recognize(&self, text: &str, _locale: &str) -> Result<Recognition, NluError> {
        for rule in &self.rules {
            if rule.pattern.is_match(text) {
                return Ok(Recognition {
                    intent: rule.intent.clone(),
                    score: 1.0,
                    entities: serde_json::Value::Null,
                });
            }
        }
        Ok(Recognition::none())
    }
}
