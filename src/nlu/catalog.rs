//! Per-locale registry of named NLU models.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::nlu::IntentClassifier;

/// Locale-keyed registry of named classifiers.
///
/// Resolution order: exact locale → language prefix ("en-us" → "en") →
/// configured fallback locale. A model missing for the active locale is a
/// configuration error, not recoverable at runtime.
pub struct NluCatalog {
    models: HashMap<String, HashMap<String, Arc<dyn IntentClassifier>>>,
    fallback_locale: String,
}

impl NluCatalog {
    pub fn new(fallback_locale: impl Into<String>) -> Self {
        Self {
            models: HashMap::new(),
            fallback_locale: normalize(&fallback_locale.into()),
        }
    }

    /// Register a classifier under `key` for `locale`.
    pub fn register(
        &mut self,
        locale: &str,
        key: impl Into<String>,
        classifier: Arc<dyn IntentClassifier>,
    ) {
        self.models
            .entry(normalize(locale))
            .or_default()
            .insert(key.into(), classifier);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_model(
        mut self,
        locale: &str,
        key: impl Into<String>,
        classifier: Arc<dyn IntentClassifier>,
    ) -> Self {
        self.register(locale, key, classifier);
        self
    }

    /// Resolve the classifier registered under `key` for `locale`.
    pub fn resolve(
        &self,
        locale: &str,
        key: &str,
    ) -> Result<Arc<dyn IntentClassifier>, ConfigError> {
        let locale = normalize(locale);
        for candidate in [
            locale.as_str(),
            language_of(&locale),
            self.fallback_locale.as_str(),
        ] {
            if let Some(classifier) = self.models.get(candidate).and_then(|m| m.get(key)) {
                return Ok(Arc::clone(classifier));
            }
        }
        Err(ConfigError::ModelNotRegistered {
            locale,
            key: key.to_string(),
        })
    }
}

fn normalize(locale: &str) -> String {
    locale.trim().to_ascii_lowercase()
}

/// Language part of a locale tag ("en-us" → "en").
fn language_of(locale: &str) -> &str {
    locale.split('-').next().unwrap_or(locale)
}
