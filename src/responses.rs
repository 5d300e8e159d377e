//! Localized response templates.

use std::collections::HashMap;

/// Keys for the canned responses the router sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKey {
    Welcome,
    Confused,
    FeatureUnavailable,
    Cancelled,
    Help,
    SignedOut,
}

/// Per-locale template table.
///
/// Lookup resolves exact locale → language prefix → fallback locale. A
/// missing template falls back rather than failing — responses are not
/// configuration-fatal the way NLU models are.
pub struct ResponseCatalog {
    templates: HashMap<String, HashMap<ResponseKey, String>>,
    fallback_locale: String,
}

impl ResponseCatalog {
    pub fn new(fallback_locale: impl Into<String>) -> Self {
        Self {
            templates: HashMap::new(),
            fallback_locale: normalize(&fallback_locale.into()),
        }
    }

    /// Set the template for `key` in `locale`.
    pub fn set(&mut self, locale: &str, key: ResponseKey, text: impl Into<String>) {
        self.templates
            .entry(normalize(locale))
            .or_default()
            .insert(key, text.into());
    }

    /// Builder-style [`set`](Self::set).
    pub fn with_template(mut self, locale: &str, key: ResponseKey, text: impl Into<String>) -> Self {
        self.set(locale, key, text);
        self
    }

    /// Render the template for `key` in the best matching locale.
    pub fn render(&self, locale: &str, key: ResponseKey) -> String {
        let locale = normalize(locale);
        for candidate in [
            locale.as_str(),
            language_of(&locale),
            self.fallback_locale.as_str(),
        ] {
            if let Some(text) = self.templates.get(candidate).and_then(|t| t.get(&key)) {
                return text.clone();
            }
        }
        // Last resort so the conversation never goes silent.
        "Sorry, something went wrong.".to_string()
    }
}

impl Default for ResponseCatalog {
    fn default() -> Self {
        let mut catalog = Self::new("en");
        catalog.set(
            "en",
            ResponseKey::Welcome,
            "Welcome! Say \"sample\" to try out this skill.",
        );
        catalog.set("en", ResponseKey::Confused, "Sorry, I didn't understand that.");
        catalog.set(
            "en",
            ResponseKey::FeatureUnavailable,
            "I can't handle that yet, but it's on the roadmap.",
        );
        catalog.set("en", ResponseKey::Cancelled, "Okay, I've cancelled that.");
        catalog.set(
            "en",
            ResponseKey::Help,
            "You can say \"sample\" to run the demo, or \"cancel\" to stop.",
        );
        catalog.set("en", ResponseKey::SignedOut, "You've been signed out.");
        catalog
    }
}

fn normalize(locale: &str) -> String {
    locale.trim().to_ascii_lowercase()
}

fn language_of(locale: &str) -> &str {
    locale.split('-').next().unwrap_or(locale)
}
