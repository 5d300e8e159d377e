//! Router configuration.

use crate::dialog::SAMPLE_DIALOG_NAME;

/// Configuration for the turn router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Whether the router runs embedded in a host bot ("skill mode") or
    /// standalone. Skill mode signals EndOfConversation toward the host.
    pub skill_mode: bool,
    /// Locale used when no model/template exists for the turn's locale.
    pub fallback_locale: String,
    /// Catalog key of the skill's own NLU model.
    pub skill_model_key: String,
    /// Catalog key of the shared interruption ("general") NLU model.
    pub general_model_key: String,
    /// Registered name of the sample sub-dialog.
    pub sample_dialog_name: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            skill_mode: false,
            fallback_locale: "en".to_string(),
            skill_model_key: "skill".to_string(),
            general_model_key: "general".to_string(),
            sample_dialog_name: SAMPLE_DIALOG_NAME.to_string(),
        }
    }
}

impl RouterConfig {
    /// Build a config from environment variables, falling back to defaults.
    ///
    /// `SKILL_ROUTER_SKILL_MODE` — "1"/"true" enables skill mode.
    /// `SKILL_ROUTER_LOCALE` — fallback locale tag.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var("SKILL_ROUTER_SKILL_MODE") {
            config.skill_mode = matches!(value.as_str(), "1" | "true" | "yes");
        }
        if let Ok(locale) = std::env::var("SKILL_ROUTER_LOCALE") {
            if !locale.trim().is_empty() {
                config.fallback_locale = locale.trim().to_ascii_lowercase();
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_standalone() {
        let config = RouterConfig::default();
        assert!(!config.skill_mode);
        assert_eq!(config.fallback_locale, "en");
        assert_eq!(config.skill_model_key, "skill");
        assert_eq!(config.general_model_key, "general");
    }
}
