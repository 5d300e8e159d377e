//! Error types for the skill router.

/// Top-level error type for the router.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("NLU error: {0}")]
    Nlu(#[from] NluError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Dialog error: {0}")]
    Dialog(#[from] DialogError),
}

/// Configuration-related errors. These are fatal: the turn is aborted and
/// no user-facing message is sent.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No NLU model {key:?} registered for locale {locale:?}")]
    ModelNotRegistered { locale: String, key: String },

    #[error("The active channel adapter does not support token operations")]
    TokenSupportUnavailable,

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// State-store errors.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Storage backend failed: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Intent-classifier errors.
#[derive(Debug, thiserror::Error)]
pub enum NluError {
    #[error("Classifier {name} failed: {reason}")]
    ClassifierFailed { name: String, reason: String },

    #[error("Invalid intent pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Channel-adapter errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to send activity on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Token operation failed for connection {connection}: {reason}")]
    Token { connection: String, reason: String },
}

/// Sub-dialog errors.
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    #[error("No dialog registered under name {0:?}")]
    UnknownDialog(String),

    #[error("Dialog {name} failed: {reason}")]
    Failed { name: String, reason: String },

    #[error("Invalid dialog state: {0}")]
    InvalidState(String),
}

/// Result type alias for the router.
pub type Result<T> = std::result::Result<T, Error>;
