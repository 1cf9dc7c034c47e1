//! Error types for the onboarding wizard.
//!
//! Field validation failures are not errors: they are returned as
//! [`FieldErrors`](crate::steps::FieldErrors) and shown next to the field.
//! The types here cover misconfiguration and misuse of the session API.

use crate::steps::FieldInputError;
use crate::wizard::catalog::StepKind;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Input error: {0}")]
    Input(#[from] FieldInputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Session operations invoked in a state that cannot honor them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("Action requires the {expected} step, but the wizard is on {actual}")]
    WrongStep { expected: StepKind, actual: StepKind },

    #[error("Activation email is already being sent")]
    SendInProgress,

    #[error("Activation email was already sent")]
    AlreadySent,

    #[error("Finish is disabled until the activation email is sent")]
    FinishBlocked,
}

/// Result type alias for the wizard.
pub type Result<T> = std::result::Result<T, Error>;
