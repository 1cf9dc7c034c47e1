//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;
use crate::wizard::catalog::StepCatalog;

/// Which preset step order the wizard runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPreset {
    /// Identification, manuals, upload, results, activation.
    Classic,
    /// Classic plus company profile, goals, integrations and preferences.
    Extended,
}

impl FlowPreset {
    pub fn catalog(&self) -> StepCatalog {
        match self {
            Self::Classic => StepCatalog::classic(),
            Self::Extended => StepCatalog::extended(),
        }
    }

    /// Classic has no contact step, so nothing to send the activation email
    /// to; its finish is ungated.
    pub fn default_finish_gate(&self) -> FinishGate {
        match self {
            Self::Classic => FinishGate::Always,
            Self::Extended => FinishGate::AfterEmailSent,
        }
    }
}

/// How the upload step collects the content to validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    PastedText,
    SingleFile,
    /// Single file plus at least one processing option.
    SingleFileWithOptions,
}

/// When the activation step enables its finish action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishGate {
    AfterEmailSent,
    Always,
}

/// Wizard configuration, fixed for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    pub flow: FlowPreset,
    pub upload_mode: UploadMode,
    pub finish_gate: FinishGate,
    /// Artificial latency of the mock file validation.
    pub validation_delay: Duration,
    /// Artificial latency of the mock activation email.
    pub activation_delay: Duration,
    /// Seed for the mock validation counters; random when unset.
    pub rng_seed: Option<u64>,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self::for_flow(FlowPreset::Classic)
    }
}

impl WizardConfig {
    /// Defaults for `flow`, with the finish gate that preset expects.
    pub fn for_flow(flow: FlowPreset) -> Self {
        Self {
            flow,
            upload_mode: UploadMode::PastedText,
            finish_gate: flow.default_finish_gate(),
            validation_delay: Duration::from_millis(2000),
            activation_delay: Duration::from_millis(2000),
            rng_seed: None,
        }
    }

    /// Read configuration from `ONBOARDING_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Missing keys keep
    /// their defaults; present but malformed keys are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let flow = match get("ONBOARDING_FLOW").as_deref() {
            None => defaults.flow,
            Some("classic") => FlowPreset::Classic,
            Some("extended") => FlowPreset::Extended,
            Some(other) => return Err(invalid("ONBOARDING_FLOW", other, "classic|extended")),
        };

        let upload_mode = match get("ONBOARDING_UPLOAD_MODE").as_deref() {
            None => defaults.upload_mode,
            Some("pasted_text") => UploadMode::PastedText,
            Some("single_file") => UploadMode::SingleFile,
            Some("single_file_with_options") => UploadMode::SingleFileWithOptions,
            Some(other) => {
                return Err(invalid(
                    "ONBOARDING_UPLOAD_MODE",
                    other,
                    "pasted_text|single_file|single_file_with_options",
                ));
            }
        };

        let finish_gate = match get("ONBOARDING_FINISH_REQUIRES_EMAIL") {
            None => flow.default_finish_gate(),
            Some(raw) => {
                let requires: bool = raw
                    .parse()
                    .map_err(|_| invalid("ONBOARDING_FINISH_REQUIRES_EMAIL", &raw, "true|false"))?;
                if requires {
                    FinishGate::AfterEmailSent
                } else {
                    FinishGate::Always
                }
            }
        };

        let validation_delay = match get("ONBOARDING_VALIDATION_DELAY_MS") {
            None => defaults.validation_delay,
            Some(raw) => Duration::from_millis(
                raw.parse()
                    .map_err(|_| invalid("ONBOARDING_VALIDATION_DELAY_MS", &raw, "milliseconds"))?,
            ),
        };

        let activation_delay = match get("ONBOARDING_ACTIVATION_DELAY_MS") {
            None => defaults.activation_delay,
            Some(raw) => Duration::from_millis(
                raw.parse()
                    .map_err(|_| invalid("ONBOARDING_ACTIVATION_DELAY_MS", &raw, "milliseconds"))?,
            ),
        };

        let rng_seed = match get("ONBOARDING_RNG_SEED") {
            None => None,
            Some(raw) => Some(
                raw.parse()
                    .map_err(|_| invalid("ONBOARDING_RNG_SEED", &raw, "unsigned integer"))?,
            ),
        };

        Ok(Self {
            flow,
            upload_mode,
            finish_gate,
            validation_delay,
            activation_delay,
            rng_seed,
        })
    }
}

fn invalid(key: &str, value: &str, expected: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("got {value:?}, expected {expected}"),
    }
}
