//! Step views, one per wizard screen.
//!
//! A step holds transient form state seeded from the record plus a map of
//! field errors. It never talks to other steps: everything it learns comes
//! from the record, and everything it contributes goes back as a patch.

pub mod activation;
pub mod company_profile;
pub mod goals;
pub mod identification;
pub mod integrations;
pub mod manuals;
pub mod preferences;
pub mod results;
pub mod upload;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::WizardConfig;
use crate::wizard::catalog::StepKind;
use crate::wizard::controller::WizardController;
use crate::wizard::record::{OnboardingRecord, RecordPatch};

pub use activation::{ActivationSend, ActivationStep, ActivationSummary, EmailSendStatus};
pub use company_profile::CompanyProfileStep;
pub use goals::GoalsStep;
pub use identification::IdentificationStep;
pub use integrations::IntegrationsStep;
pub use manuals::ManualsStep;
pub use preferences::PreferencesStep;
pub use results::{ResultsStep, ResultsView};
pub use upload::{UploadStep, ValidationCounts, ValidationReportInput};

/// Field name → human-readable message, shown inline beside the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn remove(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Result of a step's synchronous local check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalValidation {
    pub valid: bool,
    pub field_errors: FieldErrors,
}

impl From<FieldErrors> for LocalValidation {
    fn from(field_errors: FieldErrors) -> Self {
        Self {
            valid: field_errors.is_empty(),
            field_errors,
        }
    }
}

/// Input the step could not accept (returned, not raised).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldInputError {
    #[error("Step {step} has no field named {field}")]
    UnknownField { step: StepKind, field: String },

    #[error("{value:?} is not a valid option for {field}")]
    InvalidOption { field: String, value: String },

    #[error("{field} is not used in the current upload mode")]
    NotInMode { field: String },
}

/// What happened when the user pressed continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Patch applied and the cursor moved from `from` to `to`
    /// (equal when already on the last step).
    Advanced { from: usize, to: usize },
    /// Local validation failed; record and cursor are untouched.
    Rejected(FieldErrors),
}

/// Shared contract of every step.
pub trait StepView {
    fn kind(&self) -> StepKind;

    /// Pure check over local state. Never touches the record.
    fn validate_local(&self) -> LocalValidation;

    /// Patch built from local state; only meaningful after a valid check.
    fn build_patch(&self) -> RecordPatch;

    fn errors(&self) -> &FieldErrors;

    fn set_errors(&mut self, errors: FieldErrors);

    /// Update a form field from raw text input.
    fn set_field(&mut self, field: &str, _value: &str) -> Result<(), FieldInputError> {
        Err(FieldInputError::UnknownField {
            step: self.kind(),
            field: field.to_string(),
        })
    }

    /// Flip a multi-select entry on or off.
    fn toggle(&mut self, id: &str) -> Result<(), FieldInputError> {
        Err(FieldInputError::UnknownField {
            step: self.kind(),
            field: id.to_string(),
        })
    }

    /// Validate, then either store the errors or patch the record and move
    /// on. Both calls happen or neither does.
    fn submit(&mut self, wizard: &mut WizardController) -> SubmitOutcome {
        let validation = self.validate_local();
        if !validation.valid {
            self.set_errors(validation.field_errors.clone());
            return SubmitOutcome::Rejected(validation.field_errors);
        }

        self.set_errors(FieldErrors::new());
        let from = wizard.current_step();
        wizard.commit(self.build_patch());
        SubmitOutcome::Advanced {
            from,
            to: wizard.current_step(),
        }
    }
}

/// The step currently on screen.
#[derive(Debug, Clone)]
pub enum ActiveStep {
    Identification(IdentificationStep),
    CompanyProfile(CompanyProfileStep),
    Manuals(ManualsStep),
    Upload(UploadStep),
    Results(ResultsStep),
    Goals(GoalsStep),
    Integrations(IntegrationsStep),
    Preferences(PreferencesStep),
    Activation(ActivationStep),
}

impl ActiveStep {
    /// Build the view for `kind`, seeding local state from the record.
    pub fn for_kind(kind: StepKind, record: &OnboardingRecord, config: &WizardConfig) -> Self {
        match kind {
            StepKind::Identification => Self::Identification(IdentificationStep::from_record(record)),
            StepKind::CompanyProfile => Self::CompanyProfile(CompanyProfileStep::from_record(record)),
            StepKind::Manuals => Self::Manuals(ManualsStep::new()),
            StepKind::Upload => Self::Upload(UploadStep::from_record(record, config.upload_mode)),
            StepKind::Results => Self::Results(ResultsStep::new()),
            StepKind::Goals => Self::Goals(GoalsStep::from_record(record)),
            StepKind::Integrations => Self::Integrations(IntegrationsStep::from_record(record)),
            StepKind::Preferences => Self::Preferences(PreferencesStep::from_record(record)),
            StepKind::Activation => Self::Activation(ActivationStep::new()),
        }
    }

    pub fn view(&self) -> &dyn StepView {
        match self {
            Self::Identification(step) => step,
            Self::CompanyProfile(step) => step,
            Self::Manuals(step) => step,
            Self::Upload(step) => step,
            Self::Results(step) => step,
            Self::Goals(step) => step,
            Self::Integrations(step) => step,
            Self::Preferences(step) => step,
            Self::Activation(step) => step,
        }
    }

    pub fn view_mut(&mut self) -> &mut dyn StepView {
        match self {
            Self::Identification(step) => step,
            Self::CompanyProfile(step) => step,
            Self::Manuals(step) => step,
            Self::Upload(step) => step,
            Self::Results(step) => step,
            Self::Goals(step) => step,
            Self::Integrations(step) => step,
            Self::Preferences(step) => step,
            Self::Activation(step) => step,
        }
    }

    pub fn kind(&self) -> StepKind {
        self.view().kind()
    }
}
