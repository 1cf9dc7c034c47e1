//! Manual downloads. Nothing to validate.

use crate::wizard::catalog::{Manual, StepKind};
use crate::wizard::record::RecordPatch;

use super::{FieldErrors, LocalValidation, StepView};

#[derive(Debug, Clone, Default)]
pub struct ManualsStep {
    downloaded: Vec<Manual>,
    errors: FieldErrors,
}

impl ManualsStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_downloaded(&mut self, manual: Manual) {
        if !self.downloaded.contains(&manual) {
            self.downloaded.push(manual);
        }
    }

    pub fn was_downloaded(&self, manual: Manual) -> bool {
        self.downloaded.contains(&manual)
    }
}

impl StepView for ManualsStep {
    fn kind(&self) -> StepKind {
        StepKind::Manuals
    }

    fn validate_local(&self) -> LocalValidation {
        FieldErrors::new().into()
    }

    fn build_patch(&self) -> RecordPatch {
        RecordPatch::default()
    }

    fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    fn set_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }
}
