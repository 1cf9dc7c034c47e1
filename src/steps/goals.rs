//! Business goals. At least one is required.

use std::collections::BTreeSet;

use crate::wizard::catalog::{find_entry, StepKind, GOALS};
use crate::wizard::record::{OnboardingRecord, RecordPatch};

use super::{FieldErrors, FieldInputError, LocalValidation, StepView};

#[derive(Debug, Clone, Default)]
pub struct GoalsStep {
    pub selected: BTreeSet<String>,
    errors: FieldErrors,
}

impl GoalsStep {
    pub fn from_record(record: &OnboardingRecord) -> Self {
        Self {
            selected: record.main_goals.clone().unwrap_or_default(),
            errors: FieldErrors::new(),
        }
    }

    /// Counter line shown under the grid.
    pub fn selection_summary(&self) -> String {
        format!("{} objetivo(s) selecionado(s)", self.selected.len())
    }
}

impl StepView for GoalsStep {
    fn kind(&self) -> StepKind {
        StepKind::Goals
    }

    fn validate_local(&self) -> LocalValidation {
        let mut errors = FieldErrors::new();
        if self.selected.is_empty() {
            errors.insert("mainGoals", "Selecione pelo menos um objetivo");
        }
        errors.into()
    }

    fn build_patch(&self) -> RecordPatch {
        RecordPatch {
            main_goals: Some(self.selected.clone()),
            ..Default::default()
        }
    }

    fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    fn set_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }

    fn toggle(&mut self, id: &str) -> Result<(), FieldInputError> {
        if find_entry(&GOALS, id).is_none() {
            return Err(FieldInputError::InvalidOption {
                field: "mainGoals".to_string(),
                value: id.to_string(),
            });
        }

        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
        if !self.selected.is_empty() {
            self.errors.remove("mainGoals");
        }
        Ok(())
    }
}
