//! Optional integrations. Any selection, including none, is accepted.

use std::collections::BTreeSet;

use crate::wizard::catalog::{find_entry, StepKind, INTEGRATIONS};
use crate::wizard::record::{OnboardingRecord, RecordPatch};

use super::{FieldErrors, FieldInputError, LocalValidation, StepView};

#[derive(Debug, Clone, Default)]
pub struct IntegrationsStep {
    pub selected: BTreeSet<String>,
    errors: FieldErrors,
}

impl IntegrationsStep {
    pub fn from_record(record: &OnboardingRecord) -> Self {
        Self {
            selected: record.selected_integrations.clone().unwrap_or_default(),
            errors: FieldErrors::new(),
        }
    }
}

impl StepView for IntegrationsStep {
    fn kind(&self) -> StepKind {
        StepKind::Integrations
    }

    fn validate_local(&self) -> LocalValidation {
        FieldErrors::new().into()
    }

    fn build_patch(&self) -> RecordPatch {
        RecordPatch {
            selected_integrations: Some(self.selected.clone()),
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
        if find_entry(&INTEGRATIONS, id).is_none() {
            return Err(FieldInputError::InvalidOption {
                field: "selectedIntegrations".to_string(),
                value: id.to_string(),
            });
        }
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_is_valid_and_still_patched() {
        let step = IntegrationsStep::default();
        assert!(step.validate_local().valid);
        assert_eq!(step.build_patch().selected_integrations, Some(BTreeSet::new()));
    }

    #[test]
    fn toggle_tracks_catalog_ids_only() {
        let mut step = IntegrationsStep::default();
        step.toggle("erp").unwrap();
        step.toggle("business_intelligence").unwrap();
        assert!(step.toggle("fax").is_err());
        assert_eq!(step.selected.len(), 2);
    }
}
