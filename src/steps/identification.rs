//! Client name and CNPJ.

use crate::wizard::catalog::StepKind;
use crate::wizard::format::{format_tax_id, is_valid_tax_id, strip_digits};
use crate::wizard::record::{OnboardingRecord, RecordPatch};

use super::{FieldErrors, FieldInputError, LocalValidation, StepView};

#[derive(Debug, Clone, Default)]
pub struct IdentificationStep {
    pub client_name: String,
    /// Masked as typed.
    pub tax_id: String,
    errors: FieldErrors,
}

impl IdentificationStep {
    pub fn from_record(record: &OnboardingRecord) -> Self {
        Self {
            client_name: record.client_name.clone().unwrap_or_default(),
            tax_id: record.tax_id.clone().unwrap_or_default(),
            errors: FieldErrors::new(),
        }
    }
}

impl StepView for IdentificationStep {
    fn kind(&self) -> StepKind {
        StepKind::Identification
    }

    fn validate_local(&self) -> LocalValidation {
        let mut errors = FieldErrors::new();

        if self.client_name.trim().is_empty() {
            errors.insert("clientName", "Nome do cliente é obrigatório");
        }

        if strip_digits(&self.tax_id).is_empty() {
            errors.insert("taxId", "CNPJ é obrigatório");
        } else if !is_valid_tax_id(&self.tax_id) {
            errors.insert("taxId", "CNPJ deve conter 14 dígitos válidos");
        }

        errors.into()
    }

    fn build_patch(&self) -> RecordPatch {
        RecordPatch {
            client_name: Some(self.client_name.trim().to_string()),
            tax_id: Some(format_tax_id(&self.tax_id)),
            ..Default::default()
        }
    }

    fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    fn set_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), FieldInputError> {
        match field {
            "clientName" => {
                self.client_name = value.to_string();
                self.errors.remove("clientName");
            }
            "taxId" => {
                self.tax_id = format_tax_id(value);
                self.errors.remove("taxId");
            }
            other => {
                return Err(FieldInputError::UnknownField {
                    step: self.kind(),
                    field: other.to_string(),
                });
            }
        }
        Ok(())
    }
}
