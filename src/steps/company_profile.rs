//! Company size and industry.

use crate::wizard::catalog::StepKind;
use crate::wizard::record::{CompanySize, Industry, OnboardingRecord, RecordPatch};

use super::{FieldErrors, FieldInputError, LocalValidation, StepView};

#[derive(Debug, Clone, Default)]
pub struct CompanyProfileStep {
    pub company_size: Option<CompanySize>,
    pub industry: Option<Industry>,
    errors: FieldErrors,
}

impl CompanyProfileStep {
    pub fn from_record(record: &OnboardingRecord) -> Self {
        Self {
            company_size: record.company_size,
            industry: record.industry,
            errors: FieldErrors::new(),
        }
    }
}

impl StepView for CompanyProfileStep {
    fn kind(&self) -> StepKind {
        StepKind::CompanyProfile
    }

    fn validate_local(&self) -> LocalValidation {
        let mut errors = FieldErrors::new();
        if self.company_size.is_none() {
            errors.insert("companySize", "Selecione o porte da empresa");
        }
        if self.industry.is_none() {
            errors.insert("industry", "Selecione o setor de atuação");
        }
        errors.into()
    }

    fn build_patch(&self) -> RecordPatch {
        RecordPatch {
            company_size: self.company_size,
            industry: self.industry,
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
        let invalid = || FieldInputError::InvalidOption {
            field: field.to_string(),
            value: value.to_string(),
        };

        match field {
            "companySize" => {
                self.company_size = Some(CompanySize::from_key(value).ok_or_else(invalid)?);
                self.errors.remove("companySize");
            }
            "industry" => {
                self.industry = Some(Industry::from_key(value).ok_or_else(invalid)?);
                self.errors.remove("industry");
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_selections_are_required() {
        let mut step = CompanyProfileStep::default();
        let validation = step.validate_local();
        assert_eq!(validation.field_errors.len(), 2);

        step.set_field("companySize", "media").unwrap();
        let validation = step.validate_local();
        assert!(validation.field_errors.get("companySize").is_none());
        assert!(validation.field_errors.get("industry").is_some());
    }

    #[test]
    fn unknown_option_keeps_previous_selection() {
        let mut step = CompanyProfileStep::default();
        step.set_field("industry", "saude").unwrap();

        let err = step.set_field("industry", "mineracao").unwrap_err();
        assert!(matches!(err, FieldInputError::InvalidOption { .. }));
        assert_eq!(step.industry, Some(Industry::Saude));
    }

    #[test]
    fn patch_carries_both_fields() {
        let mut step = CompanyProfileStep::default();
        step.set_field("companySize", "grande").unwrap();
        step.set_field("industry", "varejo").unwrap();
        assert!(step.validate_local().valid);
        assert_eq!(step.build_patch().keys(), vec!["companySize", "industry"]);
    }
}
