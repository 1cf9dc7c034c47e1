//! Read-only view of the validation report.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::wizard::catalog::StepKind;
use crate::wizard::format::format_timestamp;
use crate::wizard::record::{OnboardingRecord, RecordPatch, ValidationStatus};

use super::{FieldErrors, LocalValidation, StepView};

/// What the results screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    pub status: ValidationStatus,
    pub heading: &'static str,
    pub detail: String,
    pub log_dump: String,
}

#[derive(Debug, Clone, Default)]
pub struct ResultsStep {
    errors: FieldErrors,
}

impl ResultsStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the recorded result, or a placeholder report stamped with `now`
    /// when no validation has produced logs yet.
    pub fn view(&self, record: &OnboardingRecord, now: NaiveDateTime) -> ResultsView {
        match &record.validation_result {
            Some(result) if !result.log_dump.is_empty() => {
                let heading = match result.status {
                    ValidationStatus::Success => "Validação Concluída",
                    ValidationStatus::Pending => "Validação Pendente",
                    ValidationStatus::Failed => "Validação Falhou",
                };
                ResultsView {
                    status: result.status,
                    heading,
                    detail: result.message.clone(),
                    log_dump: result.log_dump.clone(),
                }
            }
            _ => ResultsView {
                status: ValidationStatus::Pending,
                heading: "Validação Pendente",
                detail: "Nenhuma validação foi executada ainda".to_string(),
                log_dump: pending_report(now),
            },
        }
    }
}

fn pending_report(now: NaiveDateTime) -> String {
    format!(
        "=== RELATÓRIO DE VALIDAÇÃO ===\n\
         Data: {}\n\
         Status: Aguardando validação\n\
         \n\
         Para ver os logs de validação:\n\
         1. Volte para a etapa anterior\n\
         2. Cole o conteúdo dos arquivos\n\
         3. Clique em \"Validador de arquivos\"\n\
         \n\
         === AGUARDANDO PROCESSAMENTO ===",
        format_timestamp(now)
    )
}

impl StepView for ResultsStep {
    fn kind(&self) -> StepKind {
        StepKind::Results
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

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::wizard::record::ValidationResult;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    #[test]
    fn empty_record_shows_pending_placeholder() {
        let view = ResultsStep::new().view(&OnboardingRecord::default(), noon());
        assert_eq!(view.status, ValidationStatus::Pending);
        assert_eq!(view.heading, "Validação Pendente");
        assert!(view.log_dump.starts_with("=== RELATÓRIO DE VALIDAÇÃO ===\nData: 15/01/2024 12:00:00\n"));
        assert!(view.log_dump.contains("3. Clique em \"Validador de arquivos\"\n"));
        assert!(view.log_dump.ends_with("=== AGUARDANDO PROCESSAMENTO ==="));
    }

    #[test]
    fn recorded_success_is_shown_verbatim() {
        let record = OnboardingRecord::default().merge(RecordPatch {
            validation_result: Some(ValidationResult {
                status: ValidationStatus::Success,
                message: "Arquivo validado".to_string(),
                log_dump: "ok".to_string(),
            }),
            ..Default::default()
        });
        let view = ResultsStep::new().view(&record, noon());
        assert_eq!(view.heading, "Validação Concluída");
        assert_eq!(view.log_dump, "ok");
    }

    #[test]
    fn continuing_never_fails() {
        let step = ResultsStep::new();
        assert!(step.validate_local().valid);
        assert!(step.build_patch().is_empty());
    }
}
