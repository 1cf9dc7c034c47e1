//! Content upload and the mock file validator.
//!
//! "Continue" only needs content. "Validate" is a separate action: the
//! session runs it as a deferred task and patches the record with the
//! report built here.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use rand::Rng;

use crate::config::UploadMode;
use crate::wizard::catalog::{find_entry, StepKind, PROCESSING_OPTIONS};
use crate::wizard::format::format_timestamp;
use crate::wizard::record::{
    FileReference, OnboardingRecord, RecordPatch, UploadedContent, ValidationResult,
    ValidationStatus,
};

use super::{FieldErrors, FieldInputError, LocalValidation, StepView};

#[derive(Debug, Clone)]
pub struct UploadStep {
    mode: UploadMode,
    pub text: String,
    pub file: Option<FileReference>,
    pub options: BTreeSet<String>,
    errors: FieldErrors,
}

impl UploadStep {
    pub fn new(mode: UploadMode) -> Self {
        Self {
            mode,
            text: String::new(),
            file: None,
            options: BTreeSet::new(),
            errors: FieldErrors::new(),
        }
    }

    pub fn from_record(record: &OnboardingRecord, mode: UploadMode) -> Self {
        let mut step = Self::new(mode);
        match &record.uploaded_content {
            Some(UploadedContent::Text(text)) if mode == UploadMode::PastedText => {
                step.text = text.clone();
            }
            Some(UploadedContent::File(file)) if mode != UploadMode::PastedText => {
                step.file = Some(file.clone());
            }
            _ => {}
        }
        if mode == UploadMode::SingleFileWithOptions {
            step.options = record.selected_processing_options.clone().unwrap_or_default();
        }
        step
    }

    pub fn mode(&self) -> UploadMode {
        self.mode
    }

    /// Attach a picked file. Only valid in the file modes.
    pub fn attach(&mut self, file: FileReference) -> Result<(), FieldInputError> {
        if self.mode == UploadMode::PastedText {
            return Err(FieldInputError::NotInMode {
                field: "file".to_string(),
            });
        }
        self.file = Some(file);
        self.errors.remove("uploadedContent");
        Ok(())
    }

    /// Content as it would be stored, if any was provided.
    pub fn content(&self) -> Option<UploadedContent> {
        match self.mode {
            UploadMode::PastedText if !self.text.trim().is_empty() => {
                Some(UploadedContent::Text(self.text.clone()))
            }
            UploadMode::PastedText => None,
            UploadMode::SingleFile | UploadMode::SingleFileWithOptions => {
                self.file.clone().map(UploadedContent::File)
            }
        }
    }

    /// Deterministic part of a validation run. Fails with the same field
    /// errors as "continue" when there is nothing to validate.
    pub fn report_input(
        &self,
        record: &OnboardingRecord,
    ) -> Result<ValidationReportInput, FieldErrors> {
        let validation = self.validate_local();
        if !validation.valid {
            return Err(validation.field_errors);
        }
        let Some(content) = self.content() else {
            return Err(validation.field_errors);
        };

        let origin = match &content {
            UploadedContent::Text(_) => "Conteúdo colado".to_string(),
            UploadedContent::File(file) => file.name.clone(),
        };
        let options = self
            .options
            .iter()
            .map(|id| {
                find_entry(&PROCESSING_OPTIONS, id)
                    .map(|e| e.label.to_string())
                    .unwrap_or_else(|| id.clone())
            })
            .collect();

        Ok(ValidationReportInput {
            client_name: record.client_name.clone(),
            origin,
            size_bytes: content.size_bytes(),
            line_count: content.line_count(),
            options,
        })
    }
}

impl StepView for UploadStep {
    fn kind(&self) -> StepKind {
        StepKind::Upload
    }

    fn validate_local(&self) -> LocalValidation {
        let mut errors = FieldErrors::new();

        if self.content().is_none() {
            let message = match self.mode {
                UploadMode::PastedText => "Cole o conteúdo do arquivo",
                _ => "Selecione um arquivo",
            };
            errors.insert("uploadedContent", message);
        }

        if self.mode == UploadMode::SingleFileWithOptions && self.options.is_empty() {
            errors.insert(
                "selectedProcessingOptions",
                "Selecione pelo menos uma opção de processamento",
            );
        }

        errors.into()
    }

    fn build_patch(&self) -> RecordPatch {
        let selected_processing_options =
            (self.mode == UploadMode::SingleFileWithOptions).then(|| self.options.clone());
        RecordPatch {
            uploaded_content: self.content(),
            selected_processing_options,
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
            "content" if self.mode == UploadMode::PastedText => {
                self.text = value.to_string();
                self.errors.remove("uploadedContent");
                Ok(())
            }
            "content" => Err(FieldInputError::NotInMode {
                field: field.to_string(),
            }),
            other => Err(FieldInputError::UnknownField {
                step: self.kind(),
                field: other.to_string(),
            }),
        }
    }

    fn toggle(&mut self, id: &str) -> Result<(), FieldInputError> {
        if self.mode != UploadMode::SingleFileWithOptions {
            return Err(FieldInputError::NotInMode {
                field: "selectedProcessingOptions".to_string(),
            });
        }
        if find_entry(&PROCESSING_OPTIONS, id).is_none() {
            return Err(FieldInputError::InvalidOption {
                field: "selectedProcessingOptions".to_string(),
                value: id.to_string(),
            });
        }
        if !self.options.remove(id) {
            self.options.insert(id.to_string());
        }
        if !self.options.is_empty() {
            self.errors.remove("selectedProcessingOptions");
        }
        Ok(())
    }
}

/// Header fields of a validation report. Derived from the uploaded content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReportInput {
    pub client_name: Option<String>,
    /// "Conteúdo colado" or the file name.
    pub origin: String,
    pub size_bytes: u64,
    pub line_count: Option<usize>,
    /// Display labels of the selected processing options.
    pub options: Vec<String>,
}

/// Randomized body of the mock report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationCounts {
    pub valid_records: u32,
    pub warnings: u32,
}

impl ValidationCounts {
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            valid_records: rng.gen_range(100..=1000),
            warnings: rng.gen_range(0..=10),
        }
    }
}

impl ValidationReportInput {
    fn header(&self, now: NaiveDateTime) -> String {
        let mut header = format!(
            "=== RELATÓRIO DE VALIDAÇÃO ===\n\
             Data: {}\n\
             Cliente: {}\n\
             Origem: {}\n\
             Tamanho: {} bytes\n\
             Linhas: {}\n",
            format_timestamp(now),
            self.client_name.as_deref().unwrap_or("-"),
            self.origin,
            self.size_bytes,
            self.line_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| "n/d".to_string()),
        );
        if !self.options.is_empty() {
            header.push_str(&format!("Opções: {}\n", self.options.join(", ")));
        }
        header
    }

    /// Successful report with the given counts.
    pub fn success(&self, now: NaiveDateTime, counts: ValidationCounts) -> ValidationResult {
        let log_dump = format!(
            "{}Status: Processado\n\
             \n\
             Registros válidos: {}\n\
             Avisos: {}\n\
             \n\
             === VALIDAÇÃO CONCLUÍDA ===",
            self.header(now),
            counts.valid_records,
            counts.warnings,
        );
        ValidationResult {
            status: ValidationStatus::Success,
            message: format!(
                "Arquivo validado: {} registros válidos, {} avisos",
                counts.valid_records, counts.warnings
            ),
            log_dump,
        }
    }

    /// Report for a validation run that did not complete.
    pub fn failure(&self, now: NaiveDateTime, reason: &str) -> ValidationResult {
        let log_dump = format!(
            "{}Status: Falha\n\
             \n\
             Motivo: {}\n\
             \n\
             === VALIDAÇÃO INTERROMPIDA ===",
            self.header(now),
            reason,
        );
        ValidationResult {
            status: ValidationStatus::Failed,
            message: format!("Falha na validação: {reason}"),
            log_dump,
        }
    }
}

/// Placeholder stored while the validation task runs.
pub fn pending_result() -> ValidationResult {
    ValidationResult {
        status: ValidationStatus::Pending,
        message: "Validação em andamento".to_string(),
        log_dump: String::new(),
    }
}
