//! Terminal step: summary, activation email and finish.

use std::fmt;

use serde::Serialize;

use crate::config::FinishGate;
use crate::error::WizardError;
use crate::wizard::catalog::{
    StepKind, company_size_label, contact_label, humanize_identifier, industry_label,
    support_label,
};
use crate::wizard::record::{OnboardingRecord, RecordPatch, ValidationStatus};

use super::{FieldErrors, LocalValidation, StepView};

/// State of the simulated activation email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum EmailSendStatus {
    Idle,
    Sending,
    Sent,
    /// Retryable.
    Failed(String),
}

/// Read-only summary of everything collected, with display labels applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationSummary {
    pub client_name: String,
    pub tax_id: String,
    pub company_size: Option<String>,
    pub industry: Option<String>,
    pub goals: Vec<String>,
    pub integrations: Vec<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub preferred_channel: Option<String>,
    pub support: Option<String>,
    pub validation: Option<ValidationStatus>,
}

impl ActivationSummary {
    pub fn from_record(record: &OnboardingRecord) -> Self {
        let prefs = record.contact_preferences.as_ref();
        let humanize_all = |ids: &Option<std::collections::BTreeSet<String>>| {
            ids.iter()
                .flatten()
                .map(|id| humanize_identifier(id))
                .collect::<Vec<_>>()
        };

        Self {
            client_name: record.client_name.clone().unwrap_or_default(),
            tax_id: record.tax_id.clone().unwrap_or_default(),
            company_size: record
                .company_size
                .map(|s| company_size_label(s.key()).to_string()),
            industry: record.industry.map(|i| industry_label(i.key()).to_string()),
            goals: humanize_all(&record.main_goals),
            integrations: humanize_all(&record.selected_integrations),
            email: prefs.map(|p| p.email.clone()),
            phone: prefs.and_then(|p| p.phone.clone()),
            preferred_channel: prefs.map(|p| contact_label(p.preferred_channel.key()).to_string()),
            support: prefs.map(|p| support_label(p.support_tier.key()).to_string()),
            validation: record.validation_result.as_ref().map(|v| v.status),
        }
    }
}

impl fmt::Display for ActivationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Informações da Empresa")?;
        writeln!(f, "  Nome: {}", self.client_name)?;
        writeln!(f, "  CNPJ: {}", self.tax_id)?;
        if let Some(size) = &self.company_size {
            writeln!(f, "  Porte: {size}")?;
        }
        if let Some(industry) = &self.industry {
            writeln!(f, "  Setor: {industry}")?;
        }

        writeln!(f, "Objetivos Selecionados")?;
        if self.goals.is_empty() {
            writeln!(f, "  Nenhum objetivo selecionado")?;
        }
        for goal in &self.goals {
            writeln!(f, "  - {goal}")?;
        }

        writeln!(f, "Integrações")?;
        if self.integrations.is_empty() {
            writeln!(f, "  Nenhuma integração selecionada")?;
        }
        for integration in &self.integrations {
            writeln!(f, "  - {integration}")?;
        }

        if let Some(email) = &self.email {
            writeln!(f, "Contato")?;
            writeln!(f, "  Email: {email}")?;
            if let Some(phone) = &self.phone {
                writeln!(f, "  Telefone: {phone}")?;
            }
            if let Some(channel) = &self.preferred_channel {
                writeln!(f, "  Contato Preferido: {channel}")?;
            }
            if let Some(support) = &self.support {
                writeln!(f, "  Suporte: {support}")?;
            }
        }

        let validation = match self.validation {
            Some(ValidationStatus::Success) => "Concluída",
            Some(ValidationStatus::Failed) => "Falhou",
            Some(ValidationStatus::Pending) | None => "Pendente",
        };
        write!(f, "Validação: {validation}")
    }
}

/// Activation email progress and the finish gate it drives.
///
/// Owned by the session rather than the step view, so leaving and re-entering
/// the activation step keeps the send state.
#[derive(Debug, Clone)]
pub struct ActivationSend {
    gate: FinishGate,
    status: EmailSendStatus,
}

impl ActivationSend {
    pub fn new(gate: FinishGate) -> Self {
        Self {
            gate,
            status: EmailSendStatus::Idle,
        }
    }

    pub fn status(&self) -> &EmailSendStatus {
        &self.status
    }

    /// Enter `Sending`. Refused while a send is running or after success.
    pub fn begin_send(&mut self) -> Result<(), WizardError> {
        match self.status {
            EmailSendStatus::Sending => Err(WizardError::SendInProgress),
            EmailSendStatus::Sent => Err(WizardError::AlreadySent),
            EmailSendStatus::Idle | EmailSendStatus::Failed(_) => {
                self.status = EmailSendStatus::Sending;
                Ok(())
            }
        }
    }

    /// Leave `Sending` with the task's outcome. Ignored in any other state.
    pub fn complete_send(&mut self, outcome: Result<(), String>) {
        if self.status != EmailSendStatus::Sending {
            return;
        }
        self.status = match outcome {
            Ok(()) => EmailSendStatus::Sent,
            Err(reason) => EmailSendStatus::Failed(reason),
        };
    }

    pub fn finish_enabled(&self) -> bool {
        match self.gate {
            FinishGate::Always => true,
            FinishGate::AfterEmailSent => self.status == EmailSendStatus::Sent,
        }
    }

    pub fn check_finish(&self) -> Result<(), WizardError> {
        if self.finish_enabled() {
            Ok(())
        } else {
            Err(WizardError::FinishBlocked)
        }
    }
}

/// Read-only terminal view. Send state lives in [`ActivationSend`].
#[derive(Debug, Clone, Default)]
pub struct ActivationStep {
    errors: FieldErrors,
}

impl ActivationStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self, record: &OnboardingRecord) -> ActivationSummary {
        ActivationSummary::from_record(record)
    }
}

impl StepView for ActivationStep {
    fn kind(&self) -> StepKind {
        StepKind::Activation
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
    use std::collections::BTreeSet;

    use super::*;
    use crate::wizard::record::{
        CompanySize, ContactChannel, ContactPreferences, Industry, SupportTier,
    };

    fn full_record() -> OnboardingRecord {
        OnboardingRecord::default().merge(RecordPatch {
            client_name: Some("Acme".to_string()),
            tax_id: Some("11.222.333/0001-81".to_string()),
            company_size: Some(CompanySize::Medium),
            industry: Some(Industry::Saude),
            main_goals: Some(BTreeSet::from(["efficiency".to_string()])),
            selected_integrations: Some(BTreeSet::from(["business_intelligence".to_string()])),
            contact_preferences: Some(ContactPreferences {
                notifications_enabled: true,
                newsletter_enabled: false,
                support_tier: SupportTier::Premium,
                email: "ti@acme.com".to_string(),
                phone: None,
                preferred_channel: ContactChannel::Phone,
            }),
            ..Default::default()
        })
    }

    #[test]
    fn summary_applies_labels() {
        let summary = ActivationSummary::from_record(&full_record());
        assert_eq!(summary.company_size.as_deref(), Some("Média (50-249 funcionários)"));
        assert_eq!(summary.industry.as_deref(), Some("Saúde"));
        assert_eq!(summary.goals, vec!["Efficiency"]);
        assert_eq!(summary.integrations, vec!["Business Intelligence"]);
        assert_eq!(summary.support.as_deref(), Some("Suporte Premium (24/7)"));
        assert_eq!(summary.preferred_channel.as_deref(), Some("Telefone"));
    }

    #[test]
    fn summary_text_mentions_empty_sections() {
        let text = ActivationSummary::from_record(&OnboardingRecord::default()).to_string();
        assert!(text.contains("Nenhum objetivo selecionado"));
        assert!(text.contains("Nenhuma integração selecionada"));
        assert!(!text.contains("Contato"));
        assert!(text.ends_with("Validação: Pendente"));
    }

    #[test]
    fn send_moves_idle_to_sending_to_sent() {
        let mut send = ActivationSend::new(FinishGate::AfterEmailSent);
        assert_eq!(send.status(), &EmailSendStatus::Idle);
        assert!(!send.finish_enabled());

        send.begin_send().unwrap();
        assert_eq!(send.begin_send(), Err(WizardError::SendInProgress));
        assert_eq!(send.check_finish(), Err(WizardError::FinishBlocked));

        send.complete_send(Ok(()));
        assert_eq!(send.status(), &EmailSendStatus::Sent);
        assert!(send.finish_enabled());
        assert_eq!(send.begin_send(), Err(WizardError::AlreadySent));
    }

    #[test]
    fn failed_send_can_be_retried() {
        let mut send = ActivationSend::new(FinishGate::AfterEmailSent);
        send.begin_send().unwrap();
        send.complete_send(Err("smtp indisponível".to_string()));
        assert_eq!(
            send.status(),
            &EmailSendStatus::Failed("smtp indisponível".to_string())
        );
        assert!(!send.finish_enabled());
        assert!(send.begin_send().is_ok());
    }

    #[test]
    fn completion_outside_sending_is_ignored() {
        let mut send = ActivationSend::new(FinishGate::AfterEmailSent);
        send.complete_send(Ok(()));
        assert_eq!(send.status(), &EmailSendStatus::Idle);
    }

    #[test]
    fn ungated_finish_is_always_enabled() {
        let send = ActivationSend::new(FinishGate::Always);
        assert!(send.finish_enabled());
        assert!(send.check_finish().is_ok());
    }
}
