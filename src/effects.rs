//! Side effects the wizard triggers but does not implement.
//!
//! Terminal effects are fire and forget: the wizard only shows the returned
//! acknowledgment. The mailer is the body of the activation email task.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::steps::ActivationSummary;
use crate::wizard::catalog::Manual;
use crate::wizard::record::OnboardingRecord;

/// Download and finish stubs.
pub trait TerminalEffects: Send + Sync {
    fn download_manual(&self, manual: Manual) -> String;

    fn download_summary(&self, record: &OnboardingRecord, summary: &ActivationSummary) -> String;

    fn finish(&self, record: &OnboardingRecord) -> String;
}

/// Logs every effect and returns the product's acknowledgment texts.
#[derive(Debug, Clone, Default)]
pub struct LoggingEffects;

impl TerminalEffects for LoggingEffects {
    fn download_manual(&self, manual: Manual) -> String {
        info!(manual = manual.title(), "Manual download requested");
        format!("Download do {} iniciado!", manual.title())
    }

    fn download_summary(&self, record: &OnboardingRecord, summary: &ActivationSummary) -> String {
        match serde_json::to_string(record) {
            Ok(json) => info!(record = %json, fields = record.populated_fields().len(), "Summary download requested"),
            Err(e) => warn!(error = %e, "Failed to serialize onboarding record"),
        }
        info!(client = %summary.client_name, "Summary ready");
        "Resumo baixado com sucesso!".to_string()
    }

    fn finish(&self, record: &OnboardingRecord) -> String {
        info!(
            client = record.client_name.as_deref().unwrap_or("-"),
            fields = ?record.populated_fields(),
            "Onboarding finished"
        );
        "Onboarding concluído com sucesso! Redirecionando para o dashboard...".to_string()
    }
}

/// Sends the activation email. Runs inside a deferred task.
#[async_trait]
pub trait ActivationMailer: Send + Sync {
    async fn send_activation(
        &self,
        recipient: Option<String>,
        summary: ActivationSummary,
    ) -> Result<(), String>;
}

/// Always succeeds. Real dispatch is out of scope.
#[derive(Debug, Clone, Default)]
pub struct SimulatedMailer;

#[async_trait]
impl ActivationMailer for SimulatedMailer {
    async fn send_activation(
        &self,
        recipient: Option<String>,
        summary: ActivationSummary,
    ) -> Result<(), String> {
        info!(
            recipient = recipient.as_deref().unwrap_or("-"),
            client = %summary.client_name,
            "Activation email sent (simulated)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_acknowledgments_match_product_text() {
        let effects = LoggingEffects;
        assert_eq!(
            effects.download_manual(Manual::ClientInstallation),
            "Download do Manual de instalação do client iniciado!"
        );
        assert_eq!(
            effects.download_manual(Manual::FileStandard),
            "Download do Manual do padrão de arquivos iniciado!"
        );
    }

    #[test]
    fn summary_and_finish_acknowledge() {
        let effects = LoggingEffects;
        let record = OnboardingRecord::default();
        let summary = ActivationSummary::from_record(&record);
        assert_eq!(
            effects.download_summary(&record, &summary),
            "Resumo baixado com sucesso!"
        );
        assert!(effects.finish(&record).starts_with("Onboarding concluído com sucesso!"));
    }

    #[tokio::test]
    async fn simulated_mailer_never_fails() {
        let summary = ActivationSummary::from_record(&OnboardingRecord::default());
        assert!(
            SimulatedMailer
                .send_activation(Some("a@b.com".to_string()), summary)
                .await
                .is_ok()
        );
    }
}
