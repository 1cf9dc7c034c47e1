//! OnboardingSession: the controller, the active step view and the
//! collaborators the steps call out to.
//!
//! The active step is rebuilt from the record whenever the cursor moves, so
//! uncommitted form state is dropped on navigation. Step-specific actions
//! check the active step first and fail with `WizardError::WrongStep`.

use std::path::Path;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::WizardConfig;
use crate::effects::{ActivationMailer, TerminalEffects};
use crate::error::{Result, WizardError};
use crate::steps::upload::pending_result;
use crate::steps::{
    ActivationSend, ActivationSummary, ActiveStep, EmailSendStatus, FieldErrors, FieldInputError,
    ResultsView, StepView, SubmitOutcome, ValidationCounts, ValidationReportInput,
};
use crate::task::{TaskHandle, TaskOutcome, spawn_deferred};

use super::catalog::{Manual, StepKind};
use super::controller::{StepStatus, WizardController};
use super::record::{FileReference, OnboardingRecord, RecordPatch, ValidationResult};

/// A validation run in flight.
#[derive(Debug)]
pub struct PendingValidation {
    input: ValidationReportInput,
    started_at: NaiveDateTime,
    handle: TaskHandle<ValidationResult>,
}

impl PendingValidation {
    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Result of asking the upload step to start a validation.
#[derive(Debug)]
pub enum ValidationStart {
    Started(PendingValidation),
    /// Nothing to validate; errors are also stored on the step.
    Rejected(FieldErrors),
}

/// Result of a complete validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadValidation {
    Completed(ValidationResult),
    Rejected(FieldErrors),
}

pub struct OnboardingSession {
    id: Uuid,
    config: WizardConfig,
    controller: WizardController,
    active: ActiveStep,
    rng: StdRng,
    clock: fn() -> NaiveDateTime,
    effects: Arc<dyn TerminalEffects>,
    mailer: Arc<dyn ActivationMailer>,
    activation: ActivationSend,
    finished: bool,
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl OnboardingSession {
    pub fn new(
        config: WizardConfig,
        effects: Arc<dyn TerminalEffects>,
        mailer: Arc<dyn ActivationMailer>,
    ) -> Self {
        let controller = WizardController::new(config.flow.catalog());
        let active = ActiveStep::for_kind(controller.current_kind(), controller.record(), &config);
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let id = Uuid::new_v4();
        let activation = ActivationSend::new(config.finish_gate);

        info!(
            session_id = %id,
            flow = ?config.flow,
            steps = controller.total_steps(),
            "Onboarding session started"
        );

        Self {
            id,
            config,
            controller,
            active,
            rng,
            clock: local_now,
            effects,
            mailer,
            activation,
            finished: false,
        }
    }

    /// Replace the wall clock used for report timestamps.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn controller(&self) -> &WizardController {
        &self.controller
    }

    pub fn record(&self) -> &OnboardingRecord {
        self.controller.record()
    }

    pub fn active_step(&self) -> &ActiveStep {
        &self.active
    }

    pub fn current_kind(&self) -> StepKind {
        self.controller.current_kind()
    }

    pub fn progress_percent(&self) -> u8 {
        self.controller.progress_percent()
    }

    pub fn steps(&self) -> Vec<StepStatus> {
        self.controller.steps()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn rebuild_active(&mut self) {
        self.active = ActiveStep::for_kind(
            self.controller.current_kind(),
            self.controller.record(),
            &self.config,
        );
    }

    fn wrong_step(&self, expected: StepKind) -> WizardError {
        WizardError::WrongStep {
            expected,
            actual: self.active.kind(),
        }
    }

    /// "Continue" on the active step.
    pub fn submit(&mut self) -> SubmitOutcome {
        let kind = self.active.kind();
        let outcome = self.active.view_mut().submit(&mut self.controller);

        match &outcome {
            SubmitOutcome::Advanced { from, to } => {
                info!(session_id = %self.id, step = %kind, from, to, "Step submitted");
                if from != to {
                    self.rebuild_active();
                }
            }
            SubmitOutcome::Rejected(errors) => {
                debug!(
                    session_id = %self.id,
                    step = %kind,
                    fields = ?errors.iter().map(|(f, _)| f).collect::<Vec<_>>(),
                    "Step rejected"
                );
            }
        }
        outcome
    }

    /// "Back". Returns `false` on the first step.
    pub fn back(&mut self) -> bool {
        let moved = self.controller.retreat();
        if moved {
            self.rebuild_active();
        }
        moved
    }

    pub fn set_field(
        &mut self,
        field: &str,
        value: &str,
    ) -> std::result::Result<(), FieldInputError> {
        self.active.view_mut().set_field(field, value)
    }

    pub fn toggle(&mut self, id: &str) -> std::result::Result<(), FieldInputError> {
        self.active.view_mut().toggle(id)
    }

    /// Read a file from disk and attach it to the upload step.
    pub async fn attach_file(&mut self, path: impl AsRef<Path>) -> Result<FileReference> {
        if self.active.kind() != StepKind::Upload {
            return Err(self.wrong_step(StepKind::Upload).into());
        }
        let file = FileReference::load(path).await?;
        if let ActiveStep::Upload(step) = &mut self.active {
            step.attach(file.clone())?;
        }
        info!(session_id = %self.id, name = %file.name, size = file.size_bytes, "File attached");
        Ok(file)
    }

    /// Kick off the mock validator. Patches a pending result right away.
    pub fn start_upload_validation(&mut self) -> Result<ValidationStart> {
        let expected = StepKind::Upload;
        let actual = self.active.kind();
        let ActiveStep::Upload(step) = &mut self.active else {
            return Err(WizardError::WrongStep { expected, actual }.into());
        };

        let input = match step.report_input(self.controller.record()) {
            Ok(input) => input,
            Err(errors) => {
                step.set_errors(errors.clone());
                return Ok(ValidationStart::Rejected(errors));
            }
        };

        let counts = ValidationCounts::draw(&mut self.rng);
        let started_at = (self.clock)();
        self.controller.patch(RecordPatch {
            validation_result: Some(pending_result()),
            ..Default::default()
        });

        let report = input.clone();
        let handle = spawn_deferred(
            "file_validation",
            self.config.validation_delay,
            move || async move { Ok(report.success(started_at, counts)) },
        );

        info!(
            session_id = %self.id,
            task_id = %handle.id(),
            size = input.size_bytes,
            "Upload validation started"
        );
        Ok(ValidationStart::Started(PendingValidation {
            input,
            started_at,
            handle,
        }))
    }

    /// Wait for a validation run and patch its result into the record.
    pub async fn complete_upload_validation(
        &mut self,
        pending: PendingValidation,
    ) -> ValidationResult {
        let PendingValidation {
            input,
            started_at,
            handle,
        } = pending;

        let result = match handle.outcome().await {
            TaskOutcome::Succeeded(result) => result,
            TaskOutcome::Failed(reason) => input.failure(started_at, &reason),
            TaskOutcome::Cancelled => input.failure(started_at, "validação cancelada"),
        };

        info!(session_id = %self.id, status = ?result.status, "Upload validation finished");
        self.controller.patch(RecordPatch {
            validation_result: Some(result.clone()),
            ..Default::default()
        });
        result
    }

    /// Start and await a validation run.
    pub async fn validate_upload(&mut self) -> Result<UploadValidation> {
        match self.start_upload_validation()? {
            ValidationStart::Rejected(errors) => Ok(UploadValidation::Rejected(errors)),
            ValidationStart::Started(pending) => Ok(UploadValidation::Completed(
                self.complete_upload_validation(pending).await,
            )),
        }
    }

    /// Report shown on the results step.
    pub fn results_view(&self) -> Result<ResultsView> {
        match &self.active {
            ActiveStep::Results(step) => Ok(step.view(self.controller.record(), (self.clock)())),
            _ => Err(self.wrong_step(StepKind::Results).into()),
        }
    }

    pub fn download_manual(&mut self, manual: Manual) -> Result<String> {
        let expected = StepKind::Manuals;
        let actual = self.active.kind();
        let ActiveStep::Manuals(step) = &mut self.active else {
            return Err(WizardError::WrongStep { expected, actual }.into());
        };
        step.mark_downloaded(manual);
        Ok(self.effects.download_manual(manual))
    }

    pub fn summary(&self) -> ActivationSummary {
        ActivationSummary::from_record(self.controller.record())
    }

    pub fn download_summary(&self) -> Result<String> {
        if self.active.kind() != StepKind::Activation {
            return Err(self.wrong_step(StepKind::Activation).into());
        }
        Ok(self
            .effects
            .download_summary(self.controller.record(), &self.summary()))
    }

    /// Activation email state. Survives navigation away from the step.
    pub fn email_status(&self) -> &EmailSendStatus {
        self.activation.status()
    }

    pub fn finish_enabled(&self) -> bool {
        self.activation.finish_enabled()
    }

    /// Move the activation email to `Sending` and spawn the mailer.
    pub fn start_activation_email(&mut self) -> Result<TaskHandle<()>> {
        if self.active.kind() != StepKind::Activation {
            return Err(self.wrong_step(StepKind::Activation).into());
        }
        self.activation.begin_send()?;

        let summary = ActivationSummary::from_record(self.controller.record());
        let recipient = summary.email.clone();
        let mailer = Arc::clone(&self.mailer);
        let handle = spawn_deferred(
            "activation_email",
            self.config.activation_delay,
            move || async move { mailer.send_activation(recipient, summary).await },
        );

        info!(session_id = %self.id, task_id = %handle.id(), "Activation email sending");
        Ok(handle)
    }

    /// Wait for the mailer and record the outcome. Applies even if the user
    /// navigated away in the meantime.
    pub async fn complete_activation_email(
        &mut self,
        handle: TaskHandle<()>,
    ) -> Result<EmailSendStatus> {
        let outcome = match handle.outcome().await {
            TaskOutcome::Succeeded(()) => Ok(()),
            TaskOutcome::Failed(reason) => Err(reason),
            TaskOutcome::Cancelled => Err("envio cancelado".to_string()),
        };

        if self.active.kind() != StepKind::Activation {
            warn!(
                session_id = %self.id,
                step = %self.active.kind(),
                "Activation email finished after leaving the step"
            );
        }
        self.activation.complete_send(outcome);

        let status = self.activation.status().clone();
        info!(session_id = %self.id, status = ?status, "Activation email finished");
        Ok(status)
    }

    pub async fn send_activation_email(&mut self) -> Result<EmailSendStatus> {
        let handle = self.start_activation_email()?;
        self.complete_activation_email(handle).await
    }

    /// Terminal action. Gated by the configured finish gate.
    pub fn finish(&mut self) -> Result<String> {
        if self.active.kind() != StepKind::Activation {
            return Err(self.wrong_step(StepKind::Activation).into());
        }
        self.activation.check_finish()?;

        let ack = self.effects.finish(self.controller.record());
        self.finished = true;
        info!(session_id = %self.id, "Onboarding session finished");
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::config::{FinishGate, FlowPreset, UploadMode};
    use crate::effects::{LoggingEffects, SimulatedMailer};
    use crate::error::Error;
    use crate::wizard::record::ValidationStatus;

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .unwrap()
    }

    fn session(config: WizardConfig) -> OnboardingSession {
        OnboardingSession::new(config, Arc::new(LoggingEffects), Arc::new(SimulatedMailer))
            .with_clock(fixed_clock)
    }

    fn classic() -> OnboardingSession {
        session(WizardConfig {
            rng_seed: Some(1),
            validation_delay: Duration::from_millis(50),
            activation_delay: Duration::from_millis(50),
            ..Default::default()
        })
    }

    fn identify(session: &mut OnboardingSession) {
        session.set_field("clientName", "Acme").unwrap();
        session.set_field("taxId", "11222333000181").unwrap();
        assert!(matches!(session.submit(), SubmitOutcome::Advanced { .. }));
    }

    #[test]
    fn navigation_rebuilds_step_from_record() {
        let mut session = classic();
        session.set_field("clientName", "Acme").unwrap();
        session.set_field("taxId", "11222333000181").unwrap();
        session.submit();
        assert_eq!(session.current_kind(), StepKind::Manuals);

        assert!(session.back());
        let ActiveStep::Identification(step) = session.active_step() else {
            panic!("expected identification step");
        };
        assert_eq!(step.client_name, "Acme");
        assert_eq!(step.tax_id, "11.222.333/0001-81");
    }

    #[test]
    fn uncommitted_edits_are_dropped_on_back() {
        let mut session = classic();
        identify(&mut session);
        session.submit();
        assert_eq!(session.current_kind(), StepKind::Upload);
        session.set_field("content", "never submitted").unwrap();

        session.back();
        session.submit();
        let ActiveStep::Upload(step) = session.active_step() else {
            panic!("expected upload step");
        };
        assert!(step.text.is_empty());
        assert!(session.record().uploaded_content.is_none());
    }

    #[test]
    fn step_actions_on_wrong_step_fail() {
        let mut session = classic();
        let err = session.download_manual(Manual::FileStandard).unwrap_err();
        assert!(matches!(
            err,
            Error::Wizard(WizardError::WrongStep {
                expected: StepKind::Manuals,
                actual: StepKind::Identification
            })
        ));
        assert!(session.finish().is_err());
        assert!(session.start_upload_validation().is_err());
    }

    #[test]
    fn manual_download_acknowledges() {
        let mut session = classic();
        identify(&mut session);
        let ack = session.download_manual(Manual::ClientInstallation).unwrap();
        assert_eq!(ack, "Download do Manual de instalação do client iniciado!");
    }

    #[tokio::test(start_paused = true)]
    async fn validation_without_content_is_rejected() {
        let mut session = classic();
        identify(&mut session);
        session.submit();
        assert_eq!(session.current_kind(), StepKind::Upload);

        let outcome = session.validate_upload().await.unwrap();
        assert!(matches!(outcome, UploadValidation::Rejected(_)));
        assert!(session.record().validation_result.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn validation_patches_pending_then_success() {
        let mut session = classic();
        identify(&mut session);
        session.submit();
        session.set_field("content", "h1;h2\nv1;v2\n").unwrap();

        let ValidationStart::Started(pending) = session.start_upload_validation().unwrap() else {
            panic!("expected validation to start");
        };
        assert_eq!(
            session.record().validation_result.as_ref().map(|r| r.status),
            Some(ValidationStatus::Pending)
        );
        // validation does not advance
        assert_eq!(session.current_kind(), StepKind::Upload);

        let result = session.complete_upload_validation(pending).await;
        assert_eq!(result.status, ValidationStatus::Success);
        assert!(result.log_dump.contains("Data: 01/06/2024 08:00:00\nCliente: Acme\n"));
        assert_eq!(session.record().validation_result, Some(result));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_validation_is_recorded_as_failure() {
        let mut session = classic();
        identify(&mut session);
        session.submit();
        session.set_field("content", "x").unwrap();

        let ValidationStart::Started(pending) = session.start_upload_validation().unwrap() else {
            panic!("expected validation to start");
        };
        pending.cancel();
        let result = session.complete_upload_validation(pending).await;
        assert_eq!(result.status, ValidationStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn same_seed_gives_same_report() {
        async fn run() -> ValidationResult {
            let mut session = classic();
            identify(&mut session);
            session.submit();
            session.set_field("content", "abc").unwrap();
            match session.validate_upload().await.unwrap() {
                UploadValidation::Completed(result) => result,
                UploadValidation::Rejected(_) => panic!("expected completion"),
            }
        }
        assert_eq!(run().await, run().await);
    }

    #[test]
    fn results_view_falls_back_to_placeholder() {
        let mut session = classic();
        identify(&mut session);
        session.submit();
        session.set_field("content", "abc").unwrap();
        session.submit();
        assert_eq!(session.current_kind(), StepKind::Results);

        let view = session.results_view().unwrap();
        assert_eq!(view.heading, "Validação Pendente");
        assert!(view.log_dump.contains("Data: 01/06/2024 08:00:00"));
    }

    async fn at_activation(config: WizardConfig) -> OnboardingSession {
        let mut session = session(config);
        identify(&mut session);
        session.submit();
        session.set_field("content", "abc").unwrap();
        session.submit();
        session.submit();
        assert_eq!(session.current_kind(), StepKind::Activation);
        session
    }

    fn gated() -> WizardConfig {
        WizardConfig {
            finish_gate: FinishGate::AfterEmailSent,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn finish_waits_for_activation_email() {
        let mut session = at_activation(gated()).await;
        assert!(matches!(
            session.finish(),
            Err(Error::Wizard(WizardError::FinishBlocked))
        ));

        let handle = session.start_activation_email().unwrap();
        assert_eq!(session.email_status(), &EmailSendStatus::Sending);
        assert!(matches!(
            session.start_activation_email(),
            Err(Error::Wizard(WizardError::SendInProgress))
        ));

        let status = session.complete_activation_email(handle).await.unwrap();
        assert_eq!(status, EmailSendStatus::Sent);

        let ack = session.finish().unwrap();
        assert!(ack.starts_with("Onboarding concluído com sucesso!"));
        assert!(session.is_finished());
    }

    struct CountingMailer(AtomicUsize);

    #[async_trait]
    impl ActivationMailer for CountingMailer {
        async fn send_activation(
            &self,
            _recipient: Option<String>,
            _summary: ActivationSummary,
        ) -> std::result::Result<(), String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn send_state_survives_leaving_activation() {
        let mailer = Arc::new(CountingMailer(AtomicUsize::new(0)));
        let mut session = OnboardingSession::new(
            WizardConfig {
                activation_delay: Duration::from_millis(50),
                ..gated()
            },
            Arc::new(LoggingEffects),
            mailer.clone(),
        );
        identify(&mut session);
        session.submit();
        session.set_field("content", "abc").unwrap();
        session.submit();
        session.submit();
        assert_eq!(session.current_kind(), StepKind::Activation);

        let handle = session.start_activation_email().unwrap();
        assert!(session.back());
        assert!(matches!(session.submit(), SubmitOutcome::Advanced { .. }));
        assert_eq!(session.email_status(), &EmailSendStatus::Sending);
        assert!(matches!(
            session.start_activation_email(),
            Err(Error::Wizard(WizardError::SendInProgress))
        ));

        // completion lands while the user is away from the step
        session.back();
        let status = session.complete_activation_email(handle).await.unwrap();
        assert_eq!(status, EmailSendStatus::Sent);
        assert_eq!(session.current_kind(), StepKind::Results);

        session.submit();
        assert_eq!(session.email_status(), &EmailSendStatus::Sent);
        assert!(matches!(
            session.start_activation_email(),
            Err(Error::Wizard(WizardError::AlreadySent))
        ));
        assert!(session.finish().is_ok());
        assert_eq!(mailer.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ungated_finish_needs_no_email() {
        let mut session = at_activation(WizardConfig {
            finish_gate: FinishGate::Always,
            ..Default::default()
        })
        .await;
        assert!(session.finish().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn summary_download_only_on_activation() {
        let mut session = at_activation(WizardConfig::default()).await;
        assert_eq!(session.download_summary().unwrap(), "Resumo baixado com sucesso!");
        session.back();
        assert!(session.download_summary().is_err());
    }

    #[tokio::test]
    async fn attach_file_requires_file_mode() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"a\nb\n").unwrap();

        let mut session = session(WizardConfig {
            flow: FlowPreset::Classic,
            upload_mode: UploadMode::SingleFile,
            ..Default::default()
        });
        identify(&mut session);
        assert!(session.attach_file(file.path()).await.is_err());
        session.submit();

        let reference = session.attach_file(file.path()).await.unwrap();
        assert_eq!(reference.line_count, Some(2));
        assert!(matches!(session.submit(), SubmitOutcome::Advanced { .. }));
        assert!(matches!(
            session.record().uploaded_content,
            Some(crate::wizard::record::UploadedContent::File(_))
        ));
    }
}
