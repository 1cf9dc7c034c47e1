//! Wizard core: step catalog, accumulated record, cursor and the session
//! that ties them to the step views.

pub mod catalog;
pub mod controller;
pub mod format;
pub mod record;
pub mod session;

pub use catalog::{Manual, StepCatalog, StepKind};
pub use controller::{StepStatus, WizardController, WizardCursor};
pub use record::{OnboardingRecord, RecordPatch};
pub use session::{OnboardingSession, PendingValidation, UploadValidation, ValidationStart};
