//! Wizard controller: step cursor plus the accumulated record.
//!
//! The cursor moves one step at a time and is clamped to `[1, total]`.
//! Completion flags are derived from the cursor, never stored.

use serde::Serialize;
use tracing::debug;

use super::catalog::{StepCatalog, StepKind};
use super::record::{OnboardingRecord, RecordPatch};

/// Position within the step catalog (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardCursor {
    pub current_step: usize,
    pub total_steps: usize,
}

impl WizardCursor {
    pub fn new(total_steps: usize) -> Self {
        Self {
            current_step: 1,
            total_steps: total_steps.max(1),
        }
    }

    /// Move forward one step. Returns `false` when already on the last step.
    pub fn advance(&mut self) -> bool {
        if self.current_step < self.total_steps {
            self.current_step += 1;
            true
        } else {
            false
        }
    }

    /// Move back one step. Returns `false` when already on the first step.
    pub fn retreat(&mut self) -> bool {
        if self.current_step > 1 {
            self.current_step -= 1;
            true
        } else {
            false
        }
    }

    pub fn is_completed(&self, index: usize) -> bool {
        self.current_step > index
    }
}

/// Entry of the progress indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStatus {
    pub index: usize,
    pub kind: StepKind,
    pub label: &'static str,
    pub completed: bool,
    pub current: bool,
}

/// Owns the cursor and the record. Performs no validation: steps gate
/// their own calls.
#[derive(Debug, Clone)]
pub struct WizardController {
    catalog: StepCatalog,
    cursor: WizardCursor,
    record: OnboardingRecord,
}

impl WizardController {
    pub fn new(catalog: StepCatalog) -> Self {
        let cursor = WizardCursor::new(catalog.len());
        Self {
            catalog,
            cursor,
            record: OnboardingRecord::default(),
        }
    }

    pub fn cursor(&self) -> WizardCursor {
        self.cursor
    }

    pub fn current_step(&self) -> usize {
        self.cursor.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.cursor.total_steps
    }

    pub fn current_kind(&self) -> StepKind {
        // the cursor is clamped to the catalog, which is never empty
        self.catalog
            .get(self.cursor.current_step)
            .unwrap_or(StepKind::Identification)
    }

    pub fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    pub fn record(&self) -> &OnboardingRecord {
        &self.record
    }

    /// Next step, or no-op on the last one.
    pub fn advance(&mut self) -> bool {
        let from = self.cursor.current_step;
        let moved = self.cursor.advance();
        debug!(from, to = self.cursor.current_step, moved, "wizard advance");
        moved
    }

    /// Previous step, or no-op on the first one.
    pub fn retreat(&mut self) -> bool {
        let from = self.cursor.current_step;
        let moved = self.cursor.retreat();
        debug!(from, to = self.cursor.current_step, moved, "wizard retreat");
        moved
    }

    /// Shallow-merge `patch` into the record. Independent of navigation.
    pub fn patch(&mut self, patch: RecordPatch) {
        debug!(keys = ?patch.keys(), "wizard patch");
        self.record.apply(patch);
    }

    /// Patch then advance, as one call.
    pub fn commit(&mut self, patch: RecordPatch) -> bool {
        self.patch(patch);
        self.advance()
    }

    /// `round(current / total * 100)`, halves rounded up.
    pub fn progress_percent(&self) -> u8 {
        let current = self.cursor.current_step;
        let total = self.cursor.total_steps;
        ((200 * current + total) / (2 * total)) as u8
    }

    /// Display label of the step at a 1-based index.
    pub fn step_label(&self, index: usize) -> Option<&'static str> {
        self.catalog.get(index).map(|kind| kind.label())
    }

    pub fn is_completed(&self, index: usize) -> bool {
        self.cursor.is_completed(index)
    }

    /// Progress indicator entries for every step.
    pub fn steps(&self) -> Vec<StepStatus> {
        self.catalog
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                let index = i + 1;
                StepStatus {
                    index,
                    kind,
                    label: kind.label(),
                    completed: self.cursor.is_completed(index),
                    current: self.cursor.current_step == index,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> WizardController {
        WizardController::new(StepCatalog::classic())
    }

    #[test]
    fn starts_on_first_step_with_empty_record() {
        let wizard = controller();
        assert_eq!(wizard.current_step(), 1);
        assert_eq!(wizard.total_steps(), 5);
        assert_eq!(wizard.current_kind(), StepKind::Identification);
        assert!(wizard.record().populated_fields().is_empty());
    }

    #[test]
    fn retreat_undoes_advance_from_every_inner_step() {
        let mut wizard = controller();
        for i in 1..wizard.total_steps() {
            assert_eq!(wizard.current_step(), i);
            assert!(wizard.advance());
            assert!(wizard.retreat());
            assert_eq!(wizard.current_step(), i);
            wizard.advance();
        }
    }

    #[test]
    fn advance_on_last_step_is_noop() {
        let mut wizard = controller();
        while wizard.advance() {}
        assert_eq!(wizard.current_step(), 5);
        assert!(!wizard.advance());
        assert_eq!(wizard.current_step(), 5);
    }

    #[test]
    fn retreat_on_first_step_is_noop() {
        let mut wizard = controller();
        assert!(!wizard.retreat());
        assert_eq!(wizard.current_step(), 1);
    }

    #[test]
    fn progress_rounds_to_nearest_percent() {
        let mut wizard = controller();
        let mut seen = vec![wizard.progress_percent()];
        while wizard.advance() {
            seen.push(wizard.progress_percent());
        }
        assert_eq!(seen, vec![20, 40, 60, 80, 100]);

        let mut extended = WizardController::new(StepCatalog::extended());
        assert_eq!(extended.progress_percent(), 11);
        extended.advance();
        assert_eq!(extended.progress_percent(), 22);
    }

    #[test]
    fn progress_rounds_halves_up() {
        let catalog = StepCatalog::new(vec![
            StepKind::Identification,
            StepKind::CompanyProfile,
            StepKind::Goals,
            StepKind::Integrations,
            StepKind::Manuals,
            StepKind::Upload,
            StepKind::Results,
            StepKind::Activation,
        ])
        .unwrap();
        // 1/8 = 12.5%
        assert_eq!(WizardController::new(catalog).progress_percent(), 13);
    }

    #[test]
    fn completion_flags_follow_cursor() {
        let mut wizard = controller();
        wizard.advance();
        wizard.advance();
        assert!(wizard.is_completed(1));
        assert!(wizard.is_completed(2));
        assert!(!wizard.is_completed(3));

        let steps = wizard.steps();
        assert_eq!(steps.len(), 5);
        assert!(steps[2].current);
        assert!(!steps[2].completed);
        assert_eq!(steps[0].label, "Informações iniciais");
    }

    #[test]
    fn step_label_outside_catalog_is_none() {
        let wizard = controller();
        assert_eq!(wizard.step_label(2), Some("Manuais"));
        assert_eq!(wizard.step_label(0), None);
        assert_eq!(wizard.step_label(6), None);
    }

    #[test]
    fn patch_does_not_move_cursor() {
        let mut wizard = controller();
        wizard.patch(RecordPatch {
            client_name: Some("Acme".to_string()),
            ..Default::default()
        });
        assert_eq!(wizard.current_step(), 1);
        assert_eq!(wizard.record().client_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn commit_patches_and_advances() {
        let mut wizard = controller();
        assert!(wizard.commit(RecordPatch {
            tax_id: Some("11.222.333/0001-81".to_string()),
            ..Default::default()
        }));
        assert_eq!(wizard.current_step(), 2);
        assert!(wizard.record().tax_id.is_some());
    }
}
