use crate::error::StepError;

/// Outcome of a visibility probe guarding an optional step.
///
/// A probe must never abort a scenario, so there is no error arm: any
/// failure while probing is folded into `NotVisible` and the guarded
/// action is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Visible,
    NotVisible,
}

impl Probe {
    pub fn from_result(result: Result<(), StepError>) -> Self {
        match result {
            Ok(()) => Probe::Visible,
            Err(err) => {
                tracing::debug!("probe resolved to not-visible: {}", err);
                Probe::NotVisible
            }
        }
    }

    pub fn is_visible(self) -> bool {
        matches!(self, Probe::Visible)
    }
}
