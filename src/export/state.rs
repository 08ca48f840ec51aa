//! Export lifecycle tracking.

use super::ExportTarget;
use crate::error::{Error, Result};

/// Where an export is in its lifecycle.
///
/// `Idle -> Composing -> (Rendering) -> Assembling -> Emitted`, with `Failed`
/// reachable from every non-terminal state. Only the paginated target
/// renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    Composing,
    Rendering,
    Assembling,
    Emitted,
    Failed,
}

impl ExportState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExportState::Emitted | ExportState::Failed)
    }

    fn allows(self, next: ExportState, target: ExportTarget) -> bool {
        use ExportState::*;
        match (self, next) {
            (Emitted | Failed, _) => false,
            (_, Failed) => true,
            (Idle, Composing) => true,
            (Composing, Rendering) => target == ExportTarget::Pdf,
            (Composing | Rendering, Assembling) => true,
            (Assembling, Emitted) => true,
            _ => false,
        }
    }
}

/// Per-export state machine that logs every transition.
#[derive(Debug)]
pub struct ExportTracker {
    target: ExportTarget,
    history: Vec<ExportState>,
}

impl ExportTracker {
    pub fn new(target: ExportTarget) -> Self {
        Self {
            target,
            history: vec![ExportState::Idle],
        }
    }

    pub fn state(&self) -> ExportState {
        self.history
            .last()
            .copied()
            .unwrap_or(ExportState::Idle)
    }

    pub fn advance(&mut self, next: ExportState) -> Result<()> {
        let current = self.state();
        if !current.allows(next, self.target) {
            return Err(Error::InvalidInput(format!(
                "{} export cannot move from {current:?} to {next:?}",
                self.target
            )));
        }
        log::debug!("{} export: {current:?} -> {next:?}", self.target);
        self.history.push(next);
        Ok(())
    }

    /// Record a failure and wrap the error with the export's target.
    pub fn fail(&mut self, err: Error) -> Error {
        if !self.state().is_terminal() {
            self.history.push(ExportState::Failed);
        }
        log::error!("{} export failed ({}): {err}", self.target, err.cause());
        err.in_export(self.target)
    }

    pub fn history(&self) -> &[ExportState] {
        &self.history
    }

    pub fn into_history(self) -> Vec<ExportState> {
        self.history
    }
}
