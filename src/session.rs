use tracing::{debug, info};

use crate::error::LogError;
use crate::format::SolveTime;
use crate::solve_log::{SolveLog, SolveRecord};

/// Solves timed during one run of the live loop
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    solves: Vec<SolveTime>,
}

/// What happened to the session at shutdown
#[derive(Debug)]
pub enum ExportOutcome {
    Written(SolveRecord),
    /// Export disabled, nothing timed, or the run was interrupted
    Skipped,
    Failed(LogError),
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, solve: SolveTime) {
        self.solves.push(solve);
        debug!(%solve, count = self.solves.len(), "solve recorded");
    }

    pub fn solves(&self) -> &[SolveTime] {
        &self.solves
    }

    pub fn len(&self) -> usize {
        self.solves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solves.is_empty()
    }

    /// Today's record of this session, if there is anything to record
    pub fn to_record(&self) -> Option<SolveRecord> {
        if self.is_empty() {
            None
        } else {
            Some(SolveRecord::today(self.solves.clone()))
        }
    }

    /// Append the session to `log`. Empty sessions are never written.
    pub fn export(&self, log: &SolveLog) -> ExportOutcome {
        let Some(record) = self.to_record() else {
            return ExportOutcome::Skipped;
        };

        match log.append(&record) {
            Ok(()) => {
                info!(path = %log.path().display(), solves = self.len(), "session exported");
                ExportOutcome::Written(record)
            }
            Err(err) => ExportOutcome::Failed(err),
        }
    }
}
