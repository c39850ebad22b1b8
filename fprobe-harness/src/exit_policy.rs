//! Maps a run's summary to success or failure.

use crate::summary::Summary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunVerdict {
    Clean,
    Dirty { discrepancies: usize, errors: usize },
}

impl RunVerdict {
    /// Clean iff there are no discrepancies and no probe errors.
    pub fn from_summary(summary: &Summary) -> Self {
        if summary.discrepancies == 0 && summary.errors == 0 {
            RunVerdict::Clean
        } else {
            RunVerdict::Dirty {
                discrepancies: summary.discrepancies,
                errors: summary.errors,
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, RunVerdict::Clean)
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            RunVerdict::Clean => 0,
            RunVerdict::Dirty { .. } => 1,
        }
    }
}
