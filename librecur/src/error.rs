use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a recurring-transaction run.
#[derive(Debug, Error)]
pub enum RecurError {
    /// Malformed date, period string or period unit.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("cannot access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Advancing by the period did not move the due date forward.
    #[error("period '{period}' does not advance '{date}', refusing to loop forever")]
    InvalidPeriod { date: String, period: String },

    #[error("date out of range: {0}")]
    DateRange(String),
}

impl RecurError {
    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        RecurError::Parse(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RecurError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RecurError>;
