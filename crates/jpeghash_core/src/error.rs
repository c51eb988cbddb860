use std::path::PathBuf;

use thiserror::Error;

/// Step of the file access sequence that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoStage {
    Open,
    Stat,
    Map,
    Read,
}

impl IoStage {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Stat => "stat",
            Self::Map => "mmap",
            Self::Read => "read",
        }
    }
}

impl std::fmt::Display for IoStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid exclusion range '{directive}': {reason}")]
    InvalidRange { directive: String, reason: String },

    #[error("I/O error during {stage} of {}: {source}", path.display())]
    Io {
        stage: IoStage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input line is missing its terminator: {line:?}")]
    MalformedInputLine { line: String },
}

impl CoreError {
    pub(crate) fn invalid_range(directive: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            directive: directive.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn io(stage: IoStage, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            stage,
            path: path.into(),
            source,
        }
    }

    /// The failing I/O stage, if this is an I/O error.
    #[must_use]
    pub fn io_stage(&self) -> Option<IoStage> {
        match self {
            Self::Io { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
