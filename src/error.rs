//! Error taxonomy for monitor runs

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised by the locator, attribution and coverage stages
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a Git working tree", path.display())]
    NotARepository { path: PathBuf },

    #[error("the file '{}' is not tracked by Git in the repository", path.display())]
    NotTracked { path: PathBuf },

    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("test command `{command}` failed ({status}): {stderr}")]
    TestCommand {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("module name not found in {}", path.display())]
    MissingModule { path: PathBuf },

    #[error("malformed coverage profile at line {line}: {reason}")]
    CoverageFormat { line: usize, reason: String },

    #[error("invalid config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl MonitorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MonitorError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Non-fatal parse outcome: the file contributes no signal
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to load Go grammar: {0}")]
    Language(String),

    #[error("parser produced no tree for {}", path.display())]
    NoTree { path: PathBuf },

    #[error("syntax error in {} at line {line}", path.display())]
    Syntax { path: PathBuf, line: usize },
}
