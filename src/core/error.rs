use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GradegateError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Configuration error in {path}: {message}")]
    ConfigError { path: PathBuf, message: String },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Why a single check did not pass.
///
/// Every variant stops at the check-group boundary; `Reporter::run_group`
/// decides whether it fails the group or only downgrades it to an advisory skip.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("{} not found", .path.display())]
    MissingFile { path: PathBuf },
    #[error("Syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("Missing required tokens: {}", .tokens.join(", "))]
    MissingTokens { tokens: Vec<String> },
    #[error("{summary}")]
    HeuristicMismatch { summary: String, rationale: String },
    #[error("{tool} unavailable: {reason}")]
    ToolUnavailable { tool: String, reason: String },
    #[error("{tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },
    #[error("Only {found} commit(s) found, at least {required} expected")]
    TooFewCommits { found: usize, required: usize },
    #[error("Evidence error: {0}")]
    Evidence(#[from] GradegateError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("{source}")]
    WithHint {
        source: Box<CheckError>,
        hint: String,
    },
}

impl CheckError {
    /// Inconclusive conditions never count against the run.
    pub fn is_inconclusive(&self) -> bool {
        match self {
            CheckError::ToolUnavailable { .. } | CheckError::Timeout { .. } => true,
            CheckError::WithHint { source, .. } => source.is_inconclusive(),
            _ => false,
        }
    }

    /// Long-form text shown below the failure line, if any.
    pub fn remediation(&self) -> Option<&str> {
        match self {
            CheckError::HeuristicMismatch { rationale, .. } => Some(rationale),
            CheckError::WithHint { hint, .. } => Some(hint),
            _ => None,
        }
    }
}

pub trait CheckResultExt<T> {
    /// Attach remediation text printed under the failure line.
    fn hint(self, hint: impl Into<String>) -> Result<T, CheckError>;
}

impl<T> CheckResultExt<T> for Result<T, CheckError> {
    fn hint(self, hint: impl Into<String>) -> Result<T, CheckError> {
        self.map_err(|e| CheckError::WithHint {
            source: Box::new(e),
            hint: hint.into(),
        })
    }
}
