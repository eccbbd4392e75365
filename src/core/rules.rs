//! Individual checks shared by the validators and the milestone grader.
//!
//! Each operation returns `Ok(diagnostic)` on success and a typed
//! [`CheckError`] otherwise. None of them print; the reporter decides how an
//! outcome is shown and whether it counts against the run.

use crate::core::error::CheckError;
use crate::core::heuristic::{self, RetryEvidence, TextPattern};
use crate::core::syntax;
use crate::core::vcs::{CommitRecord, VcsError, VersionControl};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const CONVENTIONAL_COMMIT: &str = r"^(feat|fix|docs|test|refactor|style|chore)\(.+\):";

static CONVENTIONAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CONVENTIONAL_COMMIT).expect("conventional commit regex"));

pub fn conventional_commit_regex() -> &'static Regex {
    &CONVENTIONAL_RE
}

pub const RETRY_RATIONALE: &str = "\
IMPORTANT: DHT22 ERRORS ARE NORMAL!

The DHT22 uses a timing-sensitive one-wire protocol that normally
fails 10-20% of the time. This is NOT a bug, it is how the sensor works.

You MUST implement retry logic:
    for attempt in range(5):
        try:
            temperature = dht.temperature
            humidity = dht.humidity
            break
        except RuntimeError as e:
            print(f'Retry {attempt + 1}: {e}')
            time.sleep(2)";

pub const TRY_EXCEPT_RATIONALE: &str = "\
DHT22 throws RuntimeError on read failures.
Wrap your reading code in try/except.";

pub const SYNTAX_HINT: &str = "\
Check that line for:
  - a missing colon after if, for, while, def or class
  - unbalanced parentheses, brackets or quotes
  - inconsistent indentation (mixed tabs and spaces)";

/// A student artifact read into memory once.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    /// Existence check: the path must be a regular file.
    pub fn load(path: &Path) -> Result<SourceFile, CheckError> {
        if !path.is_file() {
            return Err(CheckError::MissingFile {
                path: display_path(path),
            });
        }
        let text = fs::read_to_string(path)?;
        Ok(SourceFile {
            path: path.to_path_buf(),
            text,
        })
    }

    /// `None` when the optional artifact is absent.
    pub fn load_optional(path: &Path) -> Result<Option<SourceFile>, CheckError> {
        if !path.exists() {
            return Ok(None);
        }
        SourceFile::load(path).map(Some)
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

fn display_path(path: &Path) -> PathBuf {
    path.file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| path.to_path_buf())
}

pub fn check_exists(path: &Path) -> Result<String, CheckError> {
    let file = SourceFile::load(path)?;
    Ok(format!("{} exists", file.file_name()))
}

pub fn check_syntax(file: &SourceFile) -> Result<String, CheckError> {
    syntax::check_python(&file.text).map_err(|e| CheckError::Syntax {
        line: e.line,
        message: e.message,
    })?;
    Ok(format!("{} syntax is valid", file.file_name()))
}

/// Every token must appear somewhere in the raw text.
pub fn check_tokens(file: &SourceFile, tokens: &[&str]) -> Result<String, CheckError> {
    let missing = heuristic::missing_tokens(&file.text, tokens);
    if !missing.is_empty() {
        return Err(CheckError::MissingTokens { tokens: missing });
    }
    Ok(format!("Required tokens present: {}", tokens.join(", ")))
}

/// Pattern variant of [`check_tokens`] for alternatives like
/// `import RPi.GPIO` / `from RPi import GPIO`.
pub fn check_pattern(
    file: &SourceFile,
    what: &str,
    pattern: &TextPattern,
) -> Result<String, CheckError> {
    if pattern.matches(&file.text) {
        Ok(format!("{} found", what))
    } else {
        Err(CheckError::MissingTokens {
            tokens: vec![pattern.describe()],
        })
    }
}

/// Loop plus try/except co-occurrence. With `strict`, also requires an error
/// name or a retry-ish identifier.
pub fn check_retry_shape(file: &SourceFile, strict: bool) -> Result<RetryEvidence, CheckError> {
    let evidence = RetryEvidence::scan(&file.text);
    if !evidence.has_loop {
        return Err(CheckError::HeuristicMismatch {
            summary: "CRITICAL: No retry loop found!".to_string(),
            rationale: RETRY_RATIONALE.to_string(),
        });
    }
    if !evidence.has_try_except {
        return Err(CheckError::HeuristicMismatch {
            summary: "CRITICAL: No try/except error handling found!".to_string(),
            rationale: TRY_EXCEPT_RATIONALE.to_string(),
        });
    }
    if strict && !evidence.is_retry_shaped() {
        return Err(CheckError::HeuristicMismatch {
            summary: "CRITICAL: DHT22 retry logic not detected!".to_string(),
            rationale: RETRY_RATIONALE.to_string(),
        });
    }
    Ok(evidence)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryReport {
    pub commits: Vec<CommitRecord>,
    pub conventional: usize,
}

impl HistoryReport {
    pub fn total(&self) -> usize {
        self.commits.len()
    }

    pub fn conventional_ratio(&self) -> f64 {
        if self.commits.is_empty() {
            return 0.0;
        }
        self.conventional as f64 / self.commits.len() as f64
    }
}

/// Version-control log check. `limit` bounds how far back to look; the
/// tool being absent or slow surfaces as an inconclusive error.
pub fn check_commit_history(
    vcs: &dyn VersionControl,
    limit: Option<usize>,
    min_commits: usize,
    pattern: Option<&Regex>,
) -> Result<HistoryReport, CheckError> {
    let commits = vcs.history(limit).map_err(CheckError::from)?;
    if commits.len() < min_commits {
        return Err(CheckError::TooFewCommits {
            found: commits.len(),
            required: min_commits,
        });
    }
    let conventional = match pattern {
        Some(re) => commits.iter().filter(|c| re.is_match(&c.subject)).count(),
        None => 0,
    };
    Ok(HistoryReport {
        commits,
        conventional,
    })
}

impl From<VcsError> for CheckError {
    fn from(err: VcsError) -> Self {
        match err {
            VcsError::Timeout { secs } => CheckError::Timeout {
                tool: "git".to_string(),
                secs,
            },
            other => CheckError::ToolUnavailable {
                tool: "git".to_string(),
                reason: other.to_string(),
            },
        }
    }
}
