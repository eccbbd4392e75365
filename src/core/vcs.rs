//! Version-control capability.
//!
//! Checks never spawn `git` themselves. They ask a [`VersionControl`] for
//! history, branches and config, so tests can hand in a [`ScriptedVcs`].
//! [`GitCli`] bounds every call: 5 s for metadata queries, 10 s for log
//! enumeration. A missing binary or an expired timeout is reported as an
//! error for the caller to treat as inconclusive.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Upper bound on commits enumerated per log query.
const HISTORY_CAP: usize = 500;
const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: String,
    pub subject: String,
}

impl CommitRecord {
    /// Parses `<hash> <subject>` as printed by `--pretty=format:%h %s`.
    pub fn parse_line(line: &str) -> Option<CommitRecord> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (id, subject) = line.split_once(' ').unwrap_or((line, ""));
        Some(CommitRecord {
            id: id.to_string(),
            subject: subject.trim().to_string(),
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VcsError {
    #[error("{0}")]
    Unavailable(String),
    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },
    #[error("`{command}` failed: {stderr}")]
    Failed { command: String, stderr: String },
}

pub trait VersionControl {
    fn is_repository(&self) -> Result<bool, VcsError>;
    /// Most recent first. `None` means "as many as the backend will give".
    fn history(&self, limit: Option<usize>) -> Result<Vec<CommitRecord>, VcsError>;
    /// Local and remote branch names.
    fn branches(&self) -> Result<Vec<String>, VcsError>;
    /// Subjects of commits on any ref mentioning "Merge".
    fn merge_subjects(&self) -> Result<Vec<String>, VcsError>;
    fn user_name(&self) -> Result<Option<String>, VcsError>;
}

#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub metadata: Duration,
    pub log: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            metadata: Duration::from_secs(5),
            log: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    repo_root: PathBuf,
    timeouts: Timeouts,
}

impl GitCli {
    pub fn new(repo_root: &Path, timeouts: Timeouts) -> Self {
        GitCli::with_program("git", repo_root, timeouts)
    }

    pub fn with_program(program: &str, repo_root: &Path, timeouts: Timeouts) -> Self {
        GitCli {
            program: program.to_string(),
            repo_root: repo_root.to_path_buf(),
            timeouts,
        }
    }

    fn run(&self, args: &[&str], timeout: Duration) -> Result<String, VcsError> {
        let start = Instant::now();
        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(&self.repo_root)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    VcsError::Unavailable(format!("{} not installed", self.program))
                }
                _ => VcsError::Unavailable(format!("failed to run {}: {}", self.program, e)),
            })?;

        // Pipes are drained while the child runs so large output cannot block it.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = loop {
            let exited = child
                .try_wait()
                .map_err(|e| VcsError::Unavailable(e.to_string()))?;
            if let Some(status) = exited {
                break status;
            }
            if start.elapsed() > timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(VcsError::Timeout {
                    secs: timeout.as_secs(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stdout = collect(stdout)?;
        if status.success() {
            return Ok(String::from_utf8_lossy(&stdout).into_owned());
        }
        let stderr = collect(stderr)?;
        Err(VcsError::Failed {
            command: format!("{} {}", self.program, args.join(" ")),
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        })
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn collect(reader: JoinHandle<io::Result<Vec<u8>>>) -> Result<Vec<u8>, VcsError> {
    reader
        .join()
        .map_err(|_| VcsError::Unavailable("output reader panicked".to_string()))?
        .map_err(|e| VcsError::Unavailable(e.to_string()))
}

impl VersionControl for GitCli {
    fn is_repository(&self) -> Result<bool, VcsError> {
        match self.run(
            &["rev-parse", "--is-inside-work-tree"],
            self.timeouts.metadata,
        ) {
            Ok(out) => Ok(out.trim() == "true"),
            Err(VcsError::Failed { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn history(&self, limit: Option<usize>) -> Result<Vec<CommitRecord>, VcsError> {
        let n = limit.unwrap_or(HISTORY_CAP).min(HISTORY_CAP).to_string();
        let out = self.run(
            &["log", "--pretty=format:%h %s", "-n", &n],
            self.timeouts.log,
        )?;
        Ok(out.lines().filter_map(CommitRecord::parse_line).collect())
    }

    fn branches(&self) -> Result<Vec<String>, VcsError> {
        let out = self.run(&["branch", "-a"], self.timeouts.metadata)?;
        Ok(out
            .lines()
            .map(|l| l.trim_start_matches('*').trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }

    fn merge_subjects(&self) -> Result<Vec<String>, VcsError> {
        let n = HISTORY_CAP.to_string();
        let out = self.run(
            &["log", "--all", "--pretty=format:%s", "--grep", "Merge", "-n", &n],
            self.timeouts.log,
        )?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn user_name(&self) -> Result<Option<String>, VcsError> {
        match self.run(&["config", "user.name"], self.timeouts.metadata) {
            Ok(out) => {
                let name = out.trim();
                Ok((!name.is_empty()).then(|| name.to_string()))
            }
            // `git config` exits 1 when the key is unset.
            Err(VcsError::Failed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// In-memory backend for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct ScriptedVcs {
    pub repository: bool,
    pub commits: Vec<CommitRecord>,
    pub branches: Vec<String>,
    pub merges: Vec<String>,
    pub user: Option<String>,
    pub failure: Option<VcsError>,
}

impl ScriptedVcs {
    pub fn with_subjects(subjects: &[&str]) -> Self {
        let commits = subjects
            .iter()
            .enumerate()
            .map(|(i, s)| CommitRecord {
                id: format!("{:07x}", 0xabc0000 + i),
                subject: s.to_string(),
            })
            .collect();
        ScriptedVcs {
            repository: true,
            commits,
            ..ScriptedVcs::default()
        }
    }

    pub fn unavailable() -> Self {
        ScriptedVcs {
            failure: Some(VcsError::Unavailable("git not installed".to_string())),
            ..ScriptedVcs::default()
        }
    }

    pub fn timing_out(secs: u64) -> Self {
        ScriptedVcs {
            failure: Some(VcsError::Timeout { secs }),
            ..ScriptedVcs::default()
        }
    }

    pub fn branch(mut self, name: &str) -> Self {
        self.branches.push(name.to_string());
        self
    }

    pub fn merge(mut self, subject: &str) -> Self {
        self.merges.push(subject.to_string());
        self
    }

    pub fn user(mut self, name: &str) -> Self {
        self.user = Some(name.to_string());
        self
    }

    fn check(&self) -> Result<(), VcsError> {
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

impl VersionControl for ScriptedVcs {
    fn is_repository(&self) -> Result<bool, VcsError> {
        self.check()?;
        Ok(self.repository)
    }

    fn history(&self, limit: Option<usize>) -> Result<Vec<CommitRecord>, VcsError> {
        self.check()?;
        let n = limit.unwrap_or(self.commits.len());
        Ok(self.commits.iter().take(n).cloned().collect())
    }

    fn branches(&self) -> Result<Vec<String>, VcsError> {
        self.check()?;
        Ok(self.branches.clone())
    }

    fn merge_subjects(&self) -> Result<Vec<String>, VcsError> {
        self.check()?;
        Ok(self.merges.clone())
    }

    fn user_name(&self) -> Result<Option<String>, VcsError> {
        self.check()?;
        Ok(self.user.clone())
    }
}
