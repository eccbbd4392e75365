//! Check-group sequencing and run outcome.
//!
//! Groups run in declaration order. Whatever a group returns, including an
//! error, is recorded and the next group still runs. Exit status depends on
//! mandatory groups only.

use crate::core::error::CheckError;
use crate::core::output::{self, Tone};
use crate::core::time;
use serde::Serialize;

pub const TRACE_ENV: &str = "GRADEGATE_TRACE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mandatory,
    Advisory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupStatus {
    Passed,
    Failed,
    /// Inconclusive or not applicable; never lowers the run.
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupResult {
    pub name: String,
    pub severity: Severity,
    pub status: GroupStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub groups: Vec<GroupResult>,
}

impl RunSummary {
    pub fn passed(&self) -> bool {
        self.groups
            .iter()
            .filter(|g| g.severity == Severity::Mandatory)
            .all(|g| g.status != GroupStatus::Failed)
    }

    pub fn exit_code(&self) -> u8 {
        if self.passed() { 0 } else { 1 }
    }

    pub fn group(&self, name: &str) -> Option<&GroupResult> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn status_of(&self, name: &str) -> Option<GroupStatus> {
        self.group(name).map(|g| g.status)
    }
}

pub struct Reporter {
    echo: bool,
    trace: bool,
    run_id: String,
    lines: Vec<String>,
    groups: Vec<GroupResult>,
    failures: Vec<String>,
    warnings: Vec<String>,
}

impl Reporter {
    pub fn new(echo: bool) -> Self {
        Reporter {
            echo,
            trace: std::env::var(TRACE_ENV).ok().as_deref() == Some("1"),
            run_id: time::new_run_id(),
            lines: Vec::new(),
            groups: Vec::new(),
            failures: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Prints to stdout as it records.
    pub fn stdout() -> Self {
        Reporter::new(true)
    }

    /// Records only; read back with [`Reporter::lines`].
    pub fn captured() -> Self {
        Reporter::new(false)
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn transcript(&self) -> String {
        self.lines.join("\n")
    }

    fn emit(&mut self, tone: Tone, message: &str) {
        let line = output::plain_line(tone, message);
        if self.echo {
            println!("{}", output::paint(tone, &line));
        }
        self.lines.push(line);
    }

    pub fn title(&mut self, text: &str) {
        self.emit(Tone::Plain, "");
        self.emit(Tone::Header, text);
        self.emit(Tone::Header, &output::rule());
    }

    pub fn header(&mut self, text: &str) {
        self.emit(Tone::Plain, "");
        self.emit(Tone::Header, &output::rule());
        self.emit(Tone::Header, &format!(" {}", text));
        self.emit(Tone::Header, &output::rule());
        self.emit(Tone::Plain, "");
    }

    pub fn banner(&mut self, tone: Tone, text: &str) {
        self.emit(Tone::Plain, "");
        self.emit(tone, &output::rule());
        self.emit(tone, &format!(" {}", text));
        self.emit(tone, &output::rule());
    }

    pub fn pass(&mut self, message: &str) {
        self.emit(Tone::Pass, message);
    }

    pub fn fail(&mut self, message: &str) {
        self.failures.push(message.to_string());
        self.emit(Tone::Fail, message);
    }

    pub fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
        self.emit(Tone::Warn, message);
    }

    pub fn skip(&mut self, message: &str) {
        self.emit(Tone::Skip, message);
    }

    pub fn info(&mut self, message: &str) {
        self.emit(Tone::Info, message);
    }

    /// Untagged, indented text: remediation, instructions.
    pub fn note(&mut self, message: &str) {
        for line in message.lines() {
            self.emit(Tone::Plain, &format!("  {}", line));
        }
    }

    /// Runs one check-group and records its status. Errors stop here.
    pub fn run_group<F>(&mut self, name: &str, severity: Severity, check: F) -> GroupStatus
    where
        F: FnOnce(&mut Reporter) -> Result<GroupStatus, CheckError>,
    {
        if self.trace {
            eprintln!("gradegate: trace {}", name);
        }
        let status = match check(self) {
            Ok(status) => status,
            Err(err) if err.is_inconclusive() => {
                self.warn(&format!("{} (inconclusive, not counted)", err));
                GroupStatus::Skipped
            }
            Err(err) => {
                self.fail(&err.to_string());
                if let Some(text) = err.remediation() {
                    self.emit(Tone::Plain, "");
                    self.note(text);
                }
                GroupStatus::Failed
            }
        };
        self.groups.push(GroupResult {
            name: name.to_string(),
            severity,
            status,
        });
        status
    }

    /// Prints the per-group verdicts and returns the aggregate.
    pub fn finish(&mut self) -> RunSummary {
        self.header("FINAL RESULTS");
        let groups = self.groups.clone();
        for g in &groups {
            let advisory = if g.severity == Severity::Advisory {
                " (advisory)"
            } else {
                ""
            };
            match g.status {
                GroupStatus::Passed => {
                    self.emit(Tone::Pass, &format!("{}: OK{}", g.name, advisory))
                }
                GroupStatus::Failed => {
                    self.emit(Tone::Fail, &format!("{}: FAILED{}", g.name, advisory))
                }
                GroupStatus::Skipped => {
                    self.emit(Tone::Skip, &format!("{}: SKIPPED{}", g.name, advisory))
                }
            }
        }

        let count = |status: GroupStatus| groups.iter().filter(|g| g.status == status).count();
        self.emit(Tone::Plain, "");
        self.emit(
            Tone::Plain,
            &format!(
                "gradegate: summary groups pass={} fail={} skip={}; messages fail={} warn={}",
                count(GroupStatus::Passed),
                count(GroupStatus::Failed),
                count(GroupStatus::Skipped),
                self.failures.len(),
                self.warnings.len()
            ),
        );
        if !self.failures.is_empty() {
            let preview = output::preview_messages(&self.failures, 2, 110);
            self.emit(Tone::Plain, &format!("gradegate: fail messages: {}", preview));
        }

        RunSummary {
            run_id: self.run_id.clone(),
            groups,
        }
    }
}
