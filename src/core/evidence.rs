//! Marker evidence store.
//!
//! A marker is a small text file in `.test_markers/` whose presence tells the
//! remote grader that a check-group passed locally. The first line is
//! `<Label>: <ISO-8601 timestamp>`; anything after it is free-text detail.
//!
//! The grader trusts the markers as written. There is no checksum or
//! signature: `exists(name)` is the whole contract.

use crate::core::error::GradegateError;
use crate::core::time;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MARKER_DIR: &str = ".test_markers";
pub const SUMMARY_MARKER: &str = "test_summary";
pub const ALL_PASSED_MARKER: &str = "all_tests_passed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub name: String,
    pub label: String,
    pub timestamp: String,
    pub detail: String,
}

impl Marker {
    fn parse(name: &str, raw: &str) -> Marker {
        let mut lines = raw.splitn(2, '\n');
        let head = lines.next().unwrap_or_default();
        let detail = lines.next().unwrap_or_default().trim_end().to_string();
        let (label, timestamp) = match head.split_once(": ") {
            Some((l, t)) => (l.to_string(), t.trim().to_string()),
            None => (head.trim().to_string(), String::new()),
        };
        Marker {
            name: name.to_string(),
            label,
            timestamp,
            detail,
        }
    }

    fn render(&self) -> String {
        if self.detail.is_empty() {
            format!("{}: {}\n", self.label, self.timestamp)
        } else {
            format!("{}: {}\n{}\n", self.label, self.timestamp, self.detail)
        }
    }
}

#[derive(Debug, Clone)]
pub struct EvidenceStore {
    pub root: PathBuf,
}

impl EvidenceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        EvidenceStore { root: root.into() }
    }

    pub fn in_repo(repo_root: &Path, dir_name: &str) -> Self {
        EvidenceStore::new(repo_root.join(dir_name))
    }

    pub fn dir_exists(&self) -> bool {
        self.root.is_dir()
    }

    pub fn marker_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.txt", name))
    }

    /// Write `<name>.txt`, replacing any earlier content for that name.
    pub fn put(&self, name: &str, label: &str, detail: &str) -> Result<Marker, GradegateError> {
        fs::create_dir_all(&self.root).map_err(GradegateError::IoError)?;
        let marker = Marker {
            name: name.to_string(),
            label: label.to_string(),
            timestamp: time::now_iso8601(),
            detail: detail.trim_end().to_string(),
        };
        fs::write(self.marker_path(name), marker.render()).map_err(GradegateError::IoError)?;
        Ok(marker)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.marker_path(name).is_file()
    }

    pub fn read(&self, name: &str) -> Result<Marker, GradegateError> {
        let path = self.marker_path(name);
        if !path.is_file() {
            return Err(GradegateError::NotFound(format!("marker {}", name)));
        }
        let raw = fs::read_to_string(&path).map_err(GradegateError::IoError)?;
        Ok(Marker::parse(name, &raw))
    }

    /// Names of all `.txt` markers, sorted.
    pub fn list(&self) -> Result<Vec<String>, GradegateError> {
        if !self.dir_exists() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = self.names()?.collect();
        names.sort();
        Ok(names)
    }

    /// Lazily yields marker names ending in `suffix` (e.g. `_verified`).
    pub fn with_suffix<'a>(
        &self,
        suffix: &'a str,
    ) -> Result<impl Iterator<Item = String> + use<'a>, GradegateError> {
        Ok(self.names()?.filter(move |n| n.ends_with(suffix)))
    }

    fn names(&self) -> Result<impl Iterator<Item = String> + use<>, GradegateError> {
        let entries = fs::read_dir(&self.root).map_err(GradegateError::IoError)?;
        Ok(entries.filter_map(|entry| {
            let path = entry.ok()?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("txt") {
                return None;
            }
            path.file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        }))
    }

    /// Writes `test_summary.txt` from every `*_verified` / `*_detected` marker.
    pub fn write_summary(&self, title: &str, run_id: &str) -> Result<PathBuf, GradegateError> {
        fs::create_dir_all(&self.root).map_err(GradegateError::IoError)?;
        let mut names: Vec<String> = self
            .with_suffix("_verified")?
            .chain(self.with_suffix("_detected")?)
            .collect();
        names.sort();

        let mut summary = format!(
            "Test Summary for {}\nGenerated: {}\nRun: {}\nTests Run: {}\n\nMarkers:\n",
            title,
            time::now_iso8601(),
            run_id,
            names.len()
        );
        for name in &names {
            let raw = fs::read_to_string(self.marker_path(name)).map_err(GradegateError::IoError)?;
            let flattened = raw.trim().lines().collect::<Vec<_>>().join(" | ");
            summary.push_str(&format!("  - {}: {}\n", name, flattened));
        }

        let path = self.marker_path(SUMMARY_MARKER);
        fs::write(&path, summary).map_err(GradegateError::IoError)?;
        Ok(path)
    }
}
