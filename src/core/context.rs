use crate::core::config::{self, Config};
use crate::core::error::GradegateError;
use crate::core::evidence::EvidenceStore;
use crate::core::vcs::{GitCli, VersionControl};
use std::path::{Path, PathBuf};

/// Everything a check-group needs: where the student repository lives, how
/// it is configured, where markers go, and how to ask version control.
pub struct HarnessContext {
    pub root: PathBuf,
    pub config: Config,
    pub evidence: EvidenceStore,
    pub vcs: Box<dyn VersionControl>,
}

impl HarnessContext {
    pub fn new(root: &Path, config: Config) -> Self {
        let vcs = GitCli::new(root, config.git.timeouts());
        HarnessContext {
            root: root.to_path_buf(),
            evidence: EvidenceStore::in_repo(root, &config.evidence.dir),
            config,
            vcs: Box::new(vcs),
        }
    }

    /// Reads `gradegate.toml` under `root` and wires up the real git backend.
    pub fn load(root: &Path) -> Result<Self, GradegateError> {
        let config = config::load_config(root)?;
        Ok(HarnessContext::new(root, config))
    }

    pub fn with_vcs(mut self, vcs: impl VersionControl + 'static) -> Self {
        self.vcs = Box::new(vcs);
        self
    }

    pub fn artifact(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}
