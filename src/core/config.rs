//! Optional `gradegate.toml` at the repository root.
//!
//! Every field has a default matching the course template, so a repository
//! without the file behaves exactly like one with an empty file.

use crate::core::error::GradegateError;
use crate::core::evidence::DEFAULT_MARKER_DIR;
use crate::core::vcs::Timeouts;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "gradegate.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub course: String,
    pub artifacts: ArtifactConfig,
    pub evidence: EvidenceConfig,
    pub git: GitConfig,
    pub hardware: HardwareConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            course: "Formatif F2".to_string(),
            artifacts: ArtifactConfig::default(),
            evidence: EvidenceConfig::default(),
            git: GitConfig::default(),
            hardware: HardwareConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub led_script: String,
    pub rgb_script: String,
    pub sensor_script: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        ArtifactConfig {
            led_script: "led_simple.py".to_string(),
            rgb_script: "led_rgb.py".to_string(),
            sensor_script: "dht22.py".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EvidenceConfig {
    pub dir: String,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        EvidenceConfig {
            dir: DEFAULT_MARKER_DIR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitConfig {
    pub required_branches: Vec<String>,
    pub recent_commits: usize,
    pub min_commits: usize,
    pub metadata_timeout_secs: u64,
    pub log_timeout_secs: u64,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            required_branches: vec!["feature/led".to_string(), "feature/dht22".to_string()],
            recent_commits: 10,
            min_commits: 2,
            metadata_timeout_secs: 5,
            log_timeout_secs: 10,
        }
    }
}

impl GitConfig {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            metadata: Duration::from_secs(self.metadata_timeout_secs),
            log: Duration::from_secs(self.log_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HardwareConfig {
    pub cpuinfo: PathBuf,
    pub signatures: Vec<String>,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        HardwareConfig {
            cpuinfo: PathBuf::from("/proc/cpuinfo"),
            signatures: vec!["Raspberry Pi".to_string(), "Broadcom".to_string()],
        }
    }
}

/// Load `<repo_root>/gradegate.toml`. No file = defaults (not an error).
pub fn load_config(repo_root: &Path) -> Result<Config, GradegateError> {
    let path = repo_root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(&path).map_err(GradegateError::IoError)?;
    let config: Config = toml::from_str(&content).map_err(|e| GradegateError::ConfigError {
        path: path.clone(),
        message: e.to_string(),
    })?;
    config.validate().map_err(|e| GradegateError::ConfigError {
        path,
        message: e.to_string(),
    })?;
    Ok(config)
}

impl Config {
    /// Names must stay inside the repository root.
    pub fn validate(&self) -> Result<(), GradegateError> {
        let names = [
            ("artifacts.led_script", &self.artifacts.led_script),
            ("artifacts.rgb_script", &self.artifacts.rgb_script),
            ("artifacts.sensor_script", &self.artifacts.sensor_script),
            ("evidence.dir", &self.evidence.dir),
        ];
        for (key, value) in names {
            let path = Path::new(value.as_str());
            if value.trim().is_empty() || path.is_absolute() || value.contains("..") {
                return Err(GradegateError::ValidationError(format!(
                    "{} must be a relative name inside the repository, got {:?}",
                    key, value
                )));
            }
        }
        if self.git.required_branches.is_empty() {
            return Err(GradegateError::ValidationError(
                "git.required_branches must name at least one branch".to_string(),
            ));
        }
        Ok(())
    }
}
