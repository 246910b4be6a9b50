//! Execution environment configuration stored in `selfcal.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::singularity::DEFAULT_MOUNT_ROOT;

pub const DEFAULT_CONFIG_FILE: &str = "selfcal.toml";

/// Environment configuration (TOML).
///
/// Every field is optional in the file; missing fields fall back to bare-metal,
/// single-node defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SelfcalConfig {
    /// Singularity image containing both WSClean and DP3. When set, every
    /// command runs inside the container.
    pub singularity_image: Option<PathBuf>,

    /// Number of nodes for distributed imaging. When unset, the SLURM
    /// allocation is used.
    pub num_nodes: Option<u32>,

    /// Directory inside the container under which host paths are mounted.
    pub mount_root: String,
}

impl Default for SelfcalConfig {
    fn default() -> Self {
        Self {
            singularity_image: None,
            num_nodes: None,
            mount_root: DEFAULT_MOUNT_ROOT.to_string(),
        }
    }
}

impl SelfcalConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_nodes == Some(0) {
            return Err(anyhow!("num_nodes must be > 0"));
        }
        if !self.mount_root.starts_with('/') {
            return Err(anyhow!(
                "mount_root must be an absolute path, got '{}'",
                self.mount_root
            ));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SelfcalConfig::default()`.
pub fn load_config(path: &Path) -> Result<SelfcalConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config file missing, using defaults");
        let cfg = SelfcalConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SelfcalConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &SelfcalConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, SelfcalConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("selfcal.toml");
        let cfg = SelfcalConfig {
            singularity_image: Some(PathBuf::from("/images/selfcal.sif")),
            num_nodes: Some(4),
            mount_root: "/mnt".to_string(),
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("selfcal.toml");
        fs::write(&path, "num_nodes = 2\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.num_nodes, Some(2));
        assert_eq!(cfg.singularity_image, None);
        assert_eq!(cfg.mount_root, "/mnt");
    }

    #[test]
    fn zero_nodes_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("selfcal.toml");
        fs::write(&path, "num_nodes = 0\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("num_nodes must be > 0"));
    }

    #[test]
    fn relative_mount_root_is_rejected() {
        let cfg = SelfcalConfig {
            mount_root: "mnt".to_string(),
            ..SelfcalConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
