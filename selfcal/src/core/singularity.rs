//! Containerization: run a command inside a Singularity image.
//!
//! Every path argument is made absolute, re-rooted under the mount root
//! (`/mnt` by default), and its parent directory is bind-mounted to the
//! matching virtual directory. Mounts are deduplicated per directory, not
//! per file.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::core::command::Command;
use crate::core::modifier::Modifier;
use crate::core::scalar::{ScalarValue, render_path};

pub const DEFAULT_MOUNT_ROOT: &str = "/mnt";

/// Modifier that prefixes `singularity exec --bind ... IMAGE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingularityExec {
    image: PathBuf,
    working_dir: PathBuf,
    mount_root: String,
}

impl SingularityExec {
    /// Relative paths (including `image`) are resolved against `working_dir`.
    /// A relative `working_dir` is anchored at `/`.
    pub fn new(image: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            working_dir: Path::new("/").join(working_dir.into()),
            mount_root: DEFAULT_MOUNT_ROOT.to_string(),
        }
    }

    /// Resolve relative paths against the process working directory.
    pub fn from_current_dir(image: impl Into<PathBuf>) -> std::io::Result<Self> {
        Ok(Self::new(image, std::env::current_dir()?))
    }

    pub fn with_mount_root(mut self, mount_root: impl Into<String>) -> Self {
        let root: String = mount_root.into();
        self.mount_root = root.trim_end_matches('/').to_string();
        self
    }

    pub fn image(&self) -> PathBuf {
        self.absolute(&self.image)
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    /// `host` must be absolute.
    fn virtualize(&self, host: &Path) -> PathBuf {
        let relative = host.strip_prefix("/").unwrap_or(host);
        Path::new("/").join(&self.mount_root).join(relative)
    }
}

impl Modifier for SingularityExec {
    fn order(&self) -> i32 {
        1
    }

    fn apply(&self, command: &Command) -> (Vec<String>, Command) {
        let mut mounts: BTreeSet<(String, String)> = BTreeSet::new();

        let rewritten = command.clone().map_scalars(|scalar| {
            let Some(path) = scalar.as_path() else {
                return scalar;
            };
            let host = self.absolute(path);
            let host_dir = host.parent().unwrap_or(host.as_path());
            mounts.insert((render_path(host_dir), render_path(&self.virtualize(host_dir))));
            ScalarValue::Path(self.virtualize(&host))
        });

        let mut prefix = vec!["singularity".to_string(), "exec".to_string()];
        for (host_dir, virtual_dir) in mounts {
            prefix.push("--bind".to_string());
            prefix.push(format!("{host_dir}:{virtual_dir}"));
        }
        prefix.push(render_path(&self.image()));
        (prefix, rewritten)
    }

    fn name(&self) -> &'static str {
        "singularity"
    }
}
