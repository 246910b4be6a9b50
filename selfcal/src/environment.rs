//! Choose modifiers for the execution environment: bare metal, container,
//! multi-node, or container on multiple nodes.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::modifier::Modifier;
use crate::core::mpirun::Mpirun;
use crate::core::singularity::SingularityExec;
use crate::io::config::SelfcalConfig;
use crate::io::slurm::SlurmResources;

/// Values given on the command line that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub singularity_image: Option<PathBuf>,
    pub num_nodes: Option<u32>,
}

/// The modifiers that apply in the current environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub singularity: Option<SingularityExec>,
    pub mpirun: Option<Mpirun>,
}

impl Environment {
    /// Modifiers in construction order (container first). Composition sorts
    /// them by `order()`, so this order has no effect on the result.
    pub fn modifiers(&self) -> Vec<&dyn Modifier> {
        let mut modifiers: Vec<&dyn Modifier> = Vec::new();
        if let Some(singularity) = &self.singularity {
            modifiers.push(singularity);
        }
        if let Some(mpirun) = &self.mpirun {
            modifiers.push(mpirun);
        }
        modifiers
    }
}

/// Build the environment from an optional image and a node count.
///
/// A node count of one or less adds no distribution modifier.
pub fn select_modifiers(
    image: Option<&Path>,
    working_dir: &Path,
    num_nodes: u32,
    mount_root: &str,
) -> Environment {
    let singularity = image.map(|image| {
        SingularityExec::new(image, working_dir).with_mount_root(mount_root)
    });
    let mpirun = (num_nodes > 1).then(|| Mpirun::new(num_nodes));
    debug!(
        container = singularity.is_some(),
        num_nodes, "selected execution environment"
    );
    Environment {
        singularity,
        mpirun,
    }
}

/// Resolve the environment: command-line overrides, then config, then the
/// SLURM allocation, then a single bare-metal node.
pub fn resolve_environment(
    cfg: &SelfcalConfig,
    overrides: &Overrides,
    slurm: &SlurmResources,
    working_dir: &Path,
) -> Environment {
    let image = overrides
        .singularity_image
        .as_deref()
        .or(cfg.singularity_image.as_deref());
    let num_nodes = overrides
        .num_nodes
        .or(cfg.num_nodes)
        .or(slurm.nodes)
        .unwrap_or(1);
    select_modifiers(image, working_dir, num_nodes, &cfg.mount_root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_metal_has_no_modifiers() {
        let env = select_modifiers(None, Path::new("/work"), 1, "/mnt");
        assert!(env.modifiers().is_empty());
    }

    #[test]
    fn image_and_nodes_enable_both_modifiers() {
        let env = select_modifiers(Some(Path::new("/img.sif")), Path::new("/work"), 4, "/mnt");
        let names: Vec<&str> = env.modifiers().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["singularity", "mpirun"]);
    }

    #[test]
    fn overrides_beat_config_and_config_beats_slurm() {
        let cfg = SelfcalConfig {
            singularity_image: Some(PathBuf::from("/cfg.sif")),
            num_nodes: Some(2),
            ..SelfcalConfig::default()
        };
        let slurm = SlurmResources {
            nodes: Some(16),
            ..SlurmResources::default()
        };

        let env = resolve_environment(&cfg, &Overrides::default(), &slurm, Path::new("/work"));
        assert_eq!(env.mpirun, Some(Mpirun::new(2)));
        assert_eq!(
            env.singularity.as_ref().map(SingularityExec::image),
            Some(PathBuf::from("/cfg.sif"))
        );

        let overrides = Overrides {
            singularity_image: Some(PathBuf::from("/cli.sif")),
            num_nodes: Some(1),
        };
        let env = resolve_environment(&cfg, &overrides, &slurm, Path::new("/work"));
        assert_eq!(env.mpirun, None);
        assert_eq!(
            env.singularity.as_ref().map(SingularityExec::image),
            Some(PathBuf::from("/cli.sif"))
        );
    }

    #[test]
    fn slurm_allocation_is_the_fallback() {
        let slurm = SlurmResources {
            nodes: Some(3),
            ..SlurmResources::default()
        };
        let env = resolve_environment(
            &SelfcalConfig::default(),
            &Overrides::default(),
            &slurm,
            Path::new("/work"),
        );
        assert_eq!(env.mpirun, Some(Mpirun::new(3)));
        assert_eq!(env.singularity, None);
    }
}
