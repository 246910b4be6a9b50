//! Compute resources allocated by SLURM, read from `SLURM_*` variables.

use anyhow::{Context, Result};
use tracing::info;

pub const NUM_NODES_VAR: &str = "SLURM_JOB_NUM_NODES";
pub const CPUS_VAR: &str = "SLURM_CPUS_ON_NODE";
pub const MEM_VAR: &str = "SLURM_MEM_PER_NODE";

/// Resources of the current allocation. Every field is `None` outside SLURM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlurmResources {
    /// Number of allocated nodes.
    pub nodes: Option<u32>,
    /// CPUs allocated on every node.
    pub cpus: Option<u32>,
    /// Memory allocated on every node in MB. Some clusters only set this when
    /// memory was requested explicitly.
    pub mem_mb: Option<u64>,
}

impl SlurmResources {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            nodes: parse_var(&lookup, NUM_NODES_VAR)?,
            cpus: parse_var(&lookup, CPUS_VAR)?,
            mem_mb: parse_var(&lookup, MEM_VAR)?,
        })
    }

    pub fn log_resources(&self) {
        if let Some(nodes) = self.nodes {
            info!(nodes, "SLURM allocated nodes");
        }
        if let Some(cpus) = self.cpus {
            info!(cpus, "SLURM allocated CPUs per node");
        }
        if let Some(mem_mb) = self.mem_mb {
            info!(mem_mb, "SLURM allocated memory per node (MB)");
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("parse {key}={raw:?}"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn outside_slurm_everything_is_unknown() {
        let res = SlurmResources::from_lookup(lookup_from(&[])).expect("resources");
        assert_eq!(res, SlurmResources::default());
    }

    #[test]
    fn reads_allocated_resources() {
        let res = SlurmResources::from_lookup(lookup_from(&[
            (NUM_NODES_VAR, "8"),
            (CPUS_VAR, "76"),
            (MEM_VAR, "3380000"),
        ]))
        .expect("resources");
        assert_eq!(
            res,
            SlurmResources {
                nodes: Some(8),
                cpus: Some(76),
                mem_mb: Some(3_380_000),
            }
        );
    }

    #[test]
    fn malformed_value_names_the_variable() {
        let err = SlurmResources::from_lookup(lookup_from(&[(NUM_NODES_VAR, "two")])).unwrap_err();
        assert!(format!("{err:#}").contains(NUM_NODES_VAR));
    }
}
