//! Direction-independent self-calibration as an ordered list of commands.
//!
//! The plan is pure: it decides which commands to build and in what order,
//! but never runs them. All imaging and calibration steps operate in place on
//! one merged measurement set under `outdir`.

use std::path::{Path, PathBuf};

use crate::core::command::Command;
use crate::core::tools::{
    GaincalParams, WscleanParams, dp3_gaincal_command, dp3_initial_gaincal_command,
    dp3_merge_command, wsclean_command,
};

/// Name of the merged measurement set on which self-calibration runs.
pub const TEMPORARY_MS: &str = "BewareTheBlob.ms";

#[derive(Debug, Clone, PartialEq)]
pub struct SelfcalParams {
    pub outdir: PathBuf,
    pub size: (u32, u32),
    pub scale: String,
    /// Weighting mode as typed by a user, e.g. `"briggs -0.5"`.
    pub weight: String,
    pub initial_sky_model: Option<PathBuf>,
    pub gaincal_solint: u32,
    pub gaincal_nchan: u32,
    /// Clean iterations per self-cal cycle; the number of cycles is its length.
    pub clean_iters: Vec<u32>,
    pub final_clean_iters: u32,
    /// Zero-based cycle indices that use phase-only calibration.
    pub phase_only_cycles: Vec<usize>,
}

impl SelfcalParams {
    pub fn new(outdir: PathBuf, size: (u32, u32), scale: &str) -> Self {
        Self {
            outdir,
            size,
            scale: scale.to_string(),
            weight: "uniform".to_string(),
            initial_sky_model: None,
            gaincal_solint: 1,
            gaincal_nchan: 0,
            clean_iters: vec![20, 100, 500],
            final_clean_iters: 100_000,
            phase_only_cycles: vec![0],
        }
    }
}

/// One command of the plan with a label for humans.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedStep {
    pub label: String,
    pub command: Command,
}

impl PlannedStep {
    fn new(label: impl Into<String>, command: Command) -> Self {
        Self {
            label: label.into(),
            command,
        }
    }
}

pub fn selfcal_plan(inputs: &[PathBuf], params: &SelfcalParams) -> Vec<PlannedStep> {
    let ms = temporary_ms(&params.outdir);
    let num_cycles = params.clean_iters.len();
    let mut steps = vec![PlannedStep::new(
        "Merging input measurement sets into one",
        dp3_merge_command(inputs, &ms),
    )];

    if let Some(sky_model) = &params.initial_sky_model {
        steps.push(PlannedStep::new(
            format!("Initial gain calibration using skymodel {}", sky_model.display()),
            dp3_initial_gaincal_command(&ms, &ms, sky_model, &gaincal_params(params, "diagonal")),
        ));
    }

    for (icycle, niter) in params.clean_iters.iter().enumerate() {
        let name = params.outdir.join(format!("temp{:02}", icycle + 1));
        steps.push(PlannedStep::new(
            format!("Major cycle {} / {}: imaging", icycle + 1, num_cycles),
            wsclean_command(&ms, &wsclean_params(params, name, *niter)),
        ));

        let caltype = if params.phase_only_cycles.contains(&icycle) {
            "diagonalphase"
        } else {
            "diagonal"
        };
        steps.push(PlannedStep::new(
            format!("Major cycle {} / {}: calibration", icycle + 1, num_cycles),
            dp3_gaincal_command(&ms, &ms, &gaincal_params(params, caltype)),
        ));
    }

    let final_name = params.outdir.join("final");
    steps.push(PlannedStep::new(
        "Making final image",
        wsclean_command(&ms, &wsclean_params(params, final_name, params.final_clean_iters)),
    ));
    steps
}

fn wsclean_params(params: &SelfcalParams, name: PathBuf, niter: u32) -> WscleanParams {
    let mut wsclean = WscleanParams::new(
        params.outdir.clone(),
        name,
        niter,
        params.size,
        &params.scale,
    );
    wsclean.weight = params.weight.split_whitespace().map(str::to_string).collect();
    wsclean
}

fn gaincal_params(params: &SelfcalParams, caltype: &str) -> GaincalParams {
    GaincalParams {
        caltype: caltype.to_string(),
        solint: params.gaincal_solint,
        nchan: params.gaincal_nchan,
    }
}

/// Path of the merged measurement set for `outdir`.
pub fn temporary_ms(outdir: &Path) -> PathBuf {
    outdir.join(TEMPORARY_MS)
}
