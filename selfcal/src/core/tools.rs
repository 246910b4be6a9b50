//! Builders for the WSClean and DP3 invocations used by self-calibration.
//!
//! Option names match the tools' own command-line spelling.

use std::path::{Path, PathBuf};

use crate::core::command::Command;

pub const WSCLEAN: &str = "wsclean";
pub const DP3: &str = "DP3";

/// DP3 gaincal may hang on machines with 64 or more cores unless the thread
/// count stays below 64.
pub const DP3_NUM_THREADS: u32 = 16;

/// Imaging parameters for a single WSClean run.
#[derive(Debug, Clone, PartialEq)]
pub struct WscleanParams {
    pub temp_dir: PathBuf,
    pub name: PathBuf,
    pub niter: u32,
    pub size: (u32, u32),
    pub scale: String,
    /// Weighting mode tokens, e.g. `["briggs", "-0.5"]`.
    pub weight: Vec<String>,
    pub gridder: String,
    pub auto_threshold: f64,
    pub mgain: f64,
    pub parallel_deconvolution: u32,
}

impl WscleanParams {
    /// Parameters with the pipeline's defaults for gridder, thresholds and
    /// deconvolution.
    pub fn new(temp_dir: PathBuf, name: PathBuf, niter: u32, size: (u32, u32), scale: &str) -> Self {
        Self {
            temp_dir,
            name,
            niter,
            size,
            scale: scale.to_string(),
            weight: vec!["uniform".to_string()],
            gridder: "wgridder".to_string(),
            auto_threshold: 3.0,
            mgain: 0.8,
            parallel_deconvolution: 2048,
        }
    }
}

pub fn wsclean_command(input_ms: &Path, params: &WscleanParams) -> Command {
    Command::imaging(WSCLEAN)
        .option("-temp-dir", params.temp_dir.clone())
        .option("-name", params.name.clone())
        .option("-niter", params.niter)
        .option("-size", params.size)
        .option("-scale", params.scale.as_str())
        .option("-weight", params.weight.clone())
        .option("-gridder", params.gridder.as_str())
        .option("-auto-threshold", params.auto_threshold)
        .option("-mgain", params.mgain)
        .option("-parallel-deconvolution", params.parallel_deconvolution)
        .arg(input_ms)
}

/// Merge several measurement sets into one, keeping only the DATA column.
/// Gaincal can only operate on a single input.
pub fn dp3_merge_command(inputs: &[PathBuf], msout: &Path) -> Command {
    Command::calibration(DP3)
        .option("msin", inputs.to_vec())
        .option("msout", msout)
        .option("steps", Vec::<String>::new())
}

/// Solution interval and calibration type for a gaincal step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaincalParams {
    pub caltype: String,
    /// Time slots per solution; 0 means all.
    pub solint: u32,
    /// Channels per solution; 0 means all.
    pub nchan: u32,
}

fn dp3_gaincal_base(msin: &Path, msout: &Path, params: &GaincalParams) -> Command {
    Command::calibration(DP3)
        .option("numthreads", DP3_NUM_THREADS)
        .option("msin", msin)
        .option("msout", msout)
        .option("msout.overwrite", true)
        .option("steps", vec!["gaincal"])
        .option("gaincal.caltype", params.caltype.as_str())
        .option("gaincal.maxiter", 50)
        .option("gaincal.solint", params.solint)
        .option("gaincal.nchan", params.nchan)
        .option("gaincal.tolerance", 1e-3)
        .option("gaincal.applysolution", true)
}

/// Gain calibration against the MODEL_DATA column written by the last image.
pub fn dp3_gaincal_command(msin: &Path, msout: &Path, params: &GaincalParams) -> Command {
    dp3_gaincal_base(msin, msout, params).option("gaincal.usemodelcolumn", true)
}

/// Initial gain calibration against a sky model file instead of the model
/// column.
pub fn dp3_initial_gaincal_command(
    msin: &Path,
    msout: &Path,
    sourcedb: &Path,
    params: &GaincalParams,
) -> Command {
    dp3_gaincal_base(msin, msout, params)
        .option("gaincal.propagatesolutions", false)
        .option("gaincal.usebeammodel", true)
        .option("gaincal.usechannelfreq", true)
        .option("gaincal.sourcedb", sourcedb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::render;

    #[test]
    fn wsclean_command_renders_defaults() {
        let mut params = WscleanParams::new(
            PathBuf::from("/out"),
            PathBuf::from("/out/temp01"),
            20,
            (4096, 4096),
            "1asec",
        );
        params.weight = vec!["briggs".to_string(), "-0.5".to_string()];
        let tokens = render(&wsclean_command(Path::new("/data/in.ms"), &params)).expect("render");
        assert_eq!(
            tokens.join(" "),
            "wsclean -auto-threshold 3.0 -gridder wgridder -mgain 0.8 -name /out/temp01 \
             -niter 20 -parallel-deconvolution 2048 -scale 1asec -size 4096 4096 \
             -temp-dir /out -weight briggs -0.5 /data/in.ms"
        );
    }

    #[test]
    fn merge_command_lists_inputs() {
        let inputs = vec![PathBuf::from("/a/1.ms"), PathBuf::from("/b/2.ms")];
        let tokens = render(&dp3_merge_command(&inputs, Path::new("/out/merged.ms"))).expect("render");
        assert_eq!(
            tokens,
            vec!["DP3", "msin=[/a/1.ms,/b/2.ms]", "msout=/out/merged.ms", "steps=[]"]
        );
    }

    #[test]
    fn gaincal_uses_model_column_and_initial_uses_sourcedb() {
        let params = GaincalParams {
            caltype: "diagonal".to_string(),
            solint: 1,
            nchan: 0,
        };
        let ms = Path::new("/out/x.ms");
        let regular = render(&dp3_gaincal_command(ms, ms, &params)).expect("render");
        assert!(regular.contains(&"gaincal.usemodelcolumn=true".to_string()));
        assert!(regular.contains(&"numthreads=16".to_string()));
        assert!(regular.contains(&"steps=[gaincal]".to_string()));

        let initial = dp3_initial_gaincal_command(ms, ms, Path::new("/sky/model.txt"), &params);
        let initial = render(&initial).expect("render");
        assert!(initial.contains(&"gaincal.sourcedb=/sky/model.txt".to_string()));
        assert!(initial.contains(&"gaincal.propagatesolutions=false".to_string()));
        assert!(!initial.iter().any(|token| token.starts_with("gaincal.usemodelcolumn")));
    }
}
