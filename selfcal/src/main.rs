//! Render WSClean / DP3 command lines for bare metal, Singularity, or mpirun.
//!
//! Environment settings come from `selfcal.toml` (see `io::config`), the
//! SLURM allocation, and command-line overrides, in increasing precedence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use selfcal::core::selfcal::SelfcalParams;
use selfcal::environment::{Environment, Overrides, resolve_environment};
use selfcal::exit_codes;
use selfcal::io::config::{DEFAULT_CONFIG_FILE, SelfcalConfig, load_config, write_config};
use selfcal::io::slurm::SlurmResources;
use selfcal::logging;
use selfcal::plan::{render_file, render_plan, shell_line};

#[derive(Parser)]
#[command(
    name = "selfcal",
    version,
    about = "Build self-calibration tool command lines for any execution environment"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a JSON command description with the environment's modifiers.
    Render {
        /// Path to the command description (JSON).
        file: PathBuf,
        #[command(flatten)]
        env: EnvArgs,
        /// Print argv as a JSON array instead of a shell-quoted line.
        #[arg(long)]
        json: bool,
    },
    /// Print every command of a self-calibration run without running it.
    Plan(PlanArgs),
    /// Write a default config file.
    InitConfig {
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args)]
struct EnvArgs {
    /// Config file; missing file means defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Singularity image to run the tools in (overrides config).
    #[arg(long)]
    image: Option<PathBuf>,
    /// Number of nodes for distributed imaging (overrides config and SLURM).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    nodes: Option<u32>,
}

#[derive(Args)]
struct PlanArgs {
    /// Input measurement sets.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Directory where all outputs are written.
    #[arg(long)]
    outdir: PathBuf,
    /// Image size in pixels: WIDTH HEIGHT.
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    size: Vec<u32>,
    /// Pixel scale, e.g. `1asec` or `0.01deg`.
    #[arg(long)]
    scale: String,
    /// Weighting mode: `natural`, `uniform` or `briggs <robustness>`.
    #[arg(long, default_value = "uniform", allow_hyphen_values = true)]
    weight: String,
    /// Sky model for an initial calibration before the first cycle.
    #[arg(long)]
    initial_sky_model: Option<PathBuf>,
    #[arg(long, default_value_t = 1)]
    gaincal_solint: u32,
    #[arg(long, default_value_t = 0)]
    gaincal_nchan: u32,
    /// Clean iterations per cycle (comma separated).
    #[arg(long, value_delimiter = ',', default_values_t = [20, 100, 500])]
    clean_iters: Vec<u32>,
    /// Skip self-calibration cycles and only make the final image.
    #[arg(long)]
    final_only: bool,
    #[arg(long, default_value_t = 100_000)]
    final_clean_iters: u32,
    /// Zero-based cycles with phase-only calibration (comma separated).
    #[arg(long, value_delimiter = ',', default_values_t = [0])]
    phase_only_cycles: Vec<usize>,
    /// Use full diagonal calibration in every cycle.
    #[arg(long, conflicts_with = "phase_only_cycles")]
    no_phase_only: bool,
    #[command(flatten)]
    env: EnvArgs,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Render { file, env, json } => cmd_render(&file, &env, json),
        Command::Plan(args) => cmd_plan(&args),
        Command::InitConfig { config, force } => cmd_init_config(&config, force),
    }
}

fn cmd_render(file: &Path, args: &EnvArgs, json: bool) -> Result<()> {
    let env = load_environment(args)?;
    let argv = render_file(file, &env)?;
    if json {
        println!("{}", serde_json::to_string(&argv).context("serialize argv")?);
    } else {
        println!("{}", shell_line(&argv)?);
    }
    Ok(())
}

fn cmd_plan(args: &PlanArgs) -> Result<()> {
    let [width, height] = args.size[..] else {
        bail!("--size takes exactly two values: WIDTH HEIGHT");
    };
    let env = load_environment(&args.env)?;
    let params = SelfcalParams {
        outdir: args.outdir.clone(),
        size: (width, height),
        scale: args.scale.clone(),
        weight: args.weight.clone(),
        initial_sky_model: args.initial_sky_model.clone(),
        gaincal_solint: args.gaincal_solint,
        gaincal_nchan: args.gaincal_nchan,
        clean_iters: if args.final_only {
            Vec::new()
        } else {
            args.clean_iters.clone()
        },
        final_clean_iters: args.final_clean_iters,
        phase_only_cycles: if args.no_phase_only {
            Vec::new()
        } else {
            args.phase_only_cycles.clone()
        },
    };
    for step in render_plan(&args.inputs, &params, &env)? {
        println!("# {}", step.label);
        println!("{}", shell_line(&step.argv)?);
    }
    Ok(())
}

fn cmd_init_config(path: &Path, force: bool) -> Result<()> {
    if !force && path.exists() {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &SelfcalConfig::default())
}

fn load_environment(args: &EnvArgs) -> Result<Environment> {
    let cfg = load_config(&args.config)?;
    let slurm = SlurmResources::from_env().context("read SLURM environment")?;
    slurm.log_resources();
    let working_dir = std::env::current_dir().context("resolve working directory")?;
    let overrides = Overrides {
        singularity_image: args.image.clone(),
        num_nodes: args.nodes,
    };
    Ok(resolve_environment(&cfg, &overrides, &slurm, &working_dir))
}
