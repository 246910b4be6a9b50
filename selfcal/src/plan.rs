//! Orchestration for `selfcal render` and `selfcal plan`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::command::Command;
use crate::core::modifier::render_with_modifiers;
use crate::core::selfcal::{SelfcalParams, selfcal_plan};
use crate::environment::Environment;
use crate::io::command_file::load_command;

/// A fully modified command line ready to hand to a process launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStep {
    pub label: String,
    pub argv: Vec<String>,
}

/// Render one command in the given environment.
pub fn render_in_environment(command: &Command, env: &Environment) -> Result<Vec<String>> {
    let argv = render_with_modifiers(command, &env.modifiers())
        .with_context(|| format!("render {} command", command.executable()))?;
    Ok(argv)
}

/// Load a command description file and render it.
pub fn render_file(path: &Path, env: &Environment) -> Result<Vec<String>> {
    let command = load_command(path)?;
    render_in_environment(&command, env)
}

/// Render every step of the self-calibration plan.
pub fn render_plan(
    inputs: &[PathBuf],
    params: &SelfcalParams,
    env: &Environment,
) -> Result<Vec<RenderedStep>> {
    selfcal_plan(inputs, params)
        .into_iter()
        .map(|step| -> Result<RenderedStep> {
            let argv = render_in_environment(&step.command, env)
                .with_context(|| format!("step '{}'", step.label))?;
            Ok(RenderedStep {
                label: step.label,
                argv,
            })
        })
        .collect()
}

/// Join argv into a single POSIX-shell-quoted line.
pub fn shell_line(argv: &[String]) -> Result<String> {
    shlex::try_join(argv.iter().map(String::as_str)).context("quote command line")
}
