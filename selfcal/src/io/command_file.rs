//! JSON command description files.
//!
//! ```json
//! {
//!   "syntax": "calibration",
//!   "executable": "DP3",
//!   "options": { "msin": [{"path": "/a.ms"}], "msout": {"path": "/out.ms"} }
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::command::Command;

pub fn load_command(path: &Path) -> Result<Command> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read command file {}", path.display()))?;
    let command =
        serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    Ok(command)
}

/// Serialize `command` to pretty-printed JSON with trailing newline.
pub fn write_command(path: &Path, command: &Command) -> Result<()> {
    let mut payload = serde_json::to_string_pretty(command).context("serialize command json")?;
    payload.push('\n');
    fs::write(path, payload).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
