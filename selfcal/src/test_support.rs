//! Test-only fixtures shared by unit and integration tests.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

use crate::core::command::Command;
use crate::io::command_file::write_command;

/// Imaging command with two measurement sets under `/path/to`.
pub fn wsclean_fixture() -> Command {
    Command::imaging("wsclean")
        .arg(Path::new("/path/to/data1.ms"))
        .arg(Path::new("/path/to/data2.ms"))
        .flag("-multiscale")
        .option("-name", "final")
        .option("-niter", 42)
        .option("-scale", "1asec")
        .option("-size", (8192, 4096))
        .option("-weight", ("briggs", -0.5))
}

/// Calibration command with list, scalar path, boolean and float options.
pub fn dp3_fixture() -> Command {
    Command::calibration("DP3")
        .option(
            "msin",
            vec![
                PathBuf::from("/path/to/input1.ms"),
                PathBuf::from("/path/to/input2.ms"),
            ],
        )
        .option("msout", PathBuf::from("/path/to/output.ms"))
        .option("steps", vec!["gaincal"])
        .option("gaincal.caltype", "scalarphase")
        .option("gaincal.solint", 50)
        .option("gaincal.tolerance", 1e-3)
        .option("gaincal.applysolution", true)
}

/// A command description written to a temporary directory.
pub struct TempCommandFile {
    dir: TempDir,
    path: PathBuf,
}

impl TempCommandFile {
    pub fn new(command: &Command) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("command.json");
        write_command(&path, command)?;
        Ok(Self { dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}
