//! Distribution: run an imaging command across several nodes with `mpirun`.

use crate::core::command::{Command, Syntax};
use crate::core::modifier::Modifier;

const DISTRIBUTED_SUFFIX: &str = "-mp";

/// Modifier that turns `wsclean` into `mpirun ... wsclean-mp`, one output
/// channel per node.
///
/// Only imaging-style commands support distributed channel processing; any
/// other command, or a node count of one or less, passes through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mpirun {
    num_nodes: u32,
}

impl Mpirun {
    pub fn new(num_nodes: u32) -> Self {
        Self { num_nodes }
    }

    pub fn num_nodes(&self) -> u32 {
        self.num_nodes
    }
}

impl Modifier for Mpirun {
    fn order(&self) -> i32 {
        0
    }

    fn apply(&self, command: &Command) -> (Vec<String>, Command) {
        if self.num_nodes <= 1 || command.syntax() != Syntax::Imaging {
            return (Vec::new(), command.clone());
        }

        let executable = if command.executable().ends_with(DISTRIBUTED_SUFFIX) {
            command.executable().to_string()
        } else {
            format!("{}{DISTRIBUTED_SUFFIX}", command.executable())
        };
        let rewritten = command
            .clone()
            .with_executable(executable)
            .option("-channels-out", self.num_nodes)
            .option("-deconvolution-channels", 1)
            .option("-fit-spectral-pol", 1)
            .flag("-join-channels");

        let prefix = vec![
            "mpirun".to_string(),
            "-np".to_string(),
            self.num_nodes.to_string(),
            "-npernode".to_string(),
            "1".to_string(),
        ];
        (prefix, rewritten)
    }

    fn name(&self) -> &'static str {
        "mpirun"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::render;
    use crate::test_support::{dp3_fixture, wsclean_fixture};

    #[test]
    fn single_node_is_a_no_op() {
        let cmd = wsclean_fixture();
        let (prefix, rewritten) = Mpirun::new(1).apply(&cmd);
        assert!(prefix.is_empty());
        assert_eq!(rewritten, cmd);

        let (prefix, rewritten) = Mpirun::new(0).apply(&cmd);
        assert!(prefix.is_empty());
        assert_eq!(rewritten, cmd);
    }

    #[test]
    fn calibration_command_is_a_no_op() {
        let cmd = dp3_fixture();
        let (prefix, rewritten) = Mpirun::new(8).apply(&cmd);
        assert!(prefix.is_empty());
        assert_eq!(rewritten, cmd);
    }

    #[test]
    fn imaging_command_is_distributed() {
        let cmd = Command::imaging("wsclean")
            .option("-channels-out", 2)
            .arg(std::path::Path::new("/data/a.ms"));
        let (prefix, rewritten) = Mpirun::new(4).apply(&cmd);
        assert_eq!(prefix, vec!["mpirun", "-np", "4", "-npernode", "1"]);
        assert_eq!(
            render(&rewritten).expect("render").join(" "),
            "wsclean-mp -join-channels -channels-out 4 -deconvolution-channels 1 \
             -fit-spectral-pol 1 /data/a.ms"
        );
    }

    #[test]
    fn already_distributed_executable_keeps_its_name() {
        let cmd = Command::imaging("wsclean-mp");
        let (_, rewritten) = Mpirun::new(2).apply(&cmd);
        assert_eq!(rewritten.executable(), "wsclean-mp");
    }
}
