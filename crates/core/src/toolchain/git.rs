use crate::execution::command::{CommandRunner, CommandSpec};
use crate::types::DevResult;

/// Full hash of the checked-out commit
pub fn commit_id(commands: &dyn CommandRunner) -> DevResult<String> {
    let output = commands.read(&CommandSpec::new("git").args(["rev-parse", "HEAD"]))?;
    Ok(output.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::testing::RecordingCommandRunner;

    #[test]
    fn commit_id_strips_trailing_newline() {
        let runner = RecordingCommandRunner::new().with_read_output("4f2a9c1\n");
        assert_eq!(commit_id(&runner).unwrap(), "4f2a9c1");
        assert_eq!(runner.command_lines(), vec!["git rev-parse HEAD"]);
    }
}
