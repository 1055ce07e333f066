//! Test doubles for the command boundary

use std::sync::{Arc, Mutex};

use crate::execution::command::{CommandRunner, CommandSpec};
use crate::types::{DevError, DevResult};

/// Records every command instead of running it
#[derive(Default)]
pub struct RecordingCommandRunner {
    commands: Mutex<Vec<CommandSpec>>,
    read_output: String,
    fail_when_contains: Option<String>,
}

impl RecordingCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stdout returned by every `read`
    pub fn with_read_output(mut self, output: impl Into<String>) -> Self {
        self.read_output = output.into();
        self
    }

    /// Fail (exit code 1) any command with an argument equal to `arg`
    pub fn failing_on(mut self, arg: impl Into<String>) -> Self {
        self.fail_when_contains = Some(arg.into());
        self
    }

    pub fn commands(&self) -> Vec<CommandSpec> {
        self.commands.lock().unwrap().clone()
    }

    /// Recorded commands rendered as `program arg arg`
    pub fn command_lines(&self) -> Vec<String> {
        self.commands()
            .iter()
            .map(|spec| {
                std::iter::once(spec.program())
                    .chain(spec.arguments().iter().map(String::as_str))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    fn record(&self, spec: &CommandSpec) -> DevResult<()> {
        self.commands.lock().unwrap().push(spec.clone());
        match &self.fail_when_contains {
            Some(arg) if spec.arguments().iter().any(|a| a == arg) => {
                Err(DevError::ExternalCommand {
                    program: spec.program().to_string(),
                    args: spec.arguments().to_vec(),
                    code: Some(1),
                })
            }
            _ => Ok(()),
        }
    }
}

impl CommandRunner for RecordingCommandRunner {
    fn run(&self, command: &CommandSpec) -> DevResult<()> {
        self.record(command)
    }

    fn read(&self, command: &CommandSpec) -> DevResult<String> {
        self.record(command)?;
        Ok(self.read_output.clone())
    }
}

/// Lets a test keep a handle on a runner it boxed into a context
impl<T: CommandRunner + ?Sized> CommandRunner for Arc<T> {
    fn run(&self, command: &CommandSpec) -> DevResult<()> {
        (**self).run(command)
    }

    fn read(&self, command: &CommandSpec) -> DevResult<String> {
        (**self).read(command)
    }
}
