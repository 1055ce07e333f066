//! External command execution
//!
//! Target actions never build shell strings. They describe a program and an
//! explicit argument list with [`CommandSpec`] and hand it to a
//! [`CommandRunner`], which either streams output to the console or captures
//! it. [`ProcessCommandRunner`] is the real implementation backed by
//! `std::process`.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use colored::*;

use crate::display::get_label_color;
use crate::types::{DevError, DevResult};

/// A program invocation with an explicit argument list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    label: Option<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            label: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run in `dir` instead of the runner's working directory
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Attribute buffered output to `label` (usually a fan-out item)
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn label_text(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn failure(&self, code: Option<i32>) -> DevError {
        DevError::ExternalCommand {
            program: self.program.clone(),
            args: self.args.clone(),
            code,
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// The collaborator every target action uses to reach external tools
pub trait CommandRunner: Send + Sync {
    /// Run to completion with output going to the console; nonzero exit is an error
    fn run(&self, command: &CommandSpec) -> DevResult<()>;

    /// Run to completion and return captured stdout; nonzero exit is an error
    fn read(&self, command: &CommandSpec) -> DevResult<String>;
}

/// How [`ProcessCommandRunner::run`] treats child output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Inherit the console; output appears as it is produced
    #[default]
    Stream,
    /// Capture output and print it in one block once the command finishes
    Buffered,
}

/// Runs commands as child processes rooted at the workspace
pub struct ProcessCommandRunner {
    root: PathBuf,
    output: OutputMode,
    console: Mutex<()>,
}

impl ProcessCommandRunner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output: OutputMode::default(),
            console: Mutex::new(()),
        }
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn build(&self, spec: &CommandSpec) -> Command {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        command.current_dir(spec.current_dir.as_deref().unwrap_or(&self.root));
        command
    }

    fn output_of(&self, spec: &CommandSpec, mut command: Command) -> DevResult<Output> {
        command
            .stdin(Stdio::null())
            .output()
            .map_err(|source| DevError::CommandSpawn {
                program: spec.program.clone(),
                source,
            })
    }

    /// Only labelled commands are buffered; anything else keeps the console
    fn output_mode_for(&self, spec: &CommandSpec) -> OutputMode {
        match (self.output, spec.label_text()) {
            (OutputMode::Buffered, Some(_)) => OutputMode::Buffered,
            _ => OutputMode::Stream,
        }
    }

    fn flush_buffered(&self, spec: &CommandSpec, output: &Output) {
        let _guard = self.console.lock().unwrap_or_else(PoisonError::into_inner);
        let label = spec.label_text().unwrap_or(&spec.program);
        let prefix = format!("[{}]", label).color(get_label_color(label)).to_string();

        if let Err(err) = write_block(&mut std::io::stdout().lock(), &prefix, &output.stdout) {
            tracing::warn!(command = %spec, error = %err, "could not write buffered stdout");
        }
        if let Err(err) = write_block(&mut std::io::stderr().lock(), &prefix, &output.stderr) {
            tracing::warn!(command = %spec, error = %err, "could not write buffered stderr");
        }
    }
}

/// Writes every line of `bytes` behind `prefix` with a single `write_all`
fn write_block(out: &mut impl Write, prefix: &str, bytes: &[u8]) -> std::io::Result<()> {
    let mut block = String::new();
    for line in String::from_utf8_lossy(bytes).lines() {
        block.push_str(prefix);
        block.push(' ');
        block.push_str(line);
        block.push('\n');
    }
    if block.is_empty() {
        return Ok(());
    }
    out.write_all(block.as_bytes())?;
    out.flush()
}

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, spec: &CommandSpec) -> DevResult<()> {
        tracing::debug!(command = %spec, "running");
        let started = Instant::now();
        let mut command = self.build(spec);

        let code = match self.output_mode_for(spec) {
            OutputMode::Stream => {
                let status = command.status().map_err(|source| DevError::CommandSpawn {
                    program: spec.program.clone(),
                    source,
                })?;
                (!status.success()).then(|| status.code())
            }
            OutputMode::Buffered => {
                let output = self.output_of(spec, command)?;
                self.flush_buffered(spec, &output);
                (!output.status.success()).then(|| output.status.code())
            }
        };

        tracing::debug!(command = %spec, elapsed = ?started.elapsed(), "finished");
        match code {
            Some(code) => Err(spec.failure(code)),
            None => Ok(()),
        }
    }

    fn read(&self, spec: &CommandSpec) -> DevResult<String> {
        tracing::debug!(command = %spec, "reading");
        let mut command = self.build(spec);
        command.stderr(Stdio::inherit());
        let output = self.output_of(spec, command)?;

        if !output.status.success() {
            return Err(spec.failure(output.status.code()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let spec = CommandSpec::new("dotnet")
            .arg("test")
            .args(["--collect", "XPlat Code Coverage"]);
        assert_eq!(
            spec.to_string(),
            "dotnet test --collect \"XPlat Code Coverage\""
        );
    }

    /// Keeps each `write` call as a separate chunk
    #[derive(Default)]
    struct Chunks(Vec<String>);

    impl Write for Chunks {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.push(String::from_utf8_lossy(buf).into_owned());
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn buffered_output_is_one_prefixed_block() {
        let mut out = Chunks::default();
        write_block(&mut out, "[p1]", b"line one\nline two\n").unwrap();

        assert_eq!(out.0, vec!["[p1] line one\n[p1] line two\n".to_string()]);
        assert!(out.0[0].lines().all(|line| line.starts_with("[p1] ")));
    }

    #[test]
    fn empty_output_writes_nothing() {
        let mut out = Chunks::default();
        write_block(&mut out, "[p1]", b"").unwrap();
        assert!(out.0.is_empty());
    }

    #[test]
    fn only_labelled_commands_are_buffered() {
        let runner = ProcessCommandRunner::new(".").with_output(OutputMode::Buffered);
        assert_eq!(
            runner.output_mode_for(&CommandSpec::new("dotnet").arg("build")),
            OutputMode::Stream
        );
        assert_eq!(
            runner.output_mode_for(&CommandSpec::new("dotnet").arg("test").label("Api.Tests")),
            OutputMode::Buffered
        );

        let streaming = ProcessCommandRunner::new(".");
        assert_eq!(
            streaming.output_mode_for(&CommandSpec::new("dotnet").label("Api.Tests")),
            OutputMode::Stream
        );
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessCommandRunner::new(dir.path());
        let err = runner
            .run(&CommandSpec::new("definitely-not-a-real-program-42"))
            .unwrap_err();
        assert!(matches!(err, DevError::CommandSpawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_carries_program_args_and_code() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessCommandRunner::new(dir.path());
        let err = runner
            .run(&CommandSpec::new("sh").args(["-c", "exit 3"]))
            .unwrap_err();

        match err {
            DevError::ExternalCommand {
                program,
                args,
                code,
            } => {
                assert_eq!(program, "sh");
                assert_eq!(args, vec!["-c", "exit 3"]);
                assert_eq!(code, Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn read_captures_stdout_in_workspace_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "hello").unwrap();
        let runner = ProcessCommandRunner::new(dir.path());

        let output = runner
            .read(&CommandSpec::new("cat").arg("marker.txt"))
            .unwrap();
        assert_eq!(output, "hello");
    }

    #[cfg(unix)]
    #[test]
    fn buffered_mode_still_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessCommandRunner::new(dir.path()).with_output(OutputMode::Buffered);

        runner
            .run(&CommandSpec::new("sh").args(["-c", "echo ok"]).label("p1"))
            .unwrap();
        let err = runner
            .run(&CommandSpec::new("sh").args(["-c", "echo boom >&2; exit 1"]).label("p2"))
            .unwrap_err();
        assert!(matches!(err, DevError::ExternalCommand { code: Some(1), .. }));
    }
}
