//! CLI command execution helpers with automatic timing
//!
//! Wraps the `deathlink-counter` binary. Every command runs with its config
//! directory pointed at a scratch directory so the user's own config is
//! never read or written.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::io::Write;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// CLI command builder with timing
pub struct CounterCommand {
    binary_path: PathBuf,
    config_home: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
}

impl CounterCommand {
    /// Create a new command using `config_home` as the config directory
    pub fn new(config_home: impl AsRef<Path>) -> Self {
        Self {
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_deathlink-counter")),
            config_home: config_home.as_ref().to_path_buf(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary_path);
        command
            .args(&self.args)
            .env("XDG_CONFIG_HOME", &self.config_home)
            .env_remove("RUST_LOG")
            .envs(&self.env);
        command
    }

    /// Execute command and return result with timing
    pub fn execute(&self) -> Result<CommandResult> {
        let start = Instant::now();

        let output = self
            .command()
            .stdin(Stdio::null())
            .output()
            .context("Failed to execute command")?;

        Ok(CommandResult::from_output(output, start))
    }

    /// Start the command with console input on a pipe
    pub fn spawn(&self) -> Result<RunningCommand> {
        let child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn command")?;

        Ok(RunningCommand {
            child,
            start: Instant::now(),
        })
    }

    /// Execute and assert success
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStdout: {}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stdout,
                result.stderr
            );
        }

        Ok(result)
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }

        Ok(result)
    }
}

/// A command still running, fed through its stdin
pub struct RunningCommand {
    child: Child,
    start: Instant,
}

impl RunningCommand {
    /// Type one console line
    pub fn send_line(&mut self, line: &str) -> Result<()> {
        let stdin = self.child.stdin.as_mut().context("stdin already closed")?;
        writeln!(stdin, "{}", line)?;
        stdin.flush()?;
        Ok(())
    }

    /// Close stdin and wait for the process to exit
    pub fn wait(self) -> Result<CommandResult> {
        let output = self
            .child
            .wait_with_output()
            .context("Failed to wait for command")?;
        Ok(CommandResult::from_output(output, self.start))
    }
}

/// Command execution result with timing
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandResult {
    fn from_output(output: std::process::Output, start: Instant) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: start.elapsed(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn contains_stdout(&self, text: &str) -> bool {
        self.stdout.contains(text)
    }

    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }
}

/// Build a command against a scratch config directory
///
/// ```ignore
/// counter!(dir, "config", "--example").assert_success()?;
/// ```
#[macro_export]
macro_rules! counter {
    ($dir:expr, $($arg:expr),*) => {{
        let mut cmd = $crate::common::cli::CounterCommand::new($dir);
        cmd.args(&[$($arg),*]);
        cmd
    }};
}
