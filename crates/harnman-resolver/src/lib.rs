//! Fuzz/build/coverage command resolution for harnman.
//!
//! A stored command string may embed `$(...)` placeholders (one paren level,
//! no nesting) that are expanded at resolution time by running their content
//! through a [`CommandRunner`]. This late binding lets configs embed
//! environment-discovery calls like `$(python3-config --includes)`. It also
//! executes arbitrary shell content from the config file, so a config file is
//! as trusted as code.

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::process::Command;

use harnman_store::{ConfigStore, StoreResult};

/// Which derived command to resolve for a harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Fuzz,
    Build,
    Coverage,
}

impl CommandKind {
    /// The dotted field path this kind reads from a harness configuration.
    pub fn field_path(&self) -> &'static str {
        match self {
            CommandKind::Fuzz => "fuzz.fuzz_cmd",
            CommandKind::Build => "build.build_cmd",
            CommandKind::Coverage => "coverage.coverage_cmd",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Fuzz => write!(f, "fuzz"),
            CommandKind::Build => write!(f, "build"),
            CommandKind::Coverage => write!(f, "coverage"),
        }
    }
}

/// Error from running a substitution command.
#[derive(Debug, Clone)]
pub struct RunnerError {
    pub message: String,
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

impl std::error::Error for RunnerError {}

/// Executes substitution commands.
///
/// Injectable so tests can supply a fake; production uses [`ShellRunner`].
pub trait CommandRunner {
    /// Runs `command` and returns its stdout. A spawn failure or a non-zero
    /// exit is an error.
    fn run(&self, command: &str) -> Result<String, RunnerError>;
}

/// Runs substitution commands through `sh -c`, blocking until they exit.
///
/// No timeout is imposed; a hung command hangs the resolution.
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<String, RunnerError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .map_err(|e| RunnerError {
                message: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(RunnerError {
                message: format!("command exited with {}", output.status),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Resolves the fuzz/build/coverage command strings stored per harness.
pub struct CommandResolver<'a> {
    store: &'a ConfigStore,
    runner: &'a dyn CommandRunner,
}

impl<'a> CommandResolver<'a> {
    pub fn new(store: &'a ConfigStore, runner: &'a dyn CommandRunner) -> Self {
        Self { store, runner }
    }

    /// All harness names known to the store, sorted.
    ///
    /// A missing configuration directory propagates as an error rather than
    /// masquerading as an empty list.
    pub fn names(&self) -> StoreResult<Vec<String>> {
        self.store.list()
    }

    /// The stored command string, without substitution expansion.
    ///
    /// A missing document or field propagates as the store's error; there is
    /// no empty-string fallback. A non-string stored value is rendered as
    /// compact JSON.
    pub fn raw_command(&self, name: &str, kind: CommandKind) -> StoreResult<String> {
        let value = self.store.read_field(name, kind.field_path())?;
        Ok(render_command(&value))
    }

    /// The stored command string with `$(...)` placeholders expanded.
    pub fn command(&self, name: &str, kind: CommandKind) -> StoreResult<String> {
        let raw = self.raw_command(name, kind)?;
        Ok(self.expand(&raw))
    }

    /// Expands each `$(...)` occurrence by running its content.
    ///
    /// Results are trimmed of surrounding whitespace before splicing. A failed
    /// substitution becomes the empty string and a diagnostic goes to stderr;
    /// remaining occurrences still expand. Nested parentheses are not
    /// supported.
    pub fn expand(&self, command: &str) -> String {
        let pattern = Regex::new(r"\$\(([^()]*)\)").unwrap();
        let mut expanded = String::with_capacity(command.len());
        let mut tail = 0;
        for caps in pattern.captures_iter(command) {
            let whole = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            let inner = caps.get(1).map_or("", |m| m.as_str());
            expanded.push_str(&command[tail..whole.start()]);
            match self.runner.run(inner) {
                Ok(stdout) => expanded.push_str(stdout.trim()),
                Err(err) => {
                    eprintln!("warning: substitution '$({})' failed: {}", inner, err);
                }
            }
            tail = whole.end();
        }
        expanded.push_str(&command[tail..]);
        expanded
    }
}

fn render_command(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
