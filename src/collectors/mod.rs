pub mod docker;
pub mod kubernetes;
pub mod systemd;

use crate::config::ToolsConfig;
use crate::state::{DockerProject, KubernetesConfig, SystemdService};
use std::fmt;
use std::io;
use std::process::Command;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs an external program to completion. Every collector goes through this
/// so tests can substitute canned outputs.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CollectError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CollectError> {
        debug!(program, ?args, "running command");
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => CollectError::NotInstalled {
                    program: program.to_string(),
                },
                _ => CollectError::Spawn {
                    program: program.to_string(),
                    source,
                },
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("{program} is not installed or not in PATH")]
    NotInstalled { program: String },
    #[error("failed to start {program}: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("`{command}` exited with {status}: {detail}")]
    Failed {
        command: String,
        status: String,
        detail: String,
    },
    #[error("failed to parse {what}: {source}")]
    Json {
        what: String,
        source: serde_json::Error,
    },
    #[error("{0}")]
    Unavailable(String),
}

impl CollectError {
    fn failed(program: &str, args: &[&str], output: &CommandOutput) -> Self {
        let detail = if output.stderr.trim().is_empty() {
            output.stdout.trim()
        } else {
            output.stderr.trim()
        };
        CollectError::Failed {
            command: command_line(program, args),
            status: output
                .code
                .map(|c| format!("status {c}"))
                .unwrap_or_else(|| "signal".to_string()),
            detail: if detail.is_empty() {
                "no output".to_string()
            } else {
                detail.to_string()
            },
        }
    }
}

pub fn run_checked(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&str],
) -> Result<String, CollectError> {
    let output = runner.run(program, args)?;
    if !output.success {
        return Err(CollectError::failed(program, args, &output));
    }
    Ok(output.stdout)
}

pub fn run_combined(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&str],
) -> Result<String, CollectError> {
    let output = runner.run(program, args)?;
    if !output.success {
        return Err(CollectError::failed(program, args, &output));
    }
    let mut text = output.stdout;
    text.push_str(&output.stderr);
    Ok(text)
}

pub fn command_line(program: &str, args: &[&str]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Docker,
    Kubernetes,
    Systemd,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Docker => f.write_str("docker"),
            Source::Kubernetes => f.write_str("kubernetes"),
            Source::Systemd => f.write_str("systemd"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectWarning {
    pub source: Source,
    pub scope: String,
    pub message: String,
}

impl CollectWarning {
    pub fn new(source: Source, scope: impl Into<String>, err: &CollectError) -> Self {
        Self {
            source,
            scope: scope.into(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for CollectWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope.is_empty() {
            write!(f, "[{}] {}", self.source, self.message)
        } else {
            write!(f, "[{}] {}: {}", self.source, self.scope, self.message)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collected<T> {
    pub items: Vec<T>,
    pub warnings: Vec<CollectWarning>,
}

impl<T> Collected<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn unavailable(source: Source, err: &CollectError) -> Self {
        Self {
            items: Vec::new(),
            warnings: vec![CollectWarning::new(source, "", err)],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Docker,
    Kubernetes,
    Systemd,
}

impl Scope {
    fn includes(self, source: Source) -> bool {
        match self {
            Scope::All => true,
            Scope::Docker => source == Source::Docker,
            Scope::Kubernetes => source == Source::Kubernetes,
            Scope::Systemd => source == Source::Systemd,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSnapshot {
    pub docker_projects: Vec<DockerProject>,
    pub kubernetes_configs: Vec<KubernetesConfig>,
    pub systemd_services: Vec<SystemdService>,
    pub warnings: Vec<CollectWarning>,
}

pub fn collect_resources(
    runner: &dyn CommandRunner,
    tools: &ToolsConfig,
    scope: Scope,
) -> ResourceSnapshot {
    let mut warnings = Vec::new();

    let docker = if scope.includes(Source::Docker) {
        docker::collect_projects(runner, tools)
    } else {
        Collected::empty()
    };
    warnings.extend(docker.warnings);

    let kubernetes = if scope.includes(Source::Kubernetes) {
        kubernetes::collect_configs(runner, tools)
    } else {
        Collected::empty()
    };
    warnings.extend(kubernetes.warnings);

    let systemd = if scope.includes(Source::Systemd) {
        systemd::collect_services(runner, tools)
    } else {
        Collected::empty()
    };
    warnings.extend(systemd.warnings);

    debug!(
        docker_projects = docker.items.len(),
        kubernetes_configs = kubernetes.items.len(),
        systemd_services = systemd.items.len(),
        warnings = warnings.len(),
        "resource collection finished"
    );

    ResourceSnapshot {
        docker_projects: docker.items,
        kubernetes_configs: kubernetes.items,
        systemd_services: systemd.items,
        warnings,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{command_line, CollectError, CommandOutput, CommandRunner};
    use std::cell::RefCell;
    use std::collections::HashMap;

    enum Reply {
        Output(CommandOutput),
        Missing,
    }

    #[derive(Default)]
    pub struct ScriptedRunner {
        replies: HashMap<String, Reply>,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn ok(mut self, line: &str, stdout: &str) -> Self {
            self.replies.insert(
                line.to_string(),
                Reply::Output(CommandOutput {
                    success: true,
                    code: Some(0),
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                }),
            );
            self
        }

        pub fn fail(mut self, line: &str, stderr: &str) -> Self {
            self.replies.insert(
                line.to_string(),
                Reply::Output(CommandOutput {
                    success: false,
                    code: Some(1),
                    stdout: String::new(),
                    stderr: stderr.to_string(),
                }),
            );
            self
        }

        pub fn reply(mut self, line: &str, output: CommandOutput) -> Self {
            self.replies.insert(line.to_string(), Reply::Output(output));
            self
        }

        pub fn missing(mut self, line: &str) -> Self {
            self.replies.insert(line.to_string(), Reply::Missing);
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CollectError> {
            let line = command_line(program, args);
            self.calls.borrow_mut().push(line.clone());
            match self.replies.get(&line) {
                Some(Reply::Output(out)) => Ok(out.clone()),
                Some(Reply::Missing) | None => Err(CollectError::NotInstalled {
                    program: program.to_string(),
                }),
            }
        }
    }
}
