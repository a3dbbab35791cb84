use std::path::PathBuf;

use crate::process::{CommandOutput, CommandRunner, CommandSpec};

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug)]
pub enum BuildError {
    /// Registry miss, or an install path or launcher absent on disk.
    ToolchainMissing { message: String },
    MissingSource { path: PathBuf },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },
    Exited {
        program: PathBuf,
        output: CommandOutput,
    },
}

impl BuildError {
    pub fn toolchain_missing(message: impl Into<String>) -> Self {
        BuildError::ToolchainMissing {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::ToolchainMissing { message } => write!(f, "toolchain missing: {}", message),
            BuildError::MissingSource { path } => {
                write!(f, "project sources not found at '{}'", path.display())
            }
            BuildError::Io { path, source } => {
                write!(f, "failed to prepare '{}': {}", path.display(), source)
            }
            BuildError::Spawn { program, source } => {
                write!(f, "failed to launch '{}': {}", program.display(), source)
            }
            BuildError::Exited { program, output } => match output.code {
                Some(code) => write!(f, "'{}' exited with status {}", program.display(), code),
                None => write!(f, "'{}' was terminated by a signal", program.display()),
            },
        }
    }
}

impl std::error::Error for BuildError {}

/// A checked build invocation: every path here was resolved and found on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildRequest {
    pub project_slug: String,
    pub source_dir: PathBuf,
    pub java_home: PathBuf,
    /// Maven or Gradle install root; `None` for the wrapper script.
    pub tool_home: Option<PathBuf>,
}

pub trait BuildExecutor {
    fn execute(&self, request: &BuildRequest) -> BuildResult<CommandOutput>;
}

/// Runs `spec` to completion; a non-zero exit becomes [`BuildError::Exited`].
pub(crate) fn run_checked<R: CommandRunner>(
    runner: &R,
    spec: &CommandSpec,
) -> BuildResult<CommandOutput> {
    let output = runner.run(spec).map_err(|source| BuildError::Spawn {
        program: spec.program.clone(),
        source,
    })?;
    if !output.success() {
        return Err(BuildError::Exited {
            program: spec.program.clone(),
            output,
        });
    }
    Ok(output)
}
