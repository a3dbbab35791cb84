use std::path::Path;

use jforge_core::layout::WRAPPER_SCRIPT_NAME;

use crate::builder::{run_checked, BuildError, BuildExecutor, BuildRequest, BuildResult};
use crate::process::{toolchain_env, CommandOutput, CommandRunner, CommandSpec};

/// Daemon and dependency verification both off.
pub const WRAPPER_ARGS: [&str; 4] = [
    "--no-daemon",
    "-S",
    "-Dorg.gradle.dependency.verification=off",
    "clean",
];

/// Drives the project's bundled `gradlew` script.
#[derive(Clone, Debug)]
pub struct WrapperExecutor<R> {
    runner: R,
    ambient_path: String,
}

impl<R: CommandRunner> WrapperExecutor<R> {
    pub fn new(runner: R, ambient_path: impl Into<String>) -> Self {
        Self {
            runner,
            ambient_path: ambient_path.into(),
        }
    }

    pub fn command(&self, request: &BuildRequest) -> CommandSpec {
        CommandSpec {
            program: request.source_dir.join(WRAPPER_SCRIPT_NAME),
            args: WRAPPER_ARGS.iter().map(|arg| arg.to_string()).collect(),
            current_dir: request.source_dir.clone(),
            env: toolchain_env(&self.ambient_path, None, &request.java_home),
        }
    }
}

impl<R: CommandRunner> BuildExecutor for WrapperExecutor<R> {
    fn execute(&self, request: &BuildRequest) -> BuildResult<CommandOutput> {
        let spec = self.command(request);
        make_executable(&spec.program).map_err(|source| BuildError::Io {
            path: spec.program.clone(),
            source,
        })?;
        run_checked(&self.runner, &spec)
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = std::fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    std::fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn make_executable(path: &Path) -> std::io::Result<()> {
    std::fs::metadata(path).map(|_| ())
}
