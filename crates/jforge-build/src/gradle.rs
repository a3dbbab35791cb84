use crate::builder::{run_checked, BuildError, BuildExecutor, BuildRequest, BuildResult};
use crate::process::{toolchain_env, CommandOutput, CommandRunner, CommandSpec};

pub const GRADLE_ARGS: [&str; 2] = ["build", "--parallel"];

#[derive(Clone, Debug)]
pub struct GradleExecutor<R> {
    runner: R,
    ambient_path: String,
}

impl<R: CommandRunner> GradleExecutor<R> {
    pub fn new(runner: R, ambient_path: impl Into<String>) -> Self {
        Self {
            runner,
            ambient_path: ambient_path.into(),
        }
    }

    pub fn command(&self, request: &BuildRequest) -> BuildResult<CommandSpec> {
        let gradle_home = request
            .tool_home
            .as_ref()
            .ok_or_else(|| BuildError::toolchain_missing("gradle install not resolved"))?;
        let bin = gradle_home.join("bin");
        Ok(CommandSpec {
            program: bin.join("gradle"),
            args: GRADLE_ARGS.iter().map(|arg| arg.to_string()).collect(),
            current_dir: request.source_dir.clone(),
            env: toolchain_env(&self.ambient_path, Some(&bin), &request.java_home),
        })
    }
}

impl<R: CommandRunner> BuildExecutor for GradleExecutor<R> {
    fn execute(&self, request: &BuildRequest) -> BuildResult<CommandOutput> {
        let spec = self.command(request)?;
        run_checked(&self.runner, &spec)
    }
}
