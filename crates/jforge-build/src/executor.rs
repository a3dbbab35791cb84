use std::path::PathBuf;

use jforge_core::attempt::{Attempt, AttemptOutcome, BuildTool};
use jforge_core::layout::{DataLayout, WRAPPER_SCRIPT_NAME};
use jforge_core::toolchain::{ToolchainCategory, ToolchainRegistry};
use jforge_store::{BuiltMarkers, StoreError};

use crate::builder::{BuildError, BuildExecutor, BuildRequest, BuildResult};
use crate::gradle::GradleExecutor;
use crate::maven::MavenExecutor;
use crate::process::{ambient_path, CommandOutput, CommandRunner, SystemRunner};
use crate::wrapper::WrapperExecutor;

/// Runs one attempt against one project.
///
/// Build failures of any kind come back as [`AttemptOutcome::Failed`]; only
/// errors persisting the outcome are returned as `Err`.
pub trait AttemptExecutor {
    fn execute(&self, project_slug: &str, attempt: &Attempt) -> Result<AttemptOutcome, StoreError>;
}

/// Resolves an attempt through the registry and drives the matching tool.
pub struct ToolchainAttemptExecutor<'a, R = SystemRunner> {
    registry: &'a ToolchainRegistry,
    layout: DataLayout,
    markers: BuiltMarkers,
    runner: R,
    ambient_path: String,
}

impl<'a> ToolchainAttemptExecutor<'a, SystemRunner> {
    pub fn new(registry: &'a ToolchainRegistry, layout: DataLayout) -> Self {
        Self::with_runner(registry, layout, SystemRunner::new())
    }
}

impl<'a, R: CommandRunner> ToolchainAttemptExecutor<'a, R> {
    pub fn with_runner(registry: &'a ToolchainRegistry, layout: DataLayout, runner: R) -> Self {
        Self {
            registry,
            markers: BuiltMarkers::new(layout.clone()),
            layout,
            runner,
            ambient_path: ambient_path(),
        }
    }

    pub fn with_ambient_path(mut self, ambient_path: impl Into<String>) -> Self {
        self.ambient_path = ambient_path.into();
        self
    }

    /// Checks every precondition without spawning anything.
    pub fn prepare(&self, project_slug: &str, attempt: &Attempt) -> BuildResult<BuildRequest> {
        let source_dir = self.layout.source_dir(project_slug);
        if !source_dir.is_dir() {
            return Err(BuildError::MissingSource { path: source_dir });
        }
        let java_home = self.installed(ToolchainCategory::Jdk, &attempt.jdk)?;
        let tool_home = match &attempt.tool {
            BuildTool::Maven(version) => Some(self.installed(ToolchainCategory::Maven, version)?),
            BuildTool::Gradle(version) => Some(self.installed(ToolchainCategory::Gradle, version)?),
            BuildTool::Wrapper => {
                let script = source_dir.join(WRAPPER_SCRIPT_NAME);
                if !script.is_file() {
                    return Err(BuildError::toolchain_missing(format!(
                        "no {} script at '{}'",
                        WRAPPER_SCRIPT_NAME,
                        script.display()
                    )));
                }
                None
            }
        };
        Ok(BuildRequest {
            project_slug: project_slug.to_string(),
            source_dir,
            java_home,
            tool_home,
        })
    }

    fn installed(&self, category: ToolchainCategory, version: &str) -> BuildResult<PathBuf> {
        let home = self.registry.resolve(category, version).ok_or_else(|| {
            BuildError::toolchain_missing(format!("{} {} is not registered", category, version))
        })?;
        if !home.exists() {
            return Err(BuildError::toolchain_missing(format!(
                "{} {} install '{}' does not exist",
                category,
                version,
                home.display()
            )));
        }
        let launcher = home.join("bin").join(category.binary_name());
        if !launcher.exists() {
            return Err(BuildError::toolchain_missing(format!(
                "{} {} has no launcher at '{}'",
                category,
                version,
                launcher.display()
            )));
        }
        Ok(home.to_path_buf())
    }

    fn build(&self, request: &BuildRequest, tool: &BuildTool) -> BuildResult<CommandOutput> {
        let ambient = self.ambient_path.as_str();
        match tool {
            BuildTool::Maven(_) => MavenExecutor::new(&self.runner, ambient).execute(request),
            BuildTool::Gradle(_) => GradleExecutor::new(&self.runner, ambient).execute(request),
            BuildTool::Wrapper => WrapperExecutor::new(&self.runner, ambient).execute(request),
        }
    }
}

impl<'a, R: CommandRunner> AttemptExecutor for ToolchainAttemptExecutor<'a, R> {
    fn execute(&self, project_slug: &str, attempt: &Attempt) -> Result<AttemptOutcome, StoreError> {
        if self.markers.is_built(project_slug) {
            tracing::info!(project = project_slug, "already built");
            return Ok(AttemptOutcome::AlreadyBuilt);
        }

        tracing::info!(project = project_slug, %attempt, "building");
        let result = self
            .prepare(project_slug, attempt)
            .and_then(|request| self.build(&request, &attempt.tool));
        match result {
            Ok(output) => {
                log_output(&output, false);
                let marker = self.markers.write(project_slug, attempt)?;
                tracing::info!(
                    project = project_slug,
                    %attempt,
                    marker = %marker.display(),
                    "build succeeded"
                );
                Ok(AttemptOutcome::NewlyBuilt)
            }
            Err(BuildError::Exited { program, output }) => {
                tracing::warn!(
                    project = project_slug,
                    %attempt,
                    program = %program.display(),
                    code = ?output.code,
                    "build failed"
                );
                log_output(&output, true);
                Ok(AttemptOutcome::Failed)
            }
            Err(error) => {
                tracing::warn!(project = project_slug, %attempt, %error, "attempt skipped");
                Ok(AttemptOutcome::Failed)
            }
        }
    }
}

fn log_output(output: &CommandOutput, failed: bool) {
    if failed {
        tracing::warn!(stream = "stdout", "{}", output.stdout);
        tracing::warn!(stream = "stderr", "{}", output.stderr);
    } else {
        tracing::debug!(stream = "stdout", "{}", output.stdout);
        tracing::debug!(stream = "stderr", "{}", output.stderr);
    }
}
