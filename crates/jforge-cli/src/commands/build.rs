use jforge_build::{
    CommandRunner, Resolution, ResolveOptions, ResolveRequest, Resolver, SystemRunner,
    ToolchainAttemptExecutor,
};
use jforge_core::attempt::OverrideRequest;
use jforge_core::config::Settings;

use crate::commands::load_registry;

pub struct BuildArgs {
    pub settings: Settings,
    pub project_slug: String,
    pub try_all: bool,
    pub pinned: OverrideRequest,
    pub options: ResolveOptions,
}

pub fn run(args: BuildArgs) -> Result<Resolution, String> {
    run_with_runner(args, SystemRunner::new())
}

pub fn run_with_runner<R: CommandRunner>(args: BuildArgs, runner: R) -> Result<Resolution, String> {
    let registry = load_registry(&args.settings)?;
    let layout = args.settings.layout();
    let executor = ToolchainAttemptExecutor::with_runner(&registry, layout.clone(), runner);
    let resolver = Resolver::new(executor, &registry, &layout).with_options(args.options);
    resolver
        .resolve(&ResolveRequest {
            project_slug: args.project_slug,
            try_all: args.try_all,
            pinned: args.pinned,
        })
        .map_err(|err| err.to_string())
}

/// `key=value` lines for stdout, in the order they should be printed.
pub fn summary(project_slug: &str, resolution: &Resolution) -> Vec<String> {
    let mut lines = vec![format!("project={}", project_slug)];
    match resolution {
        Resolution::AlreadyBuilt => lines.push("status=already-built".to_string()),
        Resolution::Built {
            attempt,
            source,
            tried,
        } => {
            lines.push("status=built".to_string());
            lines.push(format!("configuration={}", attempt));
            lines.push(format!("source={}", source));
            lines.push(format!("attempts={}", tried.len()));
        }
        Resolution::Exhausted { tried } => {
            lines.push("status=failed".to_string());
            lines.push(format!("attempts={}", tried.len()));
        }
    }
    lines
}
