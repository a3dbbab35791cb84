use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use jforge_build::ResolveOptions;
use jforge_cli::{commands, logging};
use jforge_core::attempt::OverrideRequest;
use jforge_core::config::{Settings, SettingsOverrides};

#[derive(Parser)]
#[command(name = "jforge", version, about = "Find a JDK and build tool that compile a Java project")]
struct Cli {
    /// Data directory holding project-sources/ and build-info/.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Toolchain registry JSON file.
    #[arg(long, global = true)]
    toolchains: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG is set.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a project, searching for a working toolchain if needed.
    Build(BuildCommand),
    /// Print the recorded build state of a project.
    Show {
        /// Project directory name under project-sources/.
        project_slug: String,
    },
    /// List registered JDK, Maven, and Gradle installs.
    Versions,
}

#[derive(Args)]
struct BuildCommand {
    /// Project directory name under project-sources/.
    project_slug: String,
    /// Ignore remembered configurations and run the full candidate list.
    #[arg(long)]
    try_all: bool,
    /// Pin the JDK version.
    #[arg(long)]
    jdk: Option<String>,
    /// Pin a Maven version.
    #[arg(long)]
    mvn: Option<String>,
    /// Pin a Gradle version.
    #[arg(long)]
    gradle: Option<String>,
    /// Use the project's own gradlew script.
    #[arg(long)]
    gradlew: bool,
    /// Leave the global ledger untouched.
    #[arg(long)]
    no_global: bool,
    /// Do not record failed attempts in the local ledger.
    #[arg(long)]
    no_failure_log: bool,
}

fn main() {
    if let Err(message) = run_cli() {
        let _ = exit_with_error(&message);
    }
}

fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    logging::install(cli.verbose);

    let working_dir = std::env::current_dir()
        .map_err(|err| format!("failed to read current directory: {}", err))?;
    let settings = Settings::resolve(
        SettingsOverrides {
            data_dir: cli.data_dir,
            toolchains: cli.toolchains,
        },
        &working_dir,
    )
    .map_err(|err| err.to_string())?;

    match cli.command {
        Command::Build(build) => {
            let project_slug = build.project_slug.clone();
            let resolution = commands::build::run(commands::build::BuildArgs {
                settings,
                project_slug: build.project_slug,
                try_all: build.try_all,
                pinned: OverrideRequest {
                    jdk: build.jdk,
                    mvn: build.mvn,
                    gradle: build.gradle,
                    gradlew: build.gradlew,
                },
                options: ResolveOptions {
                    record_failures: !build.no_failure_log,
                    record_global: !build.no_global,
                },
            })?;
            for line in commands::build::summary(&project_slug, &resolution) {
                println!("{}", line);
            }
            if resolution.is_success() {
                Ok(())
            } else {
                exit_with_error(&format!(
                    "no working build configuration found for '{}'",
                    project_slug
                ))
            }
        }
        Command::Show { project_slug } => {
            let report = commands::show::run(commands::show::ShowArgs {
                settings,
                project_slug,
            })?;
            for line in report.lines() {
                println!("{}", line);
            }
            Ok(())
        }
        Command::Versions => {
            for installed in commands::versions::run(&settings)? {
                println!(
                    "{} {} {}",
                    installed.category,
                    installed.version,
                    installed.path.display()
                );
            }
            Ok(())
        }
    }
}

fn exit_with_error(message: &str) -> Result<(), String> {
    eprintln!("{}", message);
    std::process::exit(1);
}
