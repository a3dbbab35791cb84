use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use jforge_build::{CommandOutput, CommandRunner, CommandSpec, Resolution, ResolveOptions};
use jforge_cli::commands::{build, show, versions};
use jforge_core::attempt::{Attempt, OverrideRequest};
use jforge_core::config::Settings;
use jforge_core::toolchain::ToolchainCategory;

const SLUG: &str = "acme__lib_CVE-0000-0000_1.0";

/// Exits with `code` for every command and counts invocations.
struct FixedExit {
    code: i32,
    calls: Cell<usize>,
}

impl FixedExit {
    fn new(code: i32) -> Self {
        Self {
            code,
            calls: Cell::new(0),
        }
    }
}

impl CommandRunner for FixedExit {
    fn run(&self, _spec: &CommandSpec) -> std::io::Result<CommandOutput> {
        self.calls.set(self.calls.get() + 1);
        Ok(CommandOutput {
            code: Some(self.code),
            ..CommandOutput::default()
        })
    }
}

fn install(root: &Path, name: &str, binary: &str) -> PathBuf {
    let home = root.join(name);
    fs::create_dir_all(home.join("bin")).expect("create bin");
    fs::write(home.join("bin").join(binary), "#!/bin/sh\n").expect("write launcher");
    home
}

fn settings(root: &Path) -> Settings {
    let installs = root.join("installs");
    let registry = serde_json::json!({
        "jdks": {
            "8": install(&installs, "jdk8", "java"),
            "17": install(&installs, "jdk17", "java"),
        },
        "mvn": { "3.5.0": install(&installs, "maven-3.5.0", "mvn") },
        "gradle": { "8.9": install(&installs, "gradle-8.9", "gradle") },
    });
    let toolchains = root.join("dep_configs.json");
    fs::write(&toolchains, registry.to_string()).expect("write registry");
    let settings = Settings {
        data_dir: root.join("data"),
        toolchains,
    };
    fs::create_dir_all(settings.layout().source_dir(SLUG)).expect("create sources");
    settings
}

fn build_args(settings: &Settings) -> build::BuildArgs {
    build::BuildArgs {
        settings: settings.clone(),
        project_slug: SLUG.to_string(),
        try_all: false,
        pinned: OverrideRequest::default(),
        options: ResolveOptions::default(),
    }
}

#[test]
fn build_then_show_reports_the_remembered_configuration() {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = settings(dir.path());
    let runner = FixedExit::new(0);

    let resolution = build::run_with_runner(build_args(&settings), &runner).expect("build");
    assert_eq!(runner.calls.get(), 1);
    assert_eq!(
        build::summary(SLUG, &resolution),
        vec![
            format!("project={}", SLUG),
            "status=built".to_string(),
            "configuration=jdk 8 + maven 3.5.0".to_string(),
            "source=search".to_string(),
            "attempts=1".to_string(),
        ]
    );

    let report = show::run(show::ShowArgs {
        settings: settings.clone(),
        project_slug: SLUG.to_string(),
    })
    .expect("show");
    assert!(report.built);
    assert_eq!(report.local_success, Some(Attempt::maven("8", "3.5.0")));
    assert_eq!(
        report.lines(),
        vec![
            format!("project={}", SLUG),
            "built=true".to_string(),
            "marker=jdk 8 + maven 3.5.0".to_string(),
            "local=jdk 8 + maven 3.5.0".to_string(),
            "global=jdk 8 + maven 3.5.0 (success)".to_string(),
        ]
    );

    let again = build::run_with_runner(build_args(&settings), &runner).expect("second build");
    assert_eq!(again, Resolution::AlreadyBuilt);
    assert_eq!(runner.calls.get(), 1);
}

#[test]
fn failing_builds_end_exhausted() {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = settings(dir.path());
    let runner = FixedExit::new(1);

    let resolution = build::run_with_runner(build_args(&settings), &runner).expect("build");
    assert!(!resolution.is_success());
    assert_eq!(
        build::summary(SLUG, &resolution)[1..],
        ["status=failed".to_string(), "attempts=9".to_string()]
    );
    // Only 8/3.5.0, 17/3.5.0, and 17/8.9 have installs; the rest never spawn.
    assert_eq!(runner.calls.get(), 3);
}

#[test]
fn invalid_pin_is_an_error_without_spawning() {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = settings(dir.path());
    let runner = FixedExit::new(0);
    let mut args = build_args(&settings);
    args.pinned = OverrideRequest {
        jdk: Some("17".to_string()),
        mvn: Some("3.9.8".to_string()),
        ..OverrideRequest::default()
    };

    let error = build::run_with_runner(args, &runner).expect_err("unknown maven");
    assert!(error.contains("maven version '3.9.8' not found; available: [3.5.0]"));
    assert_eq!(runner.calls.get(), 0);
}

#[test]
fn missing_registry_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut settings = settings(dir.path());
    settings.toolchains = dir.path().join("absent.json");
    let error = build::run_with_runner(build_args(&settings), FixedExit::new(0))
        .expect_err("missing registry");
    assert!(error.contains("absent.json"));
}

#[test]
fn show_on_unknown_project_reports_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = settings(dir.path());
    let report = show::run(show::ShowArgs {
        settings,
        project_slug: "nobody__nothing".to_string(),
    })
    .expect("show");
    assert!(!report.built);
    assert_eq!(
        report.lines()[2..],
        ["local=none".to_string(), "global=none".to_string()]
    );
}

#[test]
fn versions_lists_every_category_in_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = settings(dir.path());
    let listed: Vec<(ToolchainCategory, String)> = versions::run(&settings)
        .expect("versions")
        .into_iter()
        .map(|installed| (installed.category, installed.version))
        .collect();
    assert_eq!(
        listed,
        vec![
            (ToolchainCategory::Jdk, "17".to_string()),
            (ToolchainCategory::Jdk, "8".to_string()),
            (ToolchainCategory::Maven, "3.5.0".to_string()),
            (ToolchainCategory::Gradle, "8.9".to_string()),
        ]
    );
}

#[test]
fn slugs_outside_project_sources_are_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = settings(dir.path());
    let runner = FixedExit::new(0);
    let mut args = build_args(&settings);
    args.project_slug = "../x".to_string();

    let error = build::run_with_runner(args, &runner).expect_err("escaping slug");
    assert!(error.contains("invalid project slug '../x'"));
    assert_eq!(runner.calls.get(), 0);
    assert!(!settings.data_dir.join("x.json").exists());

    let error = show::run(show::ShowArgs {
        settings,
        project_slug: "a/b".to_string(),
    })
    .expect_err("nested slug");
    assert!(error.contains("invalid project slug 'a/b'"));
}
