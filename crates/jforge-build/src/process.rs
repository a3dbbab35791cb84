use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildEnvVar {
    pub key: String,
    pub value: String,
}

impl BuildEnvVar {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A child process description. `env` is the child's entire environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub current_dir: PathBuf,
    pub env: Vec<BuildEnvVar>,
}

impl CommandSpec {
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the child was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub trait CommandRunner {
    /// Blocks until the child exits, capturing stdout and stderr in full.
    fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput> {
        (**self).run(spec)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput> {
        let output = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.current_dir)
            .env_clear()
            .envs(spec.env.iter().map(|entry| (&entry.key, &entry.value)))
            .stdin(Stdio::null())
            .output()?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Builds the child environment from scratch: `PATH` is `ambient_path` with
/// `tool_bin` appended, `JAVA_HOME` is `java_home`. Nothing else is passed on.
pub fn toolchain_env(ambient_path: &str, tool_bin: Option<&Path>, java_home: &Path) -> Vec<BuildEnvVar> {
    let mut entries: Vec<PathBuf> = std::env::split_paths(ambient_path)
        .filter(|entry| !entry.as_os_str().is_empty())
        .collect();
    entries.extend(tool_bin.map(Path::to_path_buf));
    let path = std::env::join_paths(&entries)
        .map(|joined| joined.to_string_lossy().into_owned())
        .unwrap_or_else(|_| ambient_path.to_string());
    vec![
        BuildEnvVar::new("PATH", path),
        BuildEnvVar::new("JAVA_HOME", java_home.to_string_lossy()),
    ]
}

/// `PATH` of the calling process, read once when an executor is built.
pub fn ambient_path() -> String {
    std::env::var_os("PATH")
        .map(|value| value.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_bin_is_appended_after_ambient_path() {
        let env = toolchain_env(
            "/usr/local/bin:/usr/bin",
            Some(Path::new("/opt/maven/bin")),
            Path::new("/opt/jdk17"),
        );
        assert_eq!(
            env,
            vec![
                BuildEnvVar::new("PATH", "/usr/local/bin:/usr/bin:/opt/maven/bin"),
                BuildEnvVar::new("JAVA_HOME", "/opt/jdk17"),
            ]
        );
    }

    #[test]
    fn empty_ambient_path_adds_no_current_dir_entry() {
        let env = toolchain_env("", Some(Path::new("/opt/gradle/bin")), Path::new("/opt/jdk8"));
        assert_eq!(env[0], BuildEnvVar::new("PATH", "/opt/gradle/bin"));
    }

    #[test]
    fn ambient_path_is_kept_when_no_tool_bin() {
        let env = toolchain_env("/usr/bin", None, Path::new("/opt/jdk8"));
        assert_eq!(env[0], BuildEnvVar::new("PATH", "/usr/bin"));
        assert_eq!(env.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_passes_only_the_given_environment() {
        let dir = tempfile::tempdir().expect("temp dir");
        let spec = CommandSpec {
            program: PathBuf::from("/bin/sh"),
            args: vec!["-c".to_string(), "env | sort; exit 3".to_string()],
            current_dir: dir.path().to_path_buf(),
            env: vec![
                BuildEnvVar::new("PATH", "/usr/bin:/bin"),
                BuildEnvVar::new("JAVA_HOME", "/opt/jdk17"),
            ],
        };
        let output = SystemRunner::new().run(&spec).expect("run sh");
        assert_eq!(output.code, Some(3));
        assert!(!output.success());
        assert!(output.stdout.contains("JAVA_HOME=/opt/jdk17"));
        assert!(!output.stdout.lines().any(|line| line.starts_with("HOME=")));
    }
}
