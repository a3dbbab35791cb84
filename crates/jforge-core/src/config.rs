use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::layout::DataLayout;

pub const CONFIG_FILE_NAME: &str = "jforge.toml";
pub const DATA_DIR_ENV: &str = "JFORGE_DATA_DIR";
pub const TOOLCHAINS_ENV: &str = "JFORGE_TOOLCHAINS";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_TOOLCHAINS_FILE: &str = "dep_configs.json";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: String,
        source: std::io::Error,
    },
    Toml(toml::de::Error),
    EmptyValue {
        field: &'static str,
        origin: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config '{}': {}", path, source)
            }
            ConfigError::Toml(error) => write!(f, "failed to parse jforge.toml: {}", error),
            ConfigError::EmptyValue { field, origin } => {
                write!(f, "{} from {} must not be empty", field, origin)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
struct JforgeConfig {
    data_dir: Option<PathBuf>,
    toolchains: Option<PathBuf>,
}

/// Values given explicitly on the command line; these win over everything else.
#[derive(Clone, Debug, Default)]
pub struct SettingsOverrides {
    pub data_dir: Option<PathBuf>,
    pub toolchains: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub toolchains: PathBuf,
}

impl Settings {
    pub fn resolve(overrides: SettingsOverrides, working_dir: &Path) -> Result<Self, ConfigError> {
        Self::resolve_with(overrides, working_dir, |key| std::env::var(key).ok())
    }

    /// Precedence: override, then environment, then `jforge.toml`, then defaults.
    pub fn resolve_with<F>(
        overrides: SettingsOverrides,
        working_dir: &Path,
        env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = read_optional_config(working_dir)?;
        let data_dir = pick(
            "data_dir",
            overrides.data_dir,
            env(DATA_DIR_ENV),
            DATA_DIR_ENV,
            file.as_ref().and_then(|config| config.data_dir.clone()),
        )?
        .unwrap_or_else(|| working_dir.join(DEFAULT_DATA_DIR));
        let toolchains = pick(
            "toolchains",
            overrides.toolchains,
            env(TOOLCHAINS_ENV),
            TOOLCHAINS_ENV,
            file.as_ref().and_then(|config| config.toolchains.clone()),
        )?
        .unwrap_or_else(|| working_dir.join(DEFAULT_TOOLCHAINS_FILE));
        Ok(Self {
            data_dir: absolutize(working_dir, data_dir),
            toolchains: absolutize(working_dir, toolchains),
        })
    }

    pub fn layout(&self) -> DataLayout {
        DataLayout::new(self.data_dir.clone())
    }
}

fn pick(
    field: &'static str,
    flag: Option<PathBuf>,
    env_value: Option<String>,
    env_key: &str,
    file_value: Option<PathBuf>,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = flag {
        return non_empty(field, path, "command line".to_string()).map(Some);
    }
    if let Some(value) = env_value {
        return non_empty(field, PathBuf::from(value), env_key.to_string()).map(Some);
    }
    match file_value {
        Some(path) => non_empty(field, path, CONFIG_FILE_NAME.to_string()).map(Some),
        None => Ok(None),
    }
}

fn non_empty(field: &'static str, path: PathBuf, origin: String) -> Result<PathBuf, ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::EmptyValue { field, origin });
    }
    Ok(path)
}

fn absolutize(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn read_optional_config(working_dir: &Path) -> Result<Option<JforgeConfig>, ConfigError> {
    let path = working_dir.join(CONFIG_FILE_NAME);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };
    let config: JforgeConfig = toml::from_str(&contents).map_err(ConfigError::Toml)?;
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_resolve_against_working_dir() {
        let dir = tempfile::tempdir().expect("temp dir");
        let settings =
            Settings::resolve_with(SettingsOverrides::default(), dir.path(), no_env).expect("settings");
        assert_eq!(settings.data_dir, dir.path().join("data"));
        assert_eq!(settings.toolchains, dir.path().join("dep_configs.json"));
    }

    #[test]
    fn config_file_is_read_relative_to_working_dir() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "data_dir = \"corpus\"\ntoolchains = \"/etc/jforge/toolchains.json\"\n",
        )
        .expect("write config");
        let settings =
            Settings::resolve_with(SettingsOverrides::default(), dir.path(), no_env).expect("settings");
        assert_eq!(settings.data_dir, dir.path().join("corpus"));
        assert_eq!(settings.toolchains, PathBuf::from("/etc/jforge/toolchains.json"));
    }

    #[test]
    fn environment_beats_config_file_and_flags_beat_environment() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "data_dir = \"corpus\"\n")
            .expect("write config");
        let env = |key: &str| match key {
            DATA_DIR_ENV => Some("/srv/env-data".to_string()),
            TOOLCHAINS_ENV => Some("/srv/env-toolchains.json".to_string()),
            _ => None,
        };
        let settings = Settings::resolve_with(
            SettingsOverrides {
                data_dir: None,
                toolchains: Some(PathBuf::from("/srv/flag.json")),
            },
            dir.path(),
            env,
        )
        .expect("settings");
        assert_eq!(settings.data_dir, PathBuf::from("/srv/env-data"));
        assert_eq!(settings.toolchains, PathBuf::from("/srv/flag.json"));
    }

    #[test]
    fn empty_environment_value_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let env = |key: &str| (key == DATA_DIR_ENV).then(String::new);
        let error = Settings::resolve_with(SettingsOverrides::default(), dir.path(), env)
            .expect_err("error");
        assert!(error.to_string().contains("JFORGE_DATA_DIR"));
    }

    #[test]
    fn malformed_config_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "data_dir = [").expect("write config");
        let error = Settings::resolve_with(SettingsOverrides::default(), dir.path(), no_env)
            .expect_err("error");
        assert!(error.to_string().contains("failed to parse jforge.toml"));
    }
}
