//! Installed JDK and build-tool versions, keyed by category and version string.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolchainCategory {
    Jdk,
    Maven,
    Gradle,
}

impl ToolchainCategory {
    pub const ALL: [ToolchainCategory; 3] = [
        ToolchainCategory::Jdk,
        ToolchainCategory::Maven,
        ToolchainCategory::Gradle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolchainCategory::Jdk => "jdk",
            ToolchainCategory::Maven => "maven",
            ToolchainCategory::Gradle => "gradle",
        }
    }

    /// Launcher expected under `<install>/bin/` for this category.
    pub fn binary_name(self) -> &'static str {
        match self {
            ToolchainCategory::Jdk => "java",
            ToolchainCategory::Maven => "mvn",
            ToolchainCategory::Gradle => "gradle",
        }
    }
}

impl std::fmt::Display for ToolchainCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum RegistryError {
    Io {
        path: String,
        source: std::io::Error,
    },
    Json(serde_json::Error),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::Io { path, source } => {
                write!(f, "failed to read toolchain registry '{}': {}", path, source)
            }
            RegistryError::Json(error) => {
                write!(f, "failed to parse toolchain registry: {}", error)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// On-disk shape: `{"jdks": {...}, "mvn": {...}, "gradle": {...}}`.
#[derive(Debug, Default, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    jdks: BTreeMap<String, PathBuf>,
    #[serde(default)]
    mvn: BTreeMap<String, PathBuf>,
    #[serde(default)]
    gradle: BTreeMap<String, PathBuf>,
}

/// Read-only after construction; share it by reference across resolutions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolchainRegistry {
    jdks: BTreeMap<String, PathBuf>,
    maven: BTreeMap<String, PathBuf>,
    gradle: BTreeMap<String, PathBuf>,
}

impl ToolchainRegistry {
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = serde_json::from_str(contents).map_err(RegistryError::Json)?;
        Ok(Self {
            jdks: file.jdks,
            maven: file.mvn,
            gradle: file.gradle,
        })
    }

    pub fn with_entry(
        mut self,
        category: ToolchainCategory,
        version: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        let table = match category {
            ToolchainCategory::Jdk => &mut self.jdks,
            ToolchainCategory::Maven => &mut self.maven,
            ToolchainCategory::Gradle => &mut self.gradle,
        };
        table.insert(version.into(), path.into());
        self
    }

    /// A miss is an ordinary result; callers fail the one attempt that asked.
    pub fn resolve(&self, category: ToolchainCategory, version: &str) -> Option<&Path> {
        self.table(category).get(version).map(PathBuf::as_path)
    }

    pub fn contains(&self, category: ToolchainCategory, version: &str) -> bool {
        self.table(category).contains_key(version)
    }

    pub fn versions(&self, category: ToolchainCategory) -> Vec<&str> {
        self.table(category).keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.jdks.is_empty() && self.maven.is_empty() && self.gradle.is_empty()
    }

    fn table(&self, category: ToolchainCategory) -> &BTreeMap<String, PathBuf> {
        match category {
            ToolchainCategory::Jdk => &self.jdks,
            ToolchainCategory::Maven => &self.maven,
            ToolchainCategory::Gradle => &self.gradle,
        }
    }
}
