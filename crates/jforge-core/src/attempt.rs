use crate::toolchain::{ToolchainCategory, ToolchainRegistry};

/// The one build tool an attempt drives.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BuildTool {
    Maven(String),
    Gradle(String),
    /// The project's own `gradlew` script.
    Wrapper,
}

impl BuildTool {
    /// Registry category the tool resolves through, if any.
    pub fn category(&self) -> Option<ToolchainCategory> {
        match self {
            BuildTool::Maven(_) => Some(ToolchainCategory::Maven),
            BuildTool::Gradle(_) => Some(ToolchainCategory::Gradle),
            BuildTool::Wrapper => None,
        }
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            BuildTool::Maven(version) | BuildTool::Gradle(version) => Some(version),
            BuildTool::Wrapper => None,
        }
    }
}

impl std::fmt::Display for BuildTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildTool::Maven(version) => write!(f, "maven {}", version),
            BuildTool::Gradle(version) => write!(f, "gradle {}", version),
            BuildTool::Wrapper => f.write_str("gradlew"),
        }
    }
}

/// One candidate toolchain configuration: a JDK plus exactly one build tool.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Attempt {
    pub jdk: String,
    pub tool: BuildTool,
}

impl Attempt {
    pub fn maven(jdk: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            jdk: jdk.into(),
            tool: BuildTool::Maven(version.into()),
        }
    }

    pub fn gradle(jdk: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            jdk: jdk.into(),
            tool: BuildTool::Gradle(version.into()),
        }
    }

    pub fn wrapper(jdk: impl Into<String>) -> Self {
        Self {
            jdk: jdk.into(),
            tool: BuildTool::Wrapper,
        }
    }
}

impl std::fmt::Display for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "jdk {} + {}", self.jdk, self.tool)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    NewlyBuilt,
    /// Built marker was present; no toolchain ran.
    AlreadyBuilt,
    Failed,
}

/// Exhaustive search order. Changing it changes which configuration gets recorded.
pub fn default_attempts() -> Vec<Attempt> {
    vec![
        Attempt::maven("8", "3.5.0"),
        Attempt::maven("17", "3.5.0"),
        Attempt::maven("17", "3.9.8"),
        Attempt::maven("8", "3.9.8"),
        Attempt::gradle("17", "8.9"),
        Attempt::gradle("8", "7.6.4"),
        Attempt::gradle("8", "6.8.2"),
        Attempt::wrapper("8"),
        Attempt::wrapper("17"),
    ]
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverrideError {
    MissingJdk,
    MissingBuildTool,
    MultipleBuildTools {
        tools: Vec<&'static str>,
    },
    UnknownVersion {
        category: ToolchainCategory,
        version: String,
        available: Vec<String>,
    },
    ConflictsWithTryAll,
}

impl std::fmt::Display for OverrideError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverrideError::MissingJdk => {
                write!(f, "a JDK version must be specified when pinning a configuration")
            }
            OverrideError::MissingBuildTool => write!(
                f,
                "exactly one build tool must be specified (--mvn, --gradle, or --gradlew)"
            ),
            OverrideError::MultipleBuildTools { tools } => write!(
                f,
                "only one build tool can be specified at a time, got {}",
                tools.join(", ")
            ),
            OverrideError::UnknownVersion {
                category,
                version,
                available,
            } => write!(
                f,
                "{} version '{}' not found; available: [{}]",
                category,
                version,
                available.join(", ")
            ),
            OverrideError::ConflictsWithTryAll => {
                write!(f, "--try-all cannot be combined with pinned versions")
            }
        }
    }
}

impl std::error::Error for OverrideError {}

/// Caller-pinned versions, as received from the command line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverrideRequest {
    pub jdk: Option<String>,
    pub mvn: Option<String>,
    pub gradle: Option<String>,
    pub gradlew: bool,
}

impl OverrideRequest {
    pub fn is_empty(&self) -> bool {
        self.jdk.is_none() && self.mvn.is_none() && self.gradle.is_none() && !self.gradlew
    }

    /// Checks the request against the registry without touching the filesystem.
    pub fn validate(&self, registry: &ToolchainRegistry) -> Result<Attempt, OverrideError> {
        let jdk = self
            .jdk
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or(OverrideError::MissingJdk)?;

        let mut tools = Vec::new();
        if let Some(version) = &self.mvn {
            tools.push(("--mvn", BuildTool::Maven(version.clone())));
        }
        if let Some(version) = &self.gradle {
            tools.push(("--gradle", BuildTool::Gradle(version.clone())));
        }
        if self.gradlew {
            tools.push(("--gradlew", BuildTool::Wrapper));
        }
        if tools.len() > 1 {
            return Err(OverrideError::MultipleBuildTools {
                tools: tools.iter().map(|(flag, _)| *flag).collect(),
            });
        }
        let (_, tool) = tools.pop().ok_or(OverrideError::MissingBuildTool)?;

        require_known(registry, ToolchainCategory::Jdk, jdk)?;
        if let (Some(category), Some(version)) = (tool.category(), tool.version()) {
            require_known(registry, category, version)?;
        }
        Ok(Attempt {
            jdk: jdk.to_string(),
            tool,
        })
    }
}

fn require_known(
    registry: &ToolchainRegistry,
    category: ToolchainCategory,
    version: &str,
) -> Result<(), OverrideError> {
    if registry.contains(category, version) {
        return Ok(());
    }
    Err(OverrideError::UnknownVersion {
        category,
        version: version.to_string(),
        available: registry
            .versions(category)
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}
