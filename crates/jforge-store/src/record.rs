use jforge_core::attempt::{Attempt, BuildTool};

/// Written in place of every toolchain field an attempt does not use.
pub const NOT_APPLICABLE: &str = "n/a";
pub const WRAPPER_FLAG: &str = "1";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildStatus {
    Success,
    Failure,
}

impl BuildStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildStatus::Success => "success",
            BuildStatus::Failure => "failure",
        }
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BuildStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "success" => Ok(BuildStatus::Success),
            "failure" => Ok(BuildStatus::Failure),
            other => Err(format!("unknown build status '{}'", other)),
        }
    }
}

/// One ledger row, minus the local ledger's timestamp column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildRecord {
    pub project_slug: String,
    pub status: BuildStatus,
    pub jdk_version: String,
    pub mvn_version: String,
    pub gradle_version: String,
    pub use_gradlew: String,
}

impl BuildRecord {
    pub fn from_attempt(project_slug: &str, status: BuildStatus, attempt: &Attempt) -> Self {
        let (mvn_version, gradle_version, use_gradlew) = match &attempt.tool {
            BuildTool::Maven(version) => (version.as_str(), NOT_APPLICABLE, NOT_APPLICABLE),
            BuildTool::Gradle(version) => (NOT_APPLICABLE, version.as_str(), NOT_APPLICABLE),
            BuildTool::Wrapper => (NOT_APPLICABLE, NOT_APPLICABLE, WRAPPER_FLAG),
        };
        Self {
            project_slug: project_slug.to_string(),
            status,
            jdk_version: attempt.jdk.clone(),
            mvn_version: mvn_version.to_string(),
            gradle_version: gradle_version.to_string(),
            use_gradlew: use_gradlew.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == BuildStatus::Success
    }

    /// The configuration this row describes, or `None` when it lacks a JDK or
    /// does not name exactly one build tool.
    pub fn attempt(&self) -> Option<Attempt> {
        let jdk = present(&self.jdk_version)?;
        let mut tools = Vec::new();
        if let Some(version) = present(&self.mvn_version) {
            tools.push(BuildTool::Maven(version.to_string()));
        }
        if let Some(version) = present(&self.gradle_version) {
            tools.push(BuildTool::Gradle(version.to_string()));
        }
        if present(&self.use_gradlew).is_some_and(|flag| flag != "0") {
            tools.push(BuildTool::Wrapper);
        }
        if tools.len() != 1 {
            return None;
        }
        Some(Attempt {
            jdk: jdk.to_string(),
            tool: tools.remove(0),
        })
    }

    pub(crate) fn fields(&self) -> Vec<String> {
        vec![
            self.project_slug.clone(),
            self.status.as_str().to_string(),
            self.jdk_version.clone(),
            self.mvn_version.clone(),
            self.gradle_version.clone(),
            self.use_gradlew.clone(),
        ]
    }

    /// Expects the six columns in ledger order.
    pub(crate) fn from_fields(fields: &[String]) -> Result<Self, String> {
        match fields {
            [project_slug, status, jdk_version, mvn_version, gradle_version, use_gradlew] => {
                Ok(Self {
                    project_slug: project_slug.clone(),
                    status: status.parse()?,
                    jdk_version: normalize(jdk_version),
                    mvn_version: normalize(mvn_version),
                    gradle_version: normalize(gradle_version),
                    use_gradlew: normalize(use_gradlew),
                })
            }
            _ => Err(format!("expected 6 record fields, found {}", fields.len())),
        }
    }
}

fn present(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == NOT_APPLICABLE {
        None
    } else {
        Some(trimmed)
    }
}

// Hand-edited rows sometimes leave blanks; they read back as the sentinel.
fn normalize(value: &str) -> String {
    present(value).unwrap_or(NOT_APPLICABLE).to_string()
}
