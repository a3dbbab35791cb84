use std::fs;
use std::path::PathBuf;

use jforge_core::attempt::{Attempt, BuildTool};
use jforge_core::layout::DataLayout;
use serde::{Deserialize, Serialize};

use crate::ledger::StoreError;

/// Contents of `build-info/<slug>.json`, e.g. `{"jdk":"17","mvn":"3.5.0"}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jdk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mvn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradlew: Option<u8>,
}

impl ToolchainDescriptor {
    pub fn from_attempt(attempt: &Attempt) -> Self {
        let mut descriptor = Self {
            jdk: Some(attempt.jdk.clone()),
            ..Self::default()
        };
        match &attempt.tool {
            BuildTool::Maven(version) => descriptor.mvn = Some(version.clone()),
            BuildTool::Gradle(version) => descriptor.gradle = Some(version.clone()),
            BuildTool::Wrapper => descriptor.gradlew = Some(1),
        }
        descriptor
    }

    /// Older descriptors for wrapper builds carry only `{"gradlew": 1}`; those
    /// have no complete attempt.
    pub fn attempt(&self) -> Option<Attempt> {
        let jdk = self.jdk.clone()?;
        match (&self.mvn, &self.gradle, self.gradlew.unwrap_or(0)) {
            (Some(version), None, 0) => Some(Attempt::maven(jdk, version.clone())),
            (None, Some(version), 0) => Some(Attempt::gradle(jdk, version.clone())),
            (None, None, flag) if flag != 0 => Some(Attempt::wrapper(jdk)),
            _ => None,
        }
    }
}

/// Per-project "already built" flags backed by toolchain descriptor files.
#[derive(Clone, Debug)]
pub struct BuiltMarkers {
    layout: DataLayout,
}

impl BuiltMarkers {
    pub fn new(layout: DataLayout) -> Self {
        Self { layout }
    }

    pub fn path(&self, project_slug: &str) -> PathBuf {
        self.layout.marker_path(project_slug)
    }

    pub fn is_built(&self, project_slug: &str) -> bool {
        self.path(project_slug).exists()
    }

    pub fn read(&self, project_slug: &str) -> Result<Option<ToolchainDescriptor>, StoreError> {
        let path = self.path(project_slug);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(StoreError::io(&path, error)),
        };
        let descriptor = serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Some(descriptor))
    }

    pub fn write(&self, project_slug: &str, attempt: &Attempt) -> Result<PathBuf, StoreError> {
        let path = self.path(project_slug);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|error| StoreError::io(parent, error))?;
        }
        let contents = serde_json::to_string(&ToolchainDescriptor::from_attempt(attempt))
            .map_err(|source| StoreError::Json {
                path: path.display().to_string(),
                source,
            })?;
        fs::write(&path, contents).map_err(|error| StoreError::io(&path, error))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_round_trips_through_descriptor() {
        let dir = tempfile::tempdir().expect("temp dir");
        let markers = BuiltMarkers::new(DataLayout::new(dir.path()));
        assert!(!markers.is_built("acme"));
        let path = markers.write("acme", &Attempt::maven("17", "3.5.0")).expect("write");
        assert!(markers.is_built("acme"));
        assert_eq!(
            fs::read_to_string(path).expect("read marker"),
            r#"{"jdk":"17","mvn":"3.5.0"}"#
        );
        let descriptor = markers.read("acme").expect("read").expect("descriptor");
        assert_eq!(descriptor.attempt(), Some(Attempt::maven("17", "3.5.0")));
    }

    #[test]
    fn legacy_wrapper_descriptor_has_no_attempt() {
        let descriptor: ToolchainDescriptor =
            serde_json::from_str(r#"{"gradlew": 1}"#).expect("descriptor");
        assert_eq!(descriptor.gradlew, Some(1));
        assert_eq!(descriptor.attempt(), None);
    }

    #[test]
    fn wrapper_descriptor_records_jdk() {
        let descriptor = ToolchainDescriptor::from_attempt(&Attempt::wrapper("8"));
        assert_eq!(
            serde_json::to_string(&descriptor).expect("json"),
            r#"{"jdk":"8","gradlew":1}"#
        );
    }

    #[test]
    fn missing_marker_reads_as_none() {
        let dir = tempfile::tempdir().expect("temp dir");
        let markers = BuiltMarkers::new(DataLayout::new(dir.path()));
        assert_eq!(markers.read("acme").expect("read"), None);
    }
}
