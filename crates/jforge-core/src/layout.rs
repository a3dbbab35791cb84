use std::path::PathBuf;

pub const SOURCES_DIR_NAME: &str = "project-sources";
pub const BUILD_INFO_DIR_NAME: &str = "build-info";
pub const LOCAL_LEDGER_FILE_NAME: &str = "build_info_local.csv";
pub const GLOBAL_LEDGER_FILE_NAME: &str = "build_info.csv";
pub const WRAPPER_SCRIPT_NAME: &str = "gradlew";

/// True when `slug` names a single directory entry: non-blank, no path
/// separators, no `..`.
pub fn is_valid_project_slug(slug: &str) -> bool {
    !slug.trim().is_empty()
        && slug != "."
        && !slug.contains("..")
        && !slug.contains(['/', '\\', '\0'])
}

/// Every path the resolver reads or writes, derived from one data directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn source_dir(&self, project_slug: &str) -> PathBuf {
        self.root.join(SOURCES_DIR_NAME).join(project_slug)
    }

    pub fn build_info_dir(&self) -> PathBuf {
        self.root.join(BUILD_INFO_DIR_NAME)
    }

    /// Toolchain descriptor; its presence is the Built marker.
    pub fn marker_path(&self, project_slug: &str) -> PathBuf {
        self.build_info_dir().join(format!("{}.json", project_slug))
    }

    pub fn local_ledger_path(&self) -> PathBuf {
        self.build_info_dir().join(LOCAL_LEDGER_FILE_NAME)
    }

    pub fn global_ledger_path(&self) -> PathBuf {
        self.root.join(GLOBAL_LEDGER_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_that_leave_their_directory_are_invalid() {
        assert!(is_valid_project_slug("apache__camel_CVE-2018-8041_2.20.3"));
        for slug in ["", " ", ".", "..", "../x", "a/b", "a\\b", "x/../y"] {
            assert!(!is_valid_project_slug(slug), "accepted {:?}", slug);
        }
    }

    #[test]
    fn paths_follow_data_dir_conventions() {
        let layout = DataLayout::new("/data");
        let slug = "apache__camel_CVE-2018-8041_2.20.3";
        assert_eq!(
            layout.source_dir(slug),
            PathBuf::from("/data/project-sources/apache__camel_CVE-2018-8041_2.20.3")
        );
        assert_eq!(
            layout.marker_path(slug),
            PathBuf::from("/data/build-info/apache__camel_CVE-2018-8041_2.20.3.json")
        );
        assert_eq!(
            layout.local_ledger_path(),
            PathBuf::from("/data/build-info/build_info_local.csv")
        );
        assert_eq!(layout.global_ledger_path(), PathBuf::from("/data/build_info.csv"));
    }
}
