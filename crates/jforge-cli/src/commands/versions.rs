use std::path::PathBuf;

use jforge_core::config::Settings;
use jforge_core::toolchain::ToolchainCategory;

use crate::commands::load_registry;

#[derive(Debug, PartialEq, Eq)]
pub struct InstalledVersion {
    pub category: ToolchainCategory,
    pub version: String,
    pub path: PathBuf,
}

/// Registry contents, grouped by category in a fixed order.
pub fn run(settings: &Settings) -> Result<Vec<InstalledVersion>, String> {
    let registry = load_registry(settings)?;
    let mut installed = Vec::new();
    for category in ToolchainCategory::ALL {
        for version in registry.versions(category) {
            if let Some(path) = registry.resolve(category, version) {
                installed.push(InstalledVersion {
                    category,
                    version: version.to_string(),
                    path: path.to_path_buf(),
                });
            }
        }
    }
    Ok(installed)
}
