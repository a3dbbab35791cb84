pub mod build;
pub mod show;
pub mod versions;

use jforge_core::config::Settings;
use jforge_core::toolchain::ToolchainRegistry;

pub(crate) fn load_registry(settings: &Settings) -> Result<ToolchainRegistry, String> {
    let registry = ToolchainRegistry::load(&settings.toolchains).map_err(|err| err.to_string())?;
    if registry.is_empty() {
        tracing::warn!(
            toolchains = %settings.toolchains.display(),
            "toolchain registry is empty"
        );
    }
    Ok(registry)
}
