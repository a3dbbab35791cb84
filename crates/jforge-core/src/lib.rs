pub mod attempt;
pub mod config;
pub mod layout;
pub mod toolchain;

pub use attempt::{default_attempts, Attempt, AttemptOutcome, BuildTool, OverrideError, OverrideRequest};
pub use config::{ConfigError, Settings, SettingsOverrides};
pub use layout::{is_valid_project_slug, DataLayout};
pub use toolchain::{RegistryError, ToolchainCategory, ToolchainRegistry};
