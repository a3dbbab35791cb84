pub mod builder;
pub mod executor;
pub mod gradle;
pub mod maven;
pub mod process;
pub mod resolve;
pub mod wrapper;

#[cfg(test)]
pub(crate) mod test_support;

pub use builder::{BuildError, BuildExecutor, BuildRequest, BuildResult};
pub use executor::{AttemptExecutor, ToolchainAttemptExecutor};
pub use process::{BuildEnvVar, CommandOutput, CommandRunner, CommandSpec, SystemRunner};
pub use resolve::{AttemptSource, Resolution, ResolveError, ResolveOptions, ResolveRequest, Resolver};
