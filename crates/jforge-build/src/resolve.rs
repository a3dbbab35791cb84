//! Chooses which attempts to run for a project and in what order.
//!
//! Order: Built marker, caller override, remembered local success, remembered
//! global success, then the fixed candidate list. The first success ends the
//! search.

use jforge_core::attempt::{default_attempts, Attempt, AttemptOutcome, OverrideError, OverrideRequest};
use jforge_core::layout::{is_valid_project_slug, DataLayout};
use jforge_core::toolchain::ToolchainRegistry;
use jforge_store::{BuildRecord, BuildStatus, BuiltMarkers, GlobalLedger, LocalLedger, StoreError};

use crate::executor::AttemptExecutor;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolveRequest {
    pub project_slug: String,
    /// Skip both ledgers and go straight to the candidate list.
    pub try_all: bool,
    pub pinned: OverrideRequest,
}

impl ResolveRequest {
    pub fn new(project_slug: impl Into<String>) -> Self {
        Self {
            project_slug: project_slug.into(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Append failed attempts to the local ledger.
    pub record_failures: bool,
    /// Upsert the final outcome into the global ledger.
    pub record_global: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            record_failures: true,
            record_global: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptSource {
    Override,
    LocalLedger,
    GlobalLedger,
    Search,
}

impl AttemptSource {
    pub fn as_str(self) -> &'static str {
        match self {
            AttemptSource::Override => "override",
            AttemptSource::LocalLedger => "local ledger",
            AttemptSource::GlobalLedger => "global ledger",
            AttemptSource::Search => "search",
        }
    }
}

impl std::fmt::Display for AttemptSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    AlreadyBuilt,
    Built {
        attempt: Attempt,
        source: AttemptSource,
        /// Every attempt run, in order, ending with the winner.
        tried: Vec<Attempt>,
    },
    /// No working configuration found.
    Exhausted { tried: Vec<Attempt> },
}

impl Resolution {
    pub fn is_success(&self) -> bool {
        !matches!(self, Resolution::Exhausted { .. })
    }
}

#[derive(Debug)]
pub enum ResolveError {
    InvalidSlug { slug: String },
    Override(OverrideError),
    Store(StoreError),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::InvalidSlug { slug } => {
                write!(f, "invalid project slug '{}': must be a single directory name", slug)
            }
            ResolveError::Override(error) => write!(f, "invalid build configuration: {}", error),
            ResolveError::Store(error) => write!(f, "failed to persist build state: {}", error),
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<StoreError> for ResolveError {
    fn from(error: StoreError) -> Self {
        ResolveError::Store(error)
    }
}

impl From<OverrideError> for ResolveError {
    fn from(error: OverrideError) -> Self {
        ResolveError::Override(error)
    }
}

pub struct Resolver<'a, E> {
    executor: E,
    registry: &'a ToolchainRegistry,
    markers: BuiltMarkers,
    local: LocalLedger,
    global: GlobalLedger,
    options: ResolveOptions,
}

enum Step {
    Done(Resolution),
    Continue,
}

impl<'a, E: AttemptExecutor> Resolver<'a, E> {
    pub fn new(executor: E, registry: &'a ToolchainRegistry, layout: &DataLayout) -> Self {
        Self {
            executor,
            registry,
            markers: BuiltMarkers::new(layout.clone()),
            local: LocalLedger::new(layout.local_ledger_path()),
            global: GlobalLedger::new(layout.global_ledger_path()),
            options: ResolveOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn resolve(&self, request: &ResolveRequest) -> Result<Resolution, ResolveError> {
        let slug = request.project_slug.as_str();
        if !is_valid_project_slug(slug) {
            return Err(ResolveError::InvalidSlug {
                slug: slug.to_string(),
            });
        }
        let pinned = self.validate(request)?;

        if self.markers.is_built(slug) {
            tracing::info!(project = slug, "already built; nothing to do");
            return Ok(Resolution::AlreadyBuilt);
        }

        let mut tried = Vec::new();
        if let Some(attempt) = pinned {
            if let Step::Done(resolution) =
                self.try_attempt(slug, attempt, AttemptSource::Override, &mut tried)?
            {
                return Ok(resolution);
            }
            tracing::warn!(project = slug, "pinned build configuration failed");
            return Ok(Resolution::Exhausted { tried });
        }

        if request.try_all {
            tracing::info!(project = slug, "skipping remembered configurations");
        } else {
            let remembered = [
                (AttemptSource::LocalLedger, self.local.remembered_success(slug)?),
                (AttemptSource::GlobalLedger, self.global.remembered_success(slug)?),
            ];
            for (source, attempt) in remembered {
                let Some(attempt) = attempt else { continue };
                if let Step::Done(resolution) = self.try_attempt(slug, attempt, source, &mut tried)? {
                    return Ok(resolution);
                }
            }
            tracing::info!(project = slug, "no remembered configuration worked; searching");
        }

        for candidate in default_attempts() {
            if let Step::Done(resolution) =
                self.try_attempt(slug, candidate, AttemptSource::Search, &mut tried)?
            {
                return Ok(resolution);
            }
        }

        tracing::warn!(project = slug, attempts = tried.len(), "no working configuration found");
        self.record_exhausted(slug, &tried)?;
        Ok(Resolution::Exhausted { tried })
    }

    fn validate(&self, request: &ResolveRequest) -> Result<Option<Attempt>, OverrideError> {
        if request.pinned.is_empty() {
            return Ok(None);
        }
        if request.try_all {
            return Err(OverrideError::ConflictsWithTryAll);
        }
        request.pinned.validate(self.registry).map(Some)
    }

    fn try_attempt(
        &self,
        slug: &str,
        attempt: Attempt,
        source: AttemptSource,
        tried: &mut Vec<Attempt>,
    ) -> Result<Step, ResolveError> {
        if tried.contains(&attempt) {
            tracing::debug!(project = slug, %attempt, "already tried in this run");
            return Ok(Step::Continue);
        }
        tracing::info!(project = slug, %attempt, %source, "trying build configuration");
        tried.push(attempt.clone());

        match self.executor.execute(slug, &attempt)? {
            AttemptOutcome::AlreadyBuilt => Ok(Step::Done(Resolution::AlreadyBuilt)),
            AttemptOutcome::NewlyBuilt => {
                let record = BuildRecord::from_attempt(slug, BuildStatus::Success, &attempt);
                self.local.append(record.clone())?;
                if self.options.record_global {
                    self.global.upsert(record)?;
                }
                Ok(Step::Done(Resolution::Built {
                    attempt,
                    source,
                    tried: tried.clone(),
                }))
            }
            AttemptOutcome::Failed => {
                if self.options.record_failures {
                    self.local
                        .append(BuildRecord::from_attempt(slug, BuildStatus::Failure, &attempt))?;
                }
                Ok(Step::Continue)
            }
        }
    }

    /// A failure row lands in the global ledger only when it has nothing on the
    /// project yet; an earlier success there is never downgraded.
    fn record_exhausted(&self, slug: &str, tried: &[Attempt]) -> Result<(), StoreError> {
        if !self.options.record_global {
            return Ok(());
        }
        let Some(last) = tried.last() else {
            return Ok(());
        };
        if self.global.get(slug)?.is_some() {
            return Ok(());
        }
        self.global
            .upsert(BuildRecord::from_attempt(slug, BuildStatus::Failure, last))
    }
}
