//! Template retrieval orchestration.
//!
//! A reference is normalized, parsed when it belongs to a known provider,
//! and then served by an ordered list of strategies:
//!
//! | reference                         | strategies            |
//! |-----------------------------------|-----------------------|
//! | provider without clone, file      | raw file              |
//! | provider without clone, directory | archive               |
//! | parsed, single file               | raw file              |
//! | parsed, directory                 | clone, then archive   |
//! | unparsed                          | clone                 |
//!
//! Strategies run strictly in order and at most one fallback is attempted.

mod archive;
mod raw_file;

pub use archive::fetch_archive;
pub use raw_file::fetch_raw_file;

use std::path::Path;
use std::sync::Arc;

use crate::clone::{GitCloner, TemplateCloner};
use crate::config::StencilConfig;
use crate::error::{FetchError, FetchResult};
use crate::http::{HttpTransport, ReqwestTransport};
use crate::reference::{NormalizedReference, RetrievalTarget, TemplateSpec, normalize};

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Report strategy selection and attempts at `info` instead of `debug`.
    pub verbose: bool,
}

impl FetchOptions {
    /// Set verbose reporting.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// A way of materialising a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Primary clone collaborator
    Clone,
    /// Provider raw-content endpoint
    RawFile,
    /// Provider tarball endpoint
    Archive,
}

impl Strategy {
    /// Lowercase label for reporting.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clone => "clone",
            Self::RawFile => "raw-file",
            Self::Archive => "archive",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a successful fetch did.
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// Normalized reference string
    pub canonical: String,
    /// Parsed target, when the reference belongs to a known provider
    pub target: Option<RetrievalTarget>,
    /// Strategy that succeeded
    pub strategy: Strategy,
    /// Whether an earlier strategy failed first
    pub fell_back: bool,
    /// Files written, when the strategy reports it
    pub files: Option<usize>,
}

/// Resolves references and materialises them into a destination directory.
#[derive(Clone)]
pub struct TemplateFetcher {
    transport: Arc<dyn HttpTransport>,
    cloner: Arc<dyn TemplateCloner>,
}

impl std::fmt::Debug for TemplateFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateFetcher").finish_non_exhaustive()
    }
}

impl TemplateFetcher {
    /// Create a fetcher from explicit collaborators.
    pub fn new(transport: Arc<dyn HttpTransport>, cloner: Arc<dyn TemplateCloner>) -> Self {
        Self { transport, cloner }
    }

    /// Create a fetcher with the reqwest transport and git cloner.
    pub fn from_config(config: &StencilConfig) -> FetchResult<Self> {
        let transport = ReqwestTransport::new(&config.http.user_agent)?;
        let cloner = GitCloner::new().with_shallow(config.clone.shallow);
        Ok(Self::new(Arc::new(transport), Arc::new(cloner)))
    }

    /// Ordered strategies for a (possibly unparsed) reference.
    pub fn plan(spec: Option<&TemplateSpec>) -> Vec<Strategy> {
        match spec {
            Some(spec) if !spec.provider.has_primary_mechanism() => {
                if spec.is_single_file() {
                    vec![Strategy::RawFile]
                } else {
                    vec![Strategy::Archive]
                }
            }
            Some(spec) if spec.is_single_file() => vec![Strategy::RawFile],
            Some(_) => vec![Strategy::Clone, Strategy::Archive],
            None => vec![Strategy::Clone],
        }
    }

    /// Fetch `reference` into `destination`.
    ///
    /// # Errors
    ///
    /// Returns the single strategy's error, or
    /// [`FetchError::FallbackExhausted`] when both clone and archive fail.
    /// Partially written output is left in place.
    pub async fn fetch(
        &self,
        reference: &str,
        destination: &Path,
        options: &FetchOptions,
    ) -> FetchResult<FetchReport> {
        let normalized = normalize(reference);
        let spec = parse_for_routing(&normalized)?;
        let target = spec.map(|spec| RetrievalTarget::new(spec, destination));
        let plan = Self::plan(target.as_ref().map(|t| &t.spec));

        if options.verbose {
            tracing::info!(reference = %normalized.canonical, plan = ?plan, "resolved template");
        } else {
            tracing::debug!(reference = %normalized.canonical, plan = ?plan, "resolved template");
        }

        let mut failures = Vec::with_capacity(plan.len());
        for (attempt, strategy) in plan.iter().copied().enumerate() {
            match self
                .run(strategy, &normalized.canonical, target.as_ref(), destination)
                .await
            {
                Ok(files) => {
                    return Ok(FetchReport {
                        canonical: normalized.canonical,
                        target,
                        strategy,
                        fell_back: attempt > 0,
                        files,
                    });
                }
                Err(err) => {
                    if options.verbose {
                        tracing::info!(%strategy, error = %err, "strategy failed");
                    } else {
                        tracing::debug!(%strategy, error = %err, "strategy failed");
                    }
                    failures.push(err);
                }
            }
        }

        Err(combine_failures(failures, &normalized.canonical))
    }

    async fn run(
        &self,
        strategy: Strategy,
        canonical: &str,
        target: Option<&RetrievalTarget>,
        destination: &Path,
    ) -> FetchResult<Option<usize>> {
        if strategy == Strategy::Clone {
            self.cloner
                .materialize(canonical, destination)
                .await
                .map_err(|e| FetchError::PrimaryMechanism(format!("{e:#}")))?;
            return Ok(None);
        }

        let target = target.ok_or_else(|| FetchError::InvalidReference(canonical.to_string()))?;
        let spec = &target.spec;
        let transport = self.transport.as_ref();

        match strategy {
            Strategy::RawFile => {
                fetch_raw_file(
                    transport,
                    spec.provider,
                    &spec.owner,
                    &spec.repo,
                    &spec.git_ref,
                    &spec.subpath,
                    &target.destination,
                )
                .await?;
                Ok(Some(1))
            }
            Strategy::Archive => {
                let summary = fetch_archive(
                    transport,
                    spec.provider,
                    &spec.owner,
                    &spec.repo,
                    &spec.git_ref,
                    &spec.subpath,
                    &target.destination,
                )
                .await?;
                Ok(Some(summary.files))
            }
            Strategy::Clone => Ok(None),
        }
    }
}

/// Parse the normalized reference for routing.
///
/// Providers without a clone mechanism must parse; for the others a parse
/// failure only means the clone collaborator gets the raw string.
fn parse_for_routing(normalized: &NormalizedReference) -> FetchResult<Option<TemplateSpec>> {
    match normalized.provider {
        Some(provider) if !provider.has_primary_mechanism() => {
            TemplateSpec::parse(provider, &normalized.canonical).map(Some)
        }
        Some(provider) => Ok(TemplateSpec::parse(provider, &normalized.canonical).ok()),
        None => Ok(None),
    }
}

fn combine_failures(mut failures: Vec<FetchError>, canonical: &str) -> FetchError {
    if failures.len() >= 2 {
        let fallback = failures.pop().map(|e| e.to_string()).unwrap_or_default();
        let primary = match failures.remove(0) {
            FetchError::PrimaryMechanism(message) => message,
            other => other.to_string(),
        };
        return FetchError::FallbackExhausted { primary, fallback };
    }
    failures
        .pop()
        .unwrap_or_else(|| FetchError::InvalidReference(canonical.to_string()))
}
