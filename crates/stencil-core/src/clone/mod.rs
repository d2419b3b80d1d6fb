//! Primary bulk-clone mechanism.
//!
//! The orchestrator treats cloning as an opaque collaborator: given the
//! canonical spec string and a destination, populate the destination or
//! fail. [`GitCloner`] is the bundled implementation.

mod git;

pub use git::{CloneSource, GitCloner};

use std::path::Path;

use async_trait::async_trait;

/// Populates a destination directory from a spec string.
#[async_trait]
pub trait TemplateCloner: Send + Sync {
    /// Clone `spec` into `destination`.
    async fn materialize(&self, spec: &str, destination: &Path) -> anyhow::Result<()>;
}
