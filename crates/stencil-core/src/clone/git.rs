//! git2-backed clone collaborator.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;

use super::TemplateCloner;
use crate::reference::Provider;

/// Where to clone from, as understood by [`GitCloner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneSource {
    /// Repository URL or local path
    pub url: String,
    /// Branch to check out; remote HEAD when absent
    pub git_ref: Option<String>,
    /// Subdirectory to copy out of the checkout
    pub subdir: Option<String>,
}

impl CloneSource {
    /// Parse a clone spec.
    ///
    /// Supports:
    /// - canonical GitHub shorthand `owner/repo[/sub/path][#ref]`
    /// - literal git URLs (`https://`, `ssh://`, `git@host:...`, `file://`)
    ///   or local paths (`~/` expands to the home directory), each with an
    ///   optional `#ref`
    pub fn parse(spec: &str) -> anyhow::Result<Self> {
        let (location, git_ref) = match spec.split_once('#') {
            Some((location, r)) if !r.is_empty() => (location, Some(r.to_string())),
            Some((location, _)) => (location, None),
            None => (spec, None),
        };

        if let Some(rest) = location.strip_prefix("~/") {
            let home = dirs::home_dir().context("Could not determine home directory")?;
            return Ok(Self {
                url: home.join(rest).display().to_string(),
                git_ref,
                subdir: None,
            });
        }

        if Self::is_literal(location) {
            return Ok(Self {
                url: location.to_string(),
                git_ref,
                subdir: None,
            });
        }

        let segments: Vec<&str> = location.split('/').filter(|s| !s.is_empty()).collect();
        if segments.first().is_some_and(|s| s.contains(':')) {
            anyhow::bail!("Unsupported clone source '{}'", spec);
        }
        if segments.len() < 2 {
            anyhow::bail!("Cannot clone '{}': expected owner/repo or a git URL", spec);
        }
        let repo = segments[1].strip_suffix(".git").unwrap_or(segments[1]);
        let subdir = (segments.len() > 2).then(|| segments[2..].join("/"));

        Ok(Self {
            url: format!("https://{}/{}/{}.git", Provider::GitHub.host(), segments[0], repo),
            git_ref,
            subdir,
        })
    }

    fn is_literal(location: &str) -> bool {
        location.contains("://")
            || location.starts_with("git@")
            || location.starts_with("./")
            || location.starts_with("../")
            || location == "."
            || location == ".."
            || Path::new(location).is_absolute()
    }

    /// Whether the URL goes over the network (shallow fetch is possible).
    pub fn is_remote(&self) -> bool {
        ["https://", "http://", "ssh://", "git://", "git@"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
    }
}

/// Clones with libgit2 into a scratch directory, then copies the requested
/// tree into the destination without the `.git` directory.
#[derive(Debug, Clone)]
pub struct GitCloner {
    shallow: bool,
}

impl Default for GitCloner {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCloner {
    /// Create a cloner that fetches only the tip commit of remote repos.
    pub fn new() -> Self {
        Self { shallow: true }
    }

    /// Enable or disable depth-1 fetches.
    pub fn with_shallow(mut self, shallow: bool) -> Self {
        self.shallow = shallow;
        self
    }
}

#[async_trait]
impl TemplateCloner for GitCloner {
    async fn materialize(&self, spec: &str, destination: &Path) -> anyhow::Result<()> {
        let source = CloneSource::parse(spec)?;
        let destination = destination.to_path_buf();
        let shallow = self.shallow;

        tokio::task::spawn_blocking(move || clone_blocking(&source, &destination, shallow))
            .await
            .context("Clone task failed")?
    }
}

fn clone_blocking(source: &CloneSource, destination: &Path, shallow: bool) -> anyhow::Result<()> {
    let scratch = tempfile::tempdir().context("Failed to create scratch directory")?;
    let checkout = scratch.path().join("repo");

    let mut fetch = git2::FetchOptions::new();
    if shallow && source.is_remote() {
        fetch.depth(1);
    }

    let mut builder = git2::build::RepoBuilder::new();
    builder.fetch_options(fetch);
    if let Some(git_ref) = &source.git_ref {
        builder.branch(git_ref);
    }

    builder
        .clone(&source.url, &checkout)
        .with_context(|| match &source.git_ref {
            Some(r) => format!("Failed to clone {} at {}", source.url, r),
            None => format!("Failed to clone {}", source.url),
        })?;

    let root: PathBuf = match &source.subdir {
        Some(subdir) => checkout.join(subdir),
        None => checkout.clone(),
    };
    if !root.is_dir() {
        anyhow::bail!(
            "Directory '{}' not found in {}",
            source.subdir.as_deref().unwrap_or_default(),
            source.url
        );
    }

    std::fs::create_dir_all(destination).with_context(|| {
        format!("Failed to create destination: {}", destination.display())
    })?;
    copy_tree(&root, destination)?;

    tracing::debug!(url = %source.url, dest = %destination.display(), "clone copied");
    Ok(())
}

/// Recursively copy files and directories, skipping `.git` and symlinks.
fn copy_tree(from: &Path, to: &Path) -> anyhow::Result<()> {
    let entries = std::fs::read_dir(from)
        .with_context(|| format!("Failed to read directory: {}", from.display()))?;

    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        if name == ".git" {
            continue;
        }

        let src = entry.path();
        let dst = to.join(&name);
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            std::fs::create_dir_all(&dst)
                .with_context(|| format!("Failed to create directory: {}", dst.display()))?;
            copy_tree(&src, &dst)?;
        } else if file_type.is_file() {
            std::fs::copy(&src, &dst)
                .with_context(|| format!("Failed to copy {}", src.display()))?;
        }
    }

    Ok(())
}
