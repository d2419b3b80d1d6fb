//! Parsed template specification types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::classify::is_single_file;
use super::normalize::{NormalizedReference, strip_git_suffix};
use super::Provider;
use crate::error::{FetchError, FetchResult};

/// Ref used when a reference names none.
pub const DEFAULT_REF: &str = "main";

/// A fully parsed template reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSpec {
    /// Hosting provider
    pub provider: Provider,
    /// Repository owner (user or organisation)
    pub owner: String,
    /// Repository name, without a `.git` suffix
    pub repo: String,
    /// Branch, tag or commit
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// `/`-joined path inside the repository; empty for the whole repo
    pub subpath: String,
}

impl TemplateSpec {
    /// Parse a canonical shorthand string for a known provider.
    ///
    /// Supports:
    /// - `owner/repo`
    /// - `owner/repo/sub/path`
    /// - `owner/repo[/...]#ref`
    /// - provider layouts such as `owner/repo/src/branch/<ref>/<subpath>`
    ///
    /// An explicit `#ref` always wins over a ref found in the path.
    pub fn parse(provider: Provider, canonical: &str) -> FetchResult<Self> {
        let (path, explicit_ref) = match canonical.split_once('#') {
            Some((path, r)) if !r.is_empty() => (path, Some(r)),
            Some((path, _)) => (path, None),
            None => (canonical, None),
        };

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < 2 {
            return Err(FetchError::InvalidReference(canonical.to_string()));
        }

        let owner = segments[0];
        let repo = strip_git_suffix(segments[1]);
        if repo.is_empty() {
            return Err(FetchError::InvalidReference(canonical.to_string()));
        }

        let rest = &segments[2..];
        let (path_ref, subpath) = match provider.path_ref_markers() {
            Some(markers)
                if rest.len() > markers.len() && rest[..markers.len()] == *markers =>
            {
                (Some(rest[markers.len()]), &rest[markers.len() + 1..])
            }
            _ => (None, rest),
        };

        let git_ref = explicit_ref.or(path_ref).unwrap_or(DEFAULT_REF);

        Ok(Self {
            provider,
            owner: owner.to_string(),
            repo: repo.to_string(),
            git_ref: git_ref.to_string(),
            subpath: subpath.join("/"),
        })
    }

    /// Parse a normalized reference, if it was tagged with a provider.
    pub fn from_normalized(reference: &NormalizedReference) -> FetchResult<Self> {
        let provider = reference
            .provider
            .ok_or_else(|| FetchError::InvalidReference(reference.canonical.clone()))?;
        Self::parse(provider, &reference.canonical)
    }

    /// Canonical shorthand for this spec, without provider prefix.
    pub fn canonical(&self) -> String {
        let mut out = format!("{}/{}", self.owner, self.repo);
        if !self.subpath.is_empty() {
            out.push('/');
            out.push_str(&self.subpath);
        }
        out.push('#');
        out.push_str(&self.git_ref);
        out
    }

    /// Whether the subpath names a single file.
    pub fn is_single_file(&self) -> bool {
        is_single_file(&self.subpath)
    }

    /// Raw-content URL for the subpath.
    pub fn raw_url(&self) -> String {
        self.provider
            .raw_url(&self.owner, &self.repo, &self.git_ref, &self.subpath)
    }

    /// Tarball URL for the ref.
    pub fn archive_url(&self) -> String {
        self.provider
            .archive_url(&self.owner, &self.repo, &self.git_ref)
    }

    /// Prefix stripped from archive entries during extraction.
    pub fn strip_prefix(&self) -> String {
        self.provider
            .strip_prefix_for(&self.repo, &self.git_ref, &self.subpath)
    }
}

/// A parsed spec bound to the directory it will be written into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalTarget {
    /// What to fetch
    pub spec: TemplateSpec,
    /// Derived once from the subpath
    pub is_single_file: bool,
    /// Destination directory
    pub destination: PathBuf,
}

impl RetrievalTarget {
    /// Bind a spec to a destination directory.
    pub fn new(spec: TemplateSpec, destination: impl AsRef<Path>) -> Self {
        let is_single_file = spec.is_single_file();
        Self {
            spec,
            is_single_file,
            destination: destination.as_ref().to_path_buf(),
        }
    }
}
