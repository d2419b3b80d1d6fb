//! Supported hosting providers and their URL shapes.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// A source-hosting service the retrieval pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// github.com, reachable through the primary clone mechanism.
    GitHub,
    /// codeberg.org, reachable only over its HTTP endpoints.
    Codeberg,
}

impl Provider {
    /// All supported providers, in detection order.
    pub const ALL: [Provider; 2] = [Provider::GitHub, Provider::Codeberg];

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::Codeberg => "codeberg",
        }
    }

    /// Canonical host name.
    pub fn host(self) -> &'static str {
        match self {
            Self::GitHub => "github.com",
            Self::Codeberg => "codeberg.org",
        }
    }

    /// Shorthand prefix, e.g. `codeberg:user/repo`.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::GitHub => "github:",
            Self::Codeberg => "codeberg:",
        }
    }

    /// Whether the primary clone collaborator can serve this provider.
    pub fn has_primary_mechanism(self) -> bool {
        matches!(self, Self::GitHub)
    }

    /// Fixed segments that, right after `owner/repo`, introduce a ref in
    /// shorthand paths (`owner/repo/src/branch/<ref>/<subpath>`).
    pub fn path_ref_markers(self) -> Option<&'static [&'static str]> {
        match self {
            Self::GitHub => None,
            Self::Codeberg => Some(&["src", "branch"]),
        }
    }

    /// Look up a provider by host, accepting the `www.` alias.
    pub fn from_host(host: &str) -> Option<Self> {
        let host = host.trim_start_matches("www.");
        Self::ALL
            .into_iter()
            .find(|p| p.host().eq_ignore_ascii_case(host))
    }

    /// Split a provider prefix off a shorthand reference.
    pub fn strip_prefix(input: &str) -> Option<(Self, &str)> {
        Self::ALL
            .into_iter()
            .find_map(|p| input.strip_prefix(p.prefix()).map(|rest| (p, rest)))
    }

    /// Raw-content URL for a single file at a ref.
    ///
    /// Codeberg uses the ref-agnostic `raw/{ref}` route so branches, tags
    /// and commits all resolve. Ref and path are percent-encoded per segment.
    pub fn raw_url(self, owner: &str, repo: &str, git_ref: &str, path: &str) -> String {
        let git_ref = encode_path(git_ref);
        let path = encode_path(path);
        match self {
            Self::GitHub => format!(
                "https://raw.githubusercontent.com/{}/{}/{}/{}",
                owner, repo, git_ref, path
            ),
            Self::Codeberg => format!(
                "https://codeberg.org/{}/{}/raw/{}/{}",
                owner, repo, git_ref, path
            ),
        }
    }

    /// Gzipped tarball URL for a ref.
    pub fn archive_url(self, owner: &str, repo: &str, git_ref: &str) -> String {
        match self {
            Self::GitHub => format!(
                "https://codeload.github.com/{}/{}/tar.gz/{}",
                owner, repo, git_ref
            ),
            Self::Codeberg => format!(
                "https://codeberg.org/{}/{}/archive/{}.tar.gz",
                owner, repo, git_ref
            ),
        }
    }

    /// Top-level directory of the provider's tarball, with trailing slash.
    ///
    /// codeload names it `{repo}-{ref}` with any `/` in the ref replaced by
    /// `-`; Codeberg uses the bare repository name.
    pub fn archive_root(self, repo: &str, git_ref: &str) -> String {
        match self {
            Self::GitHub => format!("{}-{}/", repo, git_ref.replace('/', "-")),
            Self::Codeberg => format!("{}/", repo),
        }
    }

    /// Every top-level directory name the tarball may use, preferred first.
    ///
    /// codeload drops the leading `v` of version tags (`v1.2.0` ->
    /// `repo-1.2.0/`), which cannot be told apart from a branch by name.
    pub fn archive_roots(self, repo: &str, git_ref: &str) -> Vec<String> {
        let mut roots = vec![self.archive_root(repo, git_ref)];
        if self == Self::GitHub {
            if let Some(version) = git_ref
                .strip_prefix('v')
                .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
            {
                roots.push(self.archive_root(repo, version));
            }
        }
        roots
    }

    /// Strip prefix for extraction: archive root, plus `{subpath}/` if set.
    pub fn strip_prefix_for(self, repo: &str, git_ref: &str, subpath: &str) -> String {
        with_subpath(self.archive_root(repo, git_ref), subpath)
    }

    /// [`Provider::strip_prefix_for`] for each of [`Provider::archive_roots`].
    pub fn strip_prefixes_for(self, repo: &str, git_ref: &str, subpath: &str) -> Vec<String> {
        self.archive_roots(repo, git_ref)
            .into_iter()
            .map(|root| with_subpath(root, subpath))
            .collect()
    }
}

fn with_subpath(root: String, subpath: &str) -> String {
    if subpath.is_empty() {
        root
    } else {
        format!("{}{}/", root, subpath)
    }
}

/// Characters escaped inside a URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode each `/`-separated segment of `path`.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
