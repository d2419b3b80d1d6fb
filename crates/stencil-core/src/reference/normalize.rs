//! Reference normalization.
//!
//! Turns every accepted textual form of a template reference into the
//! canonical `owner/repo[/subpath][#ref]` shorthand, tagged with the
//! provider it belongs to. Inputs that match no known provider pass through
//! untouched so the clone collaborator can still try them.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::Url;

use super::Provider;

/// A reference after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedReference {
    /// Provider the reference was recognised as, if any.
    pub provider: Option<Provider>,
    /// Canonical shorthand, or the trimmed input when unrecognised.
    pub canonical: String,
}

impl NormalizedReference {
    fn recognised(provider: Provider, canonical: String) -> Self {
        Self {
            provider: Some(provider),
            canonical,
        }
    }

    fn passthrough(input: &str) -> Self {
        Self {
            provider: None,
            canonical: input.to_string(),
        }
    }
}

/// Normalize a raw template reference.
///
/// Accepted forms:
/// - `owner/repo`, `owner/repo/sub/path`, each with an optional `#ref`
/// - `owner/repo#ref/sub/path` (rewritten to `owner/repo/sub/path#ref`)
/// - `github:owner/repo...`, `codeberg:owner/repo...`
/// - `git@github.com:owner/repo.git`, `git@codeberg.org:owner/repo.git`
/// - `https://github.com/owner/repo[/tree|blob/<ref>/...]`
/// - `https://codeberg.org/owner/repo[/src/branch/<ref>/...]`
///
/// Bare shorthand without a prefix belongs to GitHub. Local paths are never
/// shorthand.
pub fn normalize(input: &str) -> NormalizedReference {
    let input = input.trim();

    if is_local_path(input) {
        return NormalizedReference::passthrough(input);
    }

    if input.starts_with("https://") || input.starts_with("http://") {
        return normalize_url(input).unwrap_or_else(|| NormalizedReference::passthrough(input));
    }

    if let Some(rest) = input.strip_prefix("git@") {
        return normalize_ssh(rest).unwrap_or_else(|| NormalizedReference::passthrough(input));
    }

    if let Some((provider, rest)) = Provider::strip_prefix(input) {
        return NormalizedReference::recognised(provider, normalize_shorthand(rest));
    }

    if has_foreign_scheme(input) {
        return NormalizedReference::passthrough(input);
    }

    NormalizedReference::recognised(Provider::GitHub, normalize_shorthand(input))
}

/// Rewrite shorthand to canonical form: collapse empty segments, strip a
/// `.git` repo suffix and move a slash-bearing `#ref/sub` into the path.
pub(crate) fn normalize_shorthand(shorthand: &str) -> String {
    let (path, git_ref) = match shorthand.split_once('#') {
        Some((path, git_ref)) => (path, Some(git_ref)),
        None => (shorthand, None),
    };

    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if let Some(repo) = segments.get_mut(1) {
        *repo = strip_git_suffix(*repo);
    }

    let git_ref = match git_ref {
        Some(r) => match r.split_once('/') {
            Some((r, sub)) => {
                segments.extend(sub.split('/').filter(|s| !s.is_empty()));
                Some(r)
            }
            None => Some(r),
        },
        None => None,
    };

    compose(&segments, git_ref.filter(|r| !r.is_empty()))
}

/// `https://<host>/owner/repo/...` -> canonical shorthand.
fn normalize_url(input: &str) -> Option<NormalizedReference> {
    let url = Url::parse(input).ok()?;
    let provider = Provider::from_host(url.host_str()?)?;

    let decoded: Vec<String> = url
        .path_segments()?
        .filter(|s| !s.is_empty())
        .map(decode_segment)
        .collect();
    let segments: Vec<&str> = decoded.iter().map(String::as_str).collect();
    if segments.len() < 2 {
        return None;
    }

    let owner = segments[0];
    let repo = strip_git_suffix(segments[1]);
    let (view_ref, subpath) = split_view(provider, &segments[2..]);
    let fragment = url.fragment().filter(|f| !f.is_empty()).map(decode_segment);
    let git_ref = fragment.as_deref().or(view_ref);

    let mut parts = vec![owner, repo];
    parts.extend_from_slice(subpath);
    Some(NormalizedReference::recognised(
        provider,
        compose(&parts, git_ref),
    ))
}

/// `git@<host>:owner/repo.git[#ref]` -> canonical shorthand.
fn normalize_ssh(rest: &str) -> Option<NormalizedReference> {
    let (host, path) = rest.split_once(':')?;
    let provider = Provider::from_host(host)?;
    Some(NormalizedReference::recognised(
        provider,
        normalize_shorthand(path),
    ))
}

/// Recognise the browser view markers after `owner/repo`.
///
/// Returns the ref named by the view (if any) and the remaining subpath.
fn split_view<'a>(provider: Provider, rest: &'a [&'a str]) -> (Option<&'a str>, &'a [&'a str]) {
    match rest {
        ["tree" | "blob", git_ref, sub @ ..] => (Some(*git_ref), sub),
        ["src" | "raw", "branch" | "tag" | "commit", git_ref, sub @ ..]
            if provider == Provider::Codeberg =>
        {
            (Some(*git_ref), sub)
        }
        _ => (None, rest),
    }
}

fn compose(segments: &[&str], git_ref: Option<&str>) -> String {
    let path = segments.join("/");
    match git_ref {
        Some(r) => format!("{}#{}", path, r),
        None => path,
    }
}

pub(crate) fn strip_git_suffix(repo: &str) -> &str {
    repo.strip_suffix(".git").unwrap_or(repo)
}

fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(segment))
        .into_owned()
}

/// Absolute, relative, home-relative or drive-letter filesystem paths.
fn is_local_path(input: &str) -> bool {
    if input.starts_with('/')
        || input.starts_with("./")
        || input.starts_with("../")
        || input.starts_with("~/")
        || input.starts_with('\\')
        || input == "."
        || input == ".."
    {
        return true;
    }
    let bytes = input.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'/' | b'\\')
}

/// `gitlab:user/repo`, `ssh://...` and friends: a scheme-like prefix before
/// the first slash that no supported provider claims.
fn has_foreign_scheme(input: &str) -> bool {
    match input.split_once(':') {
        Some((scheme, _)) => !scheme.is_empty() && !scheme.contains('/'),
        None => false,
    }
}
