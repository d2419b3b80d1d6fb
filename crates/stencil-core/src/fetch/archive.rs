//! Directory retrieval through the provider's tarball endpoint.

use std::path::Path;

use crate::archive::{ExtractSummary, extract_stream};
use crate::error::FetchResult;
use crate::http::{HttpTransport, fetch_following_redirects};
use crate::reference::Provider;

/// Download the tarball for `git_ref` and extract `subpath` (or the whole
/// repository when empty) into `dest_dir`.
///
/// Output is not rolled back on failure.
pub async fn fetch_archive(
    transport: &dyn HttpTransport,
    provider: Provider,
    owner: &str,
    repo: &str,
    git_ref: &str,
    subpath: &str,
    dest_dir: &Path,
) -> FetchResult<ExtractSummary> {
    let url = provider.archive_url(owner, repo, git_ref);
    let strip_prefixes = provider.strip_prefixes_for(repo, git_ref, subpath);
    tokio::fs::create_dir_all(dest_dir).await?;

    let response = fetch_following_redirects(transport, &url).await?;
    let summary = extract_stream(response.body, dest_dir, strip_prefixes.as_slice()).await?;

    if summary.is_empty() {
        tracing::warn!(
            url = %url,
            prefixes = ?strip_prefixes,
            "archive contained no entries under the requested path"
        );
    } else {
        tracing::debug!(
            url = %url,
            prefixes = ?strip_prefixes,
            files = summary.files,
            "extracted archive"
        );
    }
    Ok(summary)
}
