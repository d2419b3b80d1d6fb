//! Single-file retrieval over the provider's raw-content endpoint.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::error::{FetchError, FetchResult};
use crate::http::{HttpTransport, fetch_following_redirects};
use crate::reference::Provider;

/// Download one file into `dest_dir`, named after the last segment of
/// `filepath`.
///
/// The destination is always a directory; the file goes inside it. Returns
/// the path written.
pub async fn fetch_raw_file(
    transport: &dyn HttpTransport,
    provider: Provider,
    owner: &str,
    repo: &str,
    git_ref: &str,
    filepath: &str,
    dest_dir: &Path,
) -> FetchResult<PathBuf> {
    let file_name = filepath
        .rsplit('/')
        .find(|s| !s.is_empty())
        .ok_or_else(|| FetchError::InvalidReference(filepath.to_string()))?;

    let url = provider.raw_url(owner, repo, git_ref, filepath);
    tokio::fs::create_dir_all(dest_dir).await?;

    let response = match fetch_following_redirects(transport, &url).await {
        Ok(response) => response,
        Err(FetchError::HttpStatus { status: 404, url }) => {
            return Err(FetchError::NotFound { url });
        }
        Err(e) => return Err(e),
    };

    let target = dest_dir.join(file_name);
    let mut file = tokio::fs::File::create(&target).await?;
    let mut body = response.body;
    while let Some(chunk) = body.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;

    tracing::debug!(url = %url, path = %target.display(), "wrote raw file");
    Ok(target)
}
