//! Gzipped tarball extraction.
//!
//! Archives are read as a stream: the response body is fed through a bounded
//! channel into a blocking task that decompresses and walks the tar entries,
//! writing only those under the strip prefix.

mod reader;

use std::io::Read;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use futures::StreamExt;

use crate::error::{FetchError, FetchResult};
use crate::http::BodyStream;
use reader::ChannelReader;

/// Number of body chunks buffered between the network and the extractor.
const CHANNEL_DEPTH: usize = 16;

/// Outcome of an extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Regular files written
    pub files: usize,
    /// Directories created
    pub directories: usize,
    /// Entries under the prefix that were not materialised (links, devices)
    pub skipped: usize,
}

impl ExtractSummary {
    /// Nothing was written.
    pub fn is_empty(&self) -> bool {
        self.files == 0 && self.directories == 0
    }
}

/// Extract a gzipped tar stream into `dest`.
///
/// Only entries whose path starts with one of `strip_prefixes` are written,
/// with that prefix removed; the first matching prefix wins. An entry equal
/// to the prefix itself is ignored.
pub fn extract_tar_gz<R: Read, P: AsRef<str>>(
    reader: R,
    dest: &Path,
    strip_prefixes: &[P],
) -> FetchResult<ExtractSummary> {
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    archive.set_preserve_permissions(false);
    archive.set_overwrite(true);

    let mut summary = ExtractSummary::default();
    let entries = archive
        .entries()
        .map_err(|e| FetchError::Extraction(format!("failed to read archive entries: {e}")))?;

    for entry in entries {
        let mut entry = entry
            .map_err(|e| FetchError::Extraction(format!("failed to read archive entry: {e}")))?;

        let entry_path = entry
            .path()
            .map_err(|e| FetchError::Extraction(format!("invalid entry path: {e}")))?
            .to_string_lossy()
            .replace('\\', "/");

        let Some(relative) = strip_prefixes
            .iter()
            .find_map(|prefix| entry_path.strip_prefix(prefix.as_ref()))
        else {
            continue;
        };
        let relative = relative.trim_end_matches('/');
        if relative.is_empty() {
            continue;
        }

        let target = dest.join(safe_relative_path(relative)?);

        match entry.header().entry_type() {
            tar::EntryType::Directory => {
                std::fs::create_dir_all(&target)?;
                summary.directories += 1;
            }
            tar::EntryType::Regular | tar::EntryType::Continuous => {
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                entry.unpack(&target).map_err(|e| {
                    FetchError::Extraction(format!("failed to unpack {entry_path}: {e}"))
                })?;
                summary.files += 1;
            }
            other => {
                tracing::debug!(path = %entry_path, kind = ?other, "skipping archive entry");
                summary.skipped += 1;
            }
        }
    }

    Ok(summary)
}

/// Stream a gzipped tarball body into [`extract_tar_gz`].
///
/// A network failure mid-stream is reported in preference to the truncated
/// archive error it causes in the extractor.
pub async fn extract_stream<P: AsRef<str>>(
    mut body: BodyStream,
    dest: &Path,
    strip_prefixes: &[P],
) -> FetchResult<ExtractSummary> {
    let (tx, rx) = tokio::sync::mpsc::channel(CHANNEL_DEPTH);
    let dest = dest.to_path_buf();
    let prefixes: Vec<String> = strip_prefixes
        .iter()
        .map(|p| p.as_ref().to_string())
        .collect();
    let worker = tokio::task::spawn_blocking(move || {
        extract_tar_gz(ChannelReader::new(rx), &dest, prefixes.as_slice())
    });

    let mut network_error = None;
    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(bytes) => {
                if tx.send(bytes).await.is_err() {
                    // extractor stopped early; its result carries the reason
                    break;
                }
            }
            Err(e) => {
                network_error = Some(e);
                break;
            }
        }
    }
    drop(tx);

    let extracted = worker
        .await
        .map_err(|e| FetchError::Extraction(format!("extraction task failed: {e}")))?;

    match network_error {
        Some(e) => Err(e),
        None => extracted,
    }
}

/// Reject entry paths that could escape the destination.
fn safe_relative_path(relative: &str) -> FetchResult<PathBuf> {
    let path = Path::new(relative);
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(FetchError::Extraction(format!(
                    "entry escapes destination: {relative}"
                )));
            }
        }
    }
    Ok(path.to_path_buf())
}
