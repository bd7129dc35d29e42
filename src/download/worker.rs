//! Single-document transfer
//!
//! Streams one response body to disk chunk by chunk; nothing is buffered
//! beyond the chunk currently being written.

use crate::manifest::DownloadItem;
use crate::url::file_name_for;
use crate::DownloadError;
use futures::StreamExt;
use reqwest::Client;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Derives the on-disk path for a queued item
pub fn destination_for(item: &DownloadItem) -> Result<PathBuf, DownloadError> {
    let file_name = file_name_for(&item.location)
        .ok_or_else(|| DownloadError::InvalidFileName(item.location.to_string()))?;
    Ok(item.directory.join(file_name))
}

/// Picks a destination for `preferred` that no other queued item has claimed
///
/// Documents from different locations can share a final path segment. The
/// second and later ones get ` (1)`, ` (2)`, ... inserted before the
/// extension. Paths that already exist on disk are skipped as well.
pub fn unique_destination(preferred: &Path, claimed: &HashSet<PathBuf>) -> PathBuf {
    let is_free = |candidate: &Path| !claimed.contains(candidate) && !candidate.exists();
    if is_free(preferred) {
        return preferred.to_path_buf();
    }

    let stem = preferred
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = preferred
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1u32;
    loop {
        let candidate = preferred.with_file_name(format!("{} ({}){}", stem, n, extension));
        if is_free(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Sibling path a transfer streams into before it is moved into place
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(PARTIAL_SUFFIX);
    destination.with_file_name(name)
}

const PARTIAL_SUFFIX: &str = ".part";

/// Downloads one item to `destination`, returning the number of bytes written
///
/// The body is streamed into a `.part` sibling and renamed onto
/// `destination` only once the whole body is on disk, so `destination` is
/// never observed half-written. The transfer is bounded by `timeout` and
/// aborted when `cancel` fires. A failed transfer removes only its own
/// `.part` file.
pub async fn download_one(
    client: &Client,
    location: &Url,
    destination: &Path,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<u64, DownloadError> {
    let partial = partial_path(destination);

    let result = tokio::select! {
        _ = cancel.cancelled() => Err(DownloadError::Cancelled),
        outcome = tokio::time::timeout(timeout, transfer(client, location, &partial)) => {
            outcome.unwrap_or(Err(DownloadError::Timeout {
                secs: timeout.as_secs(),
            }))
        }
    };

    match result {
        Ok(written) => match tokio::fs::rename(&partial, destination).await {
            Ok(()) => Ok(written),
            Err(e) => {
                remove_partial(&partial).await;
                Err(e.into())
            }
        },
        Err(e) => {
            remove_partial(&partial).await;
            Err(e)
        }
    }
}

async fn transfer(client: &Client, location: &Url, partial: &Path) -> Result<u64, DownloadError> {
    let response = client.get(location.clone()).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Status {
            status: status.as_u16(),
        });
    }

    let mut file = tokio::fs::File::create(partial).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!("Removed partial file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Could not remove partial file {}: {}", path.display(), e),
    }
}
