//! Manifest flattening and directory materialization
//!
//! Converts a settled manifest into a FIFO download queue while creating the
//! matching directory tree on disk in the same synchronous pass, so every
//! queued item's directory exists before the pipeline starts draining.

use crate::manifest::{Manifest, ManifestNode};
use crate::url::sanitize_path_component;
use crate::HarvestError;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use url::Url;

/// A document waiting to be downloaded into `directory`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DownloadItem {
    pub location: Url,
    pub directory: PathBuf,
}

/// FIFO of pending downloads
#[derive(Debug, Clone, Default)]
pub struct DownloadQueue {
    items: VecDeque<DownloadItem>,
}

impl DownloadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: DownloadItem) {
        self.items.push_back(item);
    }

    pub fn pop(&mut self) -> Option<DownloadItem> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DownloadItem> {
        self.items.iter()
    }
}

impl FromIterator<DownloadItem> for DownloadQueue {
    fn from_iter<I: IntoIterator<Item = DownloadItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for DownloadQueue {
    type Item = DownloadItem;
    type IntoIter = std::collections::vec_deque::IntoIter<DownloadItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Flattens a settled manifest into a download queue under `destination_root`
///
/// Each page becomes a directory named after its (sanitized) title, nested
/// under its parent page's directory. Documents are queued with the directory
/// of the page that referenced them; documents given directly as seeds are
/// queued under `destination_root` itself.
///
/// Directories are created with `create_dir_all`, so flattening the same
/// manifest twice into the same root yields equal queues.
///
/// # Errors
///
/// Returns `HarvestError::DirectoryCreate` on the first directory that cannot
/// be created. Nothing is downloaded in that case.
pub fn flatten(manifest: &Manifest, destination_root: &Path) -> Result<DownloadQueue, HarvestError> {
    let mut queue = DownloadQueue::new();

    for (seed, node) in manifest.iter() {
        tracing::debug!("Flattening manifest entry for seed {}", seed);
        visit(node, destination_root, &mut queue)?;
    }

    tracing::info!(
        "Flattened manifest into {} queued downloads under {}",
        queue.len(),
        destination_root.display()
    );

    Ok(queue)
}

fn visit(node: &ManifestNode, current: &Path, queue: &mut DownloadQueue) -> Result<(), HarvestError> {
    match node {
        ManifestNode::Page {
            title, children, ..
        } => {
            let directory = current.join(sanitize_path_component(title));
            std::fs::create_dir_all(&directory).map_err(|source| HarvestError::DirectoryCreate {
                path: directory.clone(),
                source,
            })?;
            tracing::debug!("Created directory {}", directory.display());

            for child in children.values() {
                visit(child, &directory, queue)?;
            }
        }
        ManifestNode::Document { location } => {
            queue.push(DownloadItem {
                location: location.clone(),
                directory: current.to_path_buf(),
            });
        }
    }

    Ok(())
}
