use crate::manifest::Manifest;
use crate::HarvestError;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Prefix of every run's root directory name
pub const RUN_DIR_PREFIX: &str = "downloads-";

/// Creates a fresh, timestamped run root under `root_dir`
///
/// The directory is named `downloads-<unix millis>`. It must not already
/// exist; every run starts from an empty tree.
pub fn create_run_root(root_dir: &Path) -> Result<PathBuf, HarvestError> {
    std::fs::create_dir_all(root_dir).map_err(|source| HarvestError::DirectoryCreate {
        path: root_dir.to_path_buf(),
        source,
    })?;

    let run_root = root_dir.join(format!(
        "{}{}",
        RUN_DIR_PREFIX,
        Utc::now().timestamp_millis()
    ));
    std::fs::create_dir(&run_root).map_err(|source| HarvestError::DirectoryCreate {
        path: run_root.clone(),
        source,
    })?;

    tracing::info!("Created run directory {}", run_root.display());
    Ok(run_root)
}

/// Writes the settled manifest to `path` for inspection
pub fn write_manifest(manifest: &Manifest, path: &Path) -> Result<(), HarvestError> {
    tracing::info!("Writing manifest to {}", path.display());
    manifest.write_to(path)?;
    tracing::debug!(
        "Manifest written: {} seed(s), {} document(s)",
        manifest.len(),
        manifest.document_count()
    );
    Ok(())
}
