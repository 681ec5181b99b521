//! Relocation.
//!
//! This module moves a downloaded artifact out of the staging directory.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Moves the given artifact into the target directory (keeping its file name) and returns the new path.
///
/// An existing file with the same name is overwritten. Failing to delete the source afterwards is only logged.
#[instrument(level = "trace")]
pub fn relocate(artifact: &Path, target_dir: &Path) -> Result<PathBuf> {
    let Some(file_name) = artifact.file_name() else {
        return Err(Error::RelocationFailed {
            from: artifact.to_path_buf(),
            to: target_dir.to_path_buf(),
            source: std::io::Error::other("artifact has no file name"),
        });
    };
    let dest = target_dir.join(file_name);
    let failed = |source: std::io::Error| Error::RelocationFailed {
        from: artifact.to_path_buf(),
        to: dest.clone(),
        source,
    };

    fs::create_dir_all(target_dir).map_err(failed)?;
    if dest.exists() {
        debug!(dest = %dest.display(), "overwriting existing file");
    }
    fs::copy(artifact, &dest).map_err(failed)?;

    if let Err(err) = fs::remove_file(artifact) {
        warn!(?err, artifact = %artifact.display(), "failed to delete relocated artifact");
    }

    Ok(dest)
}
