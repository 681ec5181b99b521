//! Checksum.
//!
//! This module contains code to create a checksum (SHA256) of a downloaded artifact and to verify it.

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, Result as IoResult};
use std::path::{Path, PathBuf};
use tracing::{instrument, trace};

/// Suffix of the companion file that holds the checksum of an artifact.
pub const CHECKSUM_FILE_SUFFIX: &str = ".sha256.txt";

/// Calculates the checksum (SHA256) for the given file.
pub fn checksum(path: &Path) -> IoResult<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    let hash = hasher.finalize();
    let checksum = base16ct::lower::encode_string(&hash);

    Ok(checksum)
}

/// Returns the path of the companion checksum file for the given artifact.
pub fn checksum_file_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(CHECKSUM_FILE_SUFFIX);
    PathBuf::from(name)
}

/// Verifies the given file against the expected checksum.
///
/// The comparison is case-sensitive.
#[instrument(level = "trace")]
pub fn verify(path: &Path, expected: &str) -> Result<()> {
    let actual = checksum(path).map_err(|source| Error::ChecksumRead {
        path: path.to_path_buf(),
        source,
    })?;
    trace!(%actual);

    if actual != expected {
        return Err(Error::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }

    Ok(())
}

/// Verifies the given file against the first token of the given checksum file (`<digest>  <file name>`).
#[instrument(level = "trace")]
pub fn verify_with_file(path: &Path, checksum_file: &Path) -> Result<()> {
    let contents = fs::read_to_string(checksum_file).map_err(|source| Error::ChecksumFileRead {
        path: checksum_file.to_path_buf(),
        source,
    })?;
    let expected = contents.split_whitespace().next().unwrap_or_default();

    verify(path, expected)
}
