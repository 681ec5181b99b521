//! Errors.
//!
//! This module contains the error type shared by the acquisition pipeline and the launcher.

use std::io;
use std::path::PathBuf;

/// Convenience alias for results carrying an [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type for provisioning and launching a java runtime.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The operating system is not supported.
    #[error("unsupported platform '{0}'")]
    UnsupportedPlatform(String),

    /// The architecture is not supported.
    #[error("unsupported architecture '{0}'")]
    UnsupportedArchitecture(String),

    /// An option could not be parsed.
    #[error("invalid value '{value}' for option '{option}'")]
    InvalidOption {
        /// The name of the option.
        option: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The download stage failed.
    #[error("download of {url} failed: {source}")]
    DownloadFailed {
        /// The URL that was requested.
        url: String,
        /// The underlying cause.
        #[source]
        source: FetchError,
    },

    /// The downloaded artifact does not match its expected digest.
    #[error("checksum of {} does not match (expected: {expected}, got: {actual})", path.display())]
    ChecksumMismatch {
        /// The artifact that was verified.
        path: PathBuf,
        /// The expected digest.
        expected: String,
        /// The computed digest.
        actual: String,
    },

    /// The artifact could not be read while computing its digest.
    #[error("failed to read {} for verification: {source}", path.display())]
    ChecksumRead {
        /// The artifact that was verified.
        path: PathBuf,
        /// The underlying cause.
        #[source]
        source: io::Error,
    },

    /// The checksum file could not be read.
    #[error("failed to read checksum file {}: {source}", path.display())]
    ChecksumFileRead {
        /// The checksum file.
        path: PathBuf,
        /// The underlying cause.
        #[source]
        source: io::Error,
    },

    /// The artifact could not be moved into the install directory.
    #[error("failed to move {} to {}: {source}", from.display(), to.display())]
    RelocationFailed {
        /// The source path.
        from: PathBuf,
        /// The target path.
        to: PathBuf,
        /// The underlying cause.
        #[source]
        source: io::Error,
    },

    /// The archive could not be extracted.
    #[error("failed to extract {}: {source}", archive.display())]
    ExtractionFailed {
        /// The archive being extracted.
        archive: PathBuf,
        /// The underlying cause.
        #[source]
        source: io::Error,
    },

    /// No java runtime could be found.
    #[error("no java runtime found ({0}), please run the installation")]
    RuntimeNotFound(String),

    /// The install root contains more than one runtime.
    #[error("installation at {} is ambiguous {entries:?}, it failed or was run twice without cleanup; please install again", root.display())]
    AmbiguousInstallation {
        /// The install root.
        root: PathBuf,
        /// The entries found within the install root.
        entries: Vec<String>,
    },

    /// The operation was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// The java process could not be spawned.
    #[error(transparent)]
    Spawn(io::Error),
}

/// The error type of a [`Fetch`](crate::download::Fetch) implementation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FetchError {
    /// Transport level error.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server responded with status {0}")]
    Status(u16),

    /// Local I/O error while writing the response.
    #[error(transparent)]
    Io(#[from] io::Error),
}
