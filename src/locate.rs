//! Runtime location.
//!
//! This module finds the java executable within an install root.

use crate::error::{Error, Result};
use crate::options::Os;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{instrument, trace};

// Prefix of entries that are filesystem artifacts rather than real entries (e.g. macOS resource forks).
#[doc(hidden)]
const JUNK_PREFIX: &str = "._";

// Names of entries that are filesystem artifacts rather than real entries.
#[doc(hidden)]
const JUNK_NAMES: &[&str] = &[".DS_Store"];

/// Returns the path of the java executable relative to a runtime home for the given operating system.
///
/// macOS runtimes nest the executable inside a bundle (`Contents/Home`), the others use a flat layout.
pub fn relative_bin_path(os: Os) -> Result<&'static [&'static str]> {
    match os {
        Os::Linux | Os::AlpineLinux => Ok(&["bin", "java"]),
        Os::Windows => Ok(&["bin", "java.exe"]),
        Os::Mac => Ok(&["Contents", "Home", "bin", "java"]),
        _ => Err(Error::UnsupportedPlatform(os.to_string())),
    }
}

/// Appends the platform-specific executable path to the given runtime home.
pub fn executable_in(home: &Path, os: Os) -> Result<PathBuf> {
    let mut path = home.to_path_buf();
    path.extend(relative_bin_path(os)?);

    Ok(path)
}

/// Locates the java executable within the given install root.
///
/// The install root must contain exactly one runtime folder (ignoring filesystem artifacts).
#[instrument(level = "trace")]
pub fn locate_runtime(install_root: &Path, os: Os) -> Result<PathBuf> {
    // check the platform first, it doesn't depend on the disc
    relative_bin_path(os)?;

    let entries = fs::read_dir(install_root).map_err(|err| Error::RuntimeNotFound(format!("{}: {err}", install_root.display())))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| Error::RuntimeNotFound(format!("{}: {err}", install_root.display())))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(JUNK_PREFIX) || JUNK_NAMES.contains(&name.as_str()) {
            trace!(%name, "skipping junk entry");
            continue;
        }
        names.push(name);
    }

    if names.len() > 1 {
        names.sort();
        return Err(Error::AmbiguousInstallation {
            root: install_root.to_path_buf(),
            entries: names,
        });
    }

    let Some(name) = names.first() else {
        return Err(Error::RuntimeNotFound(format!("{} is empty", install_root.display())));
    };
    executable_in(&install_root.join(name), os)
}
