//! Java provisioner.
//!
//! This crate downloads, verifies and unpacks a java runtime from a binary API and launches java programs with it
//! (or with a system-wide java, if acceptable).

pub mod cancel;
pub mod checksum;
pub mod download;
pub mod error;
pub mod extract;
pub mod install;
pub mod launch;
pub mod locate;
pub mod options;
pub mod relocate;
pub mod system;
pub mod url;

pub use crate::cancel::CancelToken;
pub use crate::error::{Error, FetchError, Result};
pub use crate::install::{Installer, Plan};
pub use crate::launch::{LaunchSpec, Launcher, Provenance, RuntimeHandle, StderrMode};
pub use crate::options::{InstallOptions, InstallRequest};

use std::path::{Path, PathBuf};
use std::process::Child;

/// Installs a java runtime according to the given options (or the defaults).
///
/// Returns the install root, or `None` if system java is allowed and present.
pub fn install(options: Option<&InstallOptions>) -> Result<Option<PathBuf>> {
    let defaults = InstallOptions::default();
    let options = options.unwrap_or(&defaults);

    Installer::http()?.install(options)
}

/// Returns the install root for the default install path.
pub fn default_install_root() -> Result<PathBuf> {
    let install_path = InstallOptions::default().expand_install_path()?;

    Ok(install_path.join(options::INSTALL_ROOT_DIR))
}

/// Launches the given jar with the bundled runtime below the default install root (or system java).
pub fn execute_jar(jar_path: &str, args: &[String], jre_override: Option<&Path>) -> Result<Child> {
    Launcher::new(default_install_root()?).execute_jar(jar_path, args, jre_override)
}

/// Launches the given main class with the bundled runtime below the default install root (or system java).
pub fn execute_class_with_cp(
    class_name: &str,
    class_paths: &[String],
    args: &[String],
    jre_override: Option<&Path>,
) -> Result<Child> {
    Launcher::new(default_install_root()?).execute_class_with_cp(class_name, class_paths, args, jre_override)
}
