//! System java.
//!
//! This module contains the probe for a system-wide java installation.

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{instrument, trace};

/// Name of the java command on the `PATH`.
pub const JAVA_COMMAND: &str = "java";

// Name of the environment variable pointing to a java installation.
#[doc(hidden)]
const JAVA_HOME: &str = "JAVA_HOME";

// Name of the java executable below `<home>/bin`.
#[doc(hidden)]
const JAVA_EXECUTABLE: &str = if cfg!(windows) { "java.exe" } else { "java" };

/// The capability to find a system-wide java installation.
pub trait JavaHomeProbe: fmt::Debug {
    /// Returns the home of a system-wide java installation, if there is one.
    fn find_java_home(&self) -> Option<PathBuf>;
}

/// [`JavaHomeProbe`] implementation that consults `JAVA_HOME` first and then looks for `java` on the `PATH`.
#[derive(Debug)]
pub struct SystemJavaProbe {
    java_home: Option<OsString>,
}

impl SystemJavaProbe {
    /// Creates a new `SystemJavaProbe` with the given value of `JAVA_HOME`.
    pub fn with_java_home(java_home: Option<OsString>) -> Self {
        Self { java_home }
    }
}

impl Default for SystemJavaProbe {
    fn default() -> Self {
        Self::with_java_home(env::var_os(JAVA_HOME))
    }
}

impl JavaHomeProbe for SystemJavaProbe {
    #[instrument(level = "trace", ret)]
    fn find_java_home(&self) -> Option<PathBuf> {
        if let Some(home) = self.java_home.as_ref().filter(|home| !home.is_empty()) {
            let home = PathBuf::from(home);
            if has_java_executable(&home) {
                return Some(home);
            }
            trace!(home = %home.display(), "ignoring {JAVA_HOME}, no java executable");
        }

        // <home>/bin/java
        let java = which::which(JAVA_COMMAND).ok()?;
        let java = java.canonicalize().unwrap_or(java);
        java.parent().and_then(|bin| bin.parent()).map(PathBuf::from)
    }
}

// Whether the given home contains `bin/java` (`bin\java.exe` on windows).
#[doc(hidden)]
fn has_java_executable(home: &Path) -> bool {
    home.join("bin").join(JAVA_EXECUTABLE).is_file()
}

#[cfg(test)]
pub(crate) mod tests {

    use super::*;
    use std::cell::Cell;
    use std::fs;
    use tempfile::tempdir;
    use test_log::test;

    /// [`JavaHomeProbe`] implementation with a fixed answer that counts its invocations.
    #[derive(Debug, Default)]
    pub(crate) struct FixedProbe {
        home: Option<PathBuf>,
        pub(crate) calls: Cell<usize>,
    }

    impl FixedProbe {
        pub(crate) fn found(home: impl Into<PathBuf>) -> Self {
            Self {
                home: Some(home.into()),
                calls: Cell::new(0),
            }
        }

        pub(crate) fn missing() -> Self {
            Self::default()
        }
    }

    impl JavaHomeProbe for FixedProbe {
        fn find_java_home(&self) -> Option<PathBuf> {
            self.calls.set(self.calls.get() + 1);
            self.home.clone()
        }
    }

    #[test]
    fn java_home_without_java_is_ignored() {
        let tempdir = tempdir().unwrap();
        let probe = SystemJavaProbe::with_java_home(Some(tempdir.path().into()));

        // may still find java on the PATH, but never the empty home
        assert_ne!(Some(tempdir.path().to_path_buf()), probe.find_java_home());
    }

    #[test]
    fn java_home_with_java_is_used() {
        let tempdir = tempdir().unwrap();
        fs::create_dir(tempdir.path().join("bin")).unwrap();
        fs::write(tempdir.path().join("bin").join(JAVA_EXECUTABLE), "").unwrap();
        let probe = SystemJavaProbe::with_java_home(Some(tempdir.path().into()));

        assert_eq!(Some(tempdir.path().to_path_buf()), probe.find_java_home());
    }

    #[test]
    fn java_home_pointing_to_file_is_ignored() {
        let tempdir = tempdir().unwrap();
        let file = tempdir.path().join("java");
        fs::write(&file, "").unwrap();
        let probe = SystemJavaProbe::with_java_home(Some(file.clone().into()));

        assert_ne!(Some(file), probe.find_java_home());
    }
}
