//! Launch.
//!
//! This module contains the resolution of a runnable java executable and the spawning of java processes.

use crate::error::{Error, Result};
use crate::locate::{executable_in, locate_runtime};
use crate::options::{HostPlatform, Os};
use crate::system::{JAVA_COMMAND, JavaHomeProbe, SystemJavaProbe};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use tracing::{debug, instrument, trace};

/// Where a [`RuntimeHandle`] came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Provenance {
    /// Supplied explicitly by the caller.
    Override,
    /// Installed below the install root.
    Bundled,
    /// Found on the system.
    System,
}

/// A launch-ready java executable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuntimeHandle {
    /// The program to execute.
    pub program: PathBuf,
    /// Where the program came from.
    pub provenance: Provenance,
}

/// What to launch.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LaunchSpec {
    /// An executable jar.
    Jar {
        /// The path of the jar.
        jar_path: String,
        /// The arguments passed to the program.
        args: Vec<String>,
    },
    /// A main class on an explicit class path.
    Class {
        /// The fully qualified name of the main class.
        class_name: String,
        /// The class path entries.
        class_paths: Vec<String>,
        /// The arguments passed to the program.
        args: Vec<String>,
    },
}

impl LaunchSpec {
    /// Returns the java command line (without the program itself), joining class path entries with `separator`.
    pub fn argv(&self, separator: char) -> Vec<String> {
        match self {
            LaunchSpec::Jar { jar_path, args } => {
                let mut argv = vec!["-jar".to_string(), jar_path.clone()];
                argv.extend(args.iter().cloned());
                argv
            }
            LaunchSpec::Class {
                class_name,
                class_paths,
                args,
            } => {
                let class_path = class_paths.join(&separator.to_string());
                let mut argv = vec!["-cp".to_string(), class_path, class_name.clone()];
                argv.extend(args.iter().cloned());
                argv
            }
        }
    }
}

// Class path separator of the host, used when the operating system is unknown.
#[doc(hidden)]
const HOST_CLASS_PATH_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// Returns the class path separator for the given operating system.
pub fn class_path_separator(os: Os) -> char {
    match os {
        Os::Windows => ';',
        _ => ':',
    }
}

/// Resolves the java executable to launch.
///
/// The order is: the explicit override, the runtime below the install root, system java. An override that is a
/// directory is treated as a runtime home, anything else is used as-is.
#[instrument(level = "trace", skip(probe), ret)]
pub fn resolve_runtime(
    jre_override: Option<&Path>,
    install_root: &Path,
    probe: &dyn JavaHomeProbe,
    os: Os,
) -> Result<RuntimeHandle> {
    if let Some(jre_override) = jre_override {
        let program = if jre_override.is_dir() {
            executable_in(jre_override, os)?
        } else {
            jre_override.to_path_buf()
        };
        return Ok(RuntimeHandle {
            program,
            provenance: Provenance::Override,
        });
    }

    let err = match locate_runtime(install_root, os) {
        Ok(program) => {
            return Ok(RuntimeHandle {
                program,
                provenance: Provenance::Bundled,
            });
        }
        Err(err) => err,
    };
    trace!(%err, "no bundled runtime");

    if let Some(home) = probe.find_java_home() {
        debug!(home = %home.display(), "falling back to system java");
        return Ok(RuntimeHandle {
            program: PathBuf::from(JAVA_COMMAND),
            provenance: Provenance::System,
        });
    }

    Err(err)
}

/// What happens to the standard error of a launched process.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum StderrMode {
    /// Forwarded to the standard error of this process.
    #[default]
    Inherit,
    /// Exposed on the returned [`Child`].
    Piped,
}

impl From<StderrMode> for Stdio {
    fn from(mode: StderrMode) -> Self {
        match mode {
            StderrMode::Inherit => Stdio::inherit(),
            StderrMode::Piped => Stdio::piped(),
        }
    }
}

/// The launcher spawns java processes.
#[derive(Debug)]
pub struct Launcher {
    host: HostPlatform,
    install_root: PathBuf,
    os: Option<Os>,
    probe: Box<dyn JavaHomeProbe>,
    stderr: StderrMode,
}

impl Launcher {
    /// Creates a new `Launcher` for runtimes below the given install root on the host platform.
    pub fn new(install_root: impl Into<PathBuf>) -> Self {
        Self {
            host: HostPlatform::current(),
            install_root: install_root.into(),
            os: None,
            probe: Box::new(SystemJavaProbe::default()),
            stderr: StderrMode::default(),
        }
    }

    /// Sets the host platform the operating system is derived from, unless set explicitly.
    pub fn host(&mut self, host: HostPlatform) -> &mut Self {
        self.host = host;

        self
    }

    /// Sets the operating system that determines executable layout and class path separator.
    pub fn os(&mut self, os: Os) -> &mut Self {
        self.os = Some(os);

        self
    }

    /// Sets the system java probe.
    pub fn probe(&mut self, probe: Box<dyn JavaHomeProbe>) -> &mut Self {
        self.probe = probe;

        self
    }

    /// Sets what happens to the standard error of launched processes.
    pub fn stderr(&mut self, stderr: StderrMode) -> &mut Self {
        self.stderr = stderr;

        self
    }

    /// Launches the given jar.
    pub fn execute_jar(&self, jar_path: &str, args: &[String], jre_override: Option<&Path>) -> Result<Child> {
        let spec = LaunchSpec::Jar {
            jar_path: jar_path.to_string(),
            args: args.to_vec(),
        };

        self.spawn(&spec, jre_override)
    }

    /// Launches the given main class with the given class path.
    pub fn execute_class_with_cp(
        &self,
        class_name: &str,
        class_paths: &[String],
        args: &[String],
        jre_override: Option<&Path>,
    ) -> Result<Child> {
        let spec = LaunchSpec::Class {
            class_name: class_name.to_string(),
            class_paths: class_paths.to_vec(),
            args: args.to_vec(),
        };

        self.spawn(&spec, jre_override)
    }

    /// Resolves the runtime and spawns it with the given launch spec, returning the live process.
    #[instrument(level = "trace", skip(self))]
    pub fn spawn(&self, spec: &LaunchSpec, jre_override: Option<&Path>) -> Result<Child> {
        // the platform only matters for locating a runtime, not for an override executable
        let os = self.os.map_or_else(|| self.host.os(), Ok);
        let (runtime, separator) = match os {
            Ok(os) => {
                let runtime = resolve_runtime(jre_override, &self.install_root, self.probe.as_ref(), os)?;
                (runtime, class_path_separator(os))
            }
            Err(err) => match jre_override {
                Some(jre_override) if !jre_override.is_dir() => {
                    trace!(%err, "unknown platform, using override as-is");
                    let runtime = RuntimeHandle {
                        program: jre_override.to_path_buf(),
                        provenance: Provenance::Override,
                    };
                    (runtime, HOST_CLASS_PATH_SEPARATOR)
                }
                _ => return Err(err),
            },
        };
        let argv = spec.argv(separator);
        debug!(program = %runtime.program.display(), provenance = ?runtime.provenance, ?argv);

        let mut cmd = Command::new(&runtime.program);
        cmd.args(&argv);
        cmd.stderr(self.stderr);

        cmd.spawn().map_err(Error::Spawn)
    }
}
