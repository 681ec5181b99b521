//! Arguments.
//!
//! This module contains the definition for the available command-line parameter.

use clap::{Parser, Subcommand};
use java_provisioner::options::{Arch, HeapSize, ImageType, InstallOptions, JvmImpl, Os, ReleaseType, Vendor};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(author, about)]
pub(crate) struct Args {
    /// Sets a custom config file
    #[clap(short, long, global = true, value_name = "file")]
    pub(crate) config: Option<String>,
    /// Suppress unnecessary information
    #[clap(short = 'q', long, global = true, action)]
    pub(crate) quiet: bool,
    /// Change level of verbosity (apply multiple times to increase level)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub(crate) verbose: u8,
    /// Print version information
    #[clap(short = 'V', long, action)]
    pub(crate) version: bool,
    /// The action to perform
    #[clap(subcommand)]
    pub(crate) action: Option<Action>,
}

/// The available actions.
#[derive(Debug, Subcommand)]
pub(crate) enum Action {
    /// Installs a java runtime (unless system java is acceptable)
    Install(InstallArgs),
    /// Runs an executable jar
    RunJar(RunJarArgs),
    /// Runs a main class on the given class path
    RunClass(RunClassArgs),
}

/// The arguments of [`Action::Install`].
#[derive(Debug, clap::Args)]
pub(crate) struct InstallArgs {
    #[clap(flatten)]
    pub(crate) options: OptionArgs,
    /// Only print what would be downloaded
    #[clap(short = 'n', long, action)]
    pub(crate) dry_run: bool,
}

/// The arguments of [`Action::RunJar`].
#[derive(Debug, clap::Args)]
pub(crate) struct RunJarArgs {
    /// The jar to run
    #[clap(value_name = "jar")]
    pub(crate) jar: String,
    #[clap(flatten)]
    pub(crate) runtime: RuntimeArgs,
    /// The arguments passed to the program
    #[clap(last = true, value_name = "args")]
    pub(crate) args: Vec<String>,
}

/// The arguments of [`Action::RunClass`].
#[derive(Debug, clap::Args)]
pub(crate) struct RunClassArgs {
    /// The fully qualified name of the main class
    #[clap(value_name = "class")]
    pub(crate) class_name: String,
    /// Adds an entry to the class path (apply multiple times to add more)
    #[clap(long = "cp", value_name = "path")]
    pub(crate) class_paths: Vec<String>,
    #[clap(flatten)]
    pub(crate) runtime: RuntimeArgs,
    /// The arguments passed to the program
    #[clap(last = true, value_name = "args")]
    pub(crate) args: Vec<String>,
}

/// The arguments that select the runtime to launch with.
#[derive(Debug, clap::Args)]
pub(crate) struct RuntimeArgs {
    /// The java executable or runtime home to use instead of the installed one
    #[clap(long, value_name = "path")]
    pub(crate) jre: Option<PathBuf>,
    /// The directory the runtime was installed into
    #[clap(long, value_name = "dir")]
    pub(crate) install_path: Option<String>,
}

/// The installation options that override the ones from the config file.
#[derive(Debug, clap::Args)]
pub(crate) struct OptionArgs {
    /// The major version of the runtime (8, 11, 17, etc.)
    #[clap(long, value_name = "version")]
    pub(crate) feature_version: Option<u32>,
    /// The operating system (defaults to the host's)
    #[clap(long, value_name = "os")]
    pub(crate) os: Option<Os>,
    /// The architecture (defaults to the host's)
    #[clap(long, value_name = "arch")]
    pub(crate) arch: Option<Arch>,
    /// The kind of binary (jre, jdk, etc.)
    #[clap(long, value_name = "type")]
    pub(crate) image_type: Option<ImageType>,
    /// The JVM implementation (hotspot, openj9, etc.)
    #[clap(long, value_name = "impl")]
    pub(crate) openjdk_impl: Option<JvmImpl>,
    /// The release type (ga or ea)
    #[clap(long, value_name = "type")]
    pub(crate) release_type: Option<ReleaseType>,
    /// The heap size variant (normal or large)
    #[clap(long, value_name = "size")]
    pub(crate) heap_size: Option<HeapSize>,
    /// The organisation that built the binary
    #[clap(long, value_name = "vendor")]
    pub(crate) vendor: Option<Vendor>,
    /// Use a system-wide java if there is one
    #[clap(long, action)]
    pub(crate) allow_system_java: bool,
    /// The directory to install into
    #[clap(long, value_name = "dir")]
    pub(crate) install_path: Option<String>,
    /// The base URL of the binary API
    #[clap(long, value_name = "url")]
    pub(crate) api_url: Option<String>,
    /// The expected SHA-256 digest of the artifact
    #[clap(long, value_name = "digest", conflicts_with = "skip_checksum")]
    pub(crate) sha256: Option<String>,
    /// Do not verify the checksum of the artifact
    #[clap(long, action)]
    pub(crate) skip_checksum: bool,
    /// Do not download if there is an installation already
    #[clap(long, action)]
    pub(crate) skip_if_installed: bool,
}

impl OptionArgs {
    /// Converts the given arguments into (partial) installation options; unset flags stay unset.
    pub(crate) fn to_options(&self) -> InstallOptions {
        InstallOptions {
            feature_version: self.feature_version,
            os: self.os,
            arch: self.arch,
            image_type: self.image_type,
            openjdk_impl: self.openjdk_impl,
            release_type: self.release_type,
            heap_size: self.heap_size,
            vendor: self.vendor,
            allow_system_java: self.allow_system_java.then_some(true),
            install_path: self.install_path.clone(),
            api_url: self.api_url.clone(),
            sha256: self.sha256.clone(),
            verify_checksum: self.skip_checksum.then_some(false),
            skip_if_installed: self.skip_if_installed.then_some(true),
        }
    }
}
