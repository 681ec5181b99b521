//! Version.
//!
//! This module contains the version information, as collected by the build script.

use std::fmt;

/// Structure to hold the version information.
#[derive(Debug)]
pub(crate) struct Version {
    /// The name of the package.
    pub(crate) pkg_name: &'static str,
    /// The version of the package.
    pub(crate) pkg_version: &'static str,
    /// The value that `git describe` returned.
    pub(crate) git_describe: &'static str,
    /// The version of the rust compiler.
    pub(crate) rustc_semver: &'static str,
    /// The target triple the binary was built for.
    pub(crate) target_triple: &'static str,
    /// The date of the build.
    pub(crate) build_date: &'static str,
}

impl Default for Version {
    fn default() -> Self {
        Self {
            pkg_name: env!("CARGO_PKG_NAME"),
            pkg_version: env!("CARGO_PKG_VERSION"),
            git_describe: env!("VERGEN_GIT_DESCRIBE"),
            rustc_semver: env!("VERGEN_RUSTC_SEMVER"),
            target_triple: env!("VERGEN_RUSTC_HOST_TRIPLE"),
            build_date: env!("VERGEN_BUILD_DATE"),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Version {
            pkg_name,
            pkg_version,
            git_describe,
            rustc_semver,
            target_triple,
            build_date,
        } = self;
        write!(
            f,
            "{pkg_name} {pkg_version} (git/{git_describe}) (rustc/{rustc_semver} {target_triple}) (built {build_date})"
        )
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use test_log::test;

    #[test]
    fn display() {
        let version = Version {
            pkg_name: "java-provisioner",
            pkg_version: "0.1.0",
            git_describe: "v0.1.0-3-gabcdef0",
            rustc_semver: "1.90.0",
            target_triple: "x86_64-unknown-linux-gnu",
            build_date: "2026-10-17",
        };

        assert_eq!(
            "java-provisioner 0.1.0 (git/v0.1.0-3-gabcdef0) (rustc/1.90.0 x86_64-unknown-linux-gnu) (built 2026-10-17)",
            version.to_string()
        );
    }

    #[test]
    fn default_names_package() {
        let version = Version::default();
        assert_eq!(env!("CARGO_PKG_NAME"), version.pkg_name);
        assert!(version.to_string().starts_with(env!("CARGO_PKG_NAME")));
    }
}
