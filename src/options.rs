//! Installation options.
//!
//! This module contains the partial, user-supplied [`InstallOptions`] and their resolution into a fully-populated
//! [`InstallRequest`].

use crate::error::{Error, Result};
use crate::url::DEFAULT_API_URL;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::env;
use std::fmt;
use std::path::{self, PathBuf};
use std::str::FromStr;

/// Name of the directory (below the install path) that holds the extracted runtime.
pub const INSTALL_ROOT_DIR: &str = "jre";

/// Name of the directory (below the install path) that receives downloads before relocation.
pub const STAGING_DIR: &str = ".staging";

// Declares an enumeration whose variants map 1:1 onto the lower-case ids used by the binary API.
macro_rules! id_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $err:expr, {
            $($(#[$vmeta:meta])* $variant:ident => $id:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// All known values.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the id as used by the binary API.
            pub fn id(&self) -> &'static str {
                match self {
                    $(Self::$variant => $id),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.id())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(value: &str) -> Result<Self> {
                let value = value.trim().to_lowercase();
                match value.as_str() {
                    $($id => Ok(Self::$variant),)+
                    _ => Err(($err)(value)),
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let value = String::deserialize(deserializer)?;
                value.parse().map_err(de::Error::custom)
            }
        }
    };
}

id_enum! {
    /// Supported operating systems.
    Os, Error::UnsupportedPlatform, {
        Linux => "linux",
        Windows => "windows",
        Mac => "mac",
        Solaris => "solaris",
        Aix => "aix",
        AlpineLinux => "alpine-linux",
    }
}

id_enum! {
    /// Supported architectures.
    Arch, Error::UnsupportedArchitecture, {
        X64 => "x64",
        X86 => "x86",
        X32 => "x32",
        Ppc64 => "ppc64",
        Ppc64le => "ppc64le",
        S390x => "s390x",
        Aarch64 => "aarch64",
        Arm => "arm",
        Sparcv9 => "sparcv9",
        Riscv64 => "riscv64",
    }
}

id_enum! {
    /// Kinds of binary distributions.
    ImageType, |value| Error::InvalidOption { option: "image_type", value }, {
        Jre => "jre",
        Jdk => "jdk",
        TestImage => "testimage",
        DebugImage => "debugimage",
        StaticLibs => "staticlibs",
        Sources => "sources",
    }
}

id_enum! {
    /// JVM implementations.
    JvmImpl, |value| Error::InvalidOption { option: "openjdk_impl", value }, {
        Hotspot => "hotspot",
        OpenJ9 => "openj9",
        Dragonwell => "dragonwell",
    }
}

id_enum! {
    /// Release types: general availability or early access.
    ReleaseType, |value| Error::InvalidOption { option: "release_type", value }, {
        Ga => "ga",
        Ea => "ea",
    }
}

id_enum! {
    /// Heap size variants.
    HeapSize, |value| Error::InvalidOption { option: "heap_size", value }, {
        Normal => "normal",
        Large => "large",
    }
}

id_enum! {
    /// Organisations publishing binaries.
    Vendor, |value| Error::InvalidOption { option: "vendor", value }, {
        AdoptOpenJdk => "adoptopenjdk",
        OpenJdk => "openjdk",
        Eclipse => "eclipse",
        Alibaba => "alibaba",
        Ibm => "ibm",
    }
}

// Maps the host operating system (as reported by `std::env::consts::OS`) onto the supported operating systems.
#[doc(hidden)]
const HOST_OS_TABLE: &[(&str, Os)] = &[
    ("aix", Os::Aix),
    ("illumos", Os::Solaris),
    ("linux", Os::Linux),
    ("macos", Os::Mac),
    ("solaris", Os::Solaris),
    ("windows", Os::Windows),
];

// Aliases for host architectures that are not named like the supported architectures.
#[doc(hidden)]
const HOST_ARCH_ALIASES: &[(&str, Arch)] = &[
    ("arm64", Arch::Aarch64),
    ("i686", Arch::X32),
    ("ia32", Arch::X32),
    ("powerpc64", Arch::Ppc64),
    ("s390", Arch::S390x),
    ("sparc64", Arch::Sparcv9),
    ("x86_64", Arch::X64),
];

/// The platform identifiers of a host, injectable for tests.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HostPlatform {
    /// The operating system identifier (e.g. `linux`, `macos`, `windows`).
    pub os: &'static str,
    /// The architecture identifier (e.g. `x86_64`, `aarch64`).
    pub arch: &'static str,
}

impl HostPlatform {
    /// Returns the platform this program runs on.
    pub fn current() -> Self {
        // std reports powerpc64 for both endiannesses
        let arch = if cfg!(all(target_arch = "powerpc64", target_endian = "little")) {
            "ppc64le"
        } else {
            env::consts::ARCH
        };

        Self { os: env::consts::OS, arch }
    }

    /// Maps the host operating system onto [`Os`].
    pub fn os(&self) -> Result<Os> {
        HOST_OS_TABLE
            .iter()
            .find(|(id, _)| *id == self.os)
            .map(|(_, os)| *os)
            .ok_or_else(|| Error::UnsupportedPlatform(self.os.to_string()))
    }

    /// Maps the host architecture onto [`Arch`].
    pub fn arch(&self) -> Result<Arch> {
        if let Ok(arch) = self.arch.parse::<Arch>() {
            return Ok(arch);
        }

        HOST_ARCH_ALIASES
            .iter()
            .find(|(id, _)| *id == self.arch)
            .map(|(_, arch)| *arch)
            .ok_or_else(|| Error::UnsupportedArchitecture(self.arch.to_string()))
    }
}

/// Where the expected digest of a downloaded artifact comes from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChecksumSource {
    /// A companion `<artifact url>.sha256.txt` published next to the artifact.
    Companion,
    /// A digest supplied by the caller.
    Inline(String),
    /// No verification.
    Skip,
}

/// The partial configuration of an installation; absent fields are resolved by [`InstallOptions::resolve`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallOptions {
    /// The major version of the runtime (8, 11, 17, etc.).
    #[serde(default, deserialize_with = "feature_version_deser")]
    pub feature_version: Option<u32>,
    /// The operating system (defaults to the host's).
    pub os: Option<Os>,
    /// The architecture (defaults to the host's).
    pub arch: Option<Arch>,
    /// The kind of binary.
    pub image_type: Option<ImageType>,
    /// The JVM implementation.
    pub openjdk_impl: Option<JvmImpl>,
    /// The release type.
    pub release_type: Option<ReleaseType>,
    /// The heap size variant.
    pub heap_size: Option<HeapSize>,
    /// The organisation that built the binary.
    pub vendor: Option<Vendor>,
    /// Whether an existing system-wide java makes the installation unnecessary.
    pub allow_system_java: Option<bool>,
    /// The directory to install into.
    pub install_path: Option<String>,
    /// The base URL of the binary API.
    pub api_url: Option<String>,
    /// The expected SHA-256 digest of the artifact.
    pub sha256: Option<String>,
    /// Whether to verify the artifact against its companion checksum file.
    pub verify_checksum: Option<bool>,
    /// Whether an existing, intact installation makes the download unnecessary.
    pub skip_if_installed: Option<bool>,
}

// Deserializes the field [InstallOptions::feature_version] from either unsigned integer, string or null.
// see https://serde.rs/string-or-struct.html
#[doc(hidden)]
fn feature_version_deser<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    struct UintOrString;

    impl<'de> Visitor<'de> for UintOrString {
        type Value = Option<u32>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("unsigned integer or string")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Option<u32>, E>
        where
            E: de::Error,
        {
            value.trim().parse().map(Some).map_err(E::custom)
        }

        fn visit_u64<E>(self, value: u64) -> std::result::Result<Option<u32>, E>
        where
            E: de::Error,
        {
            u32::try_from(value).map(Some).map_err(E::custom)
        }

        fn visit_unit<E>(self) -> std::result::Result<Option<u32>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> std::result::Result<Option<u32>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> std::result::Result<Option<u32>, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(UintOrString)
}

// The defaults for every field that is not derived from the host.
#[doc(hidden)]
struct Defaults {
    feature_version: u32,
    image_type: ImageType,
    openjdk_impl: JvmImpl,
    release_type: ReleaseType,
    heap_size: HeapSize,
    vendor: Vendor,
    allow_system_java: bool,
    install_path: &'static str,
    verify_checksum: bool,
    skip_if_installed: bool,
}

#[doc(hidden)]
const DEFAULTS: Defaults = Defaults {
    feature_version: 8,
    image_type: ImageType::Jre,
    openjdk_impl: JvmImpl::Hotspot,
    release_type: ReleaseType::Ga,
    heap_size: HeapSize::Normal,
    vendor: Vendor::AdoptOpenJdk,
    allow_system_java: false,
    install_path: ".",
    verify_checksum: true,
    skip_if_installed: false,
};

impl InstallOptions {
    /// Returns new options where every field set in `self` wins over the one in `fallback`.
    pub fn overlay(self, fallback: InstallOptions) -> InstallOptions {
        InstallOptions {
            feature_version: self.feature_version.or(fallback.feature_version),
            os: self.os.or(fallback.os),
            arch: self.arch.or(fallback.arch),
            image_type: self.image_type.or(fallback.image_type),
            openjdk_impl: self.openjdk_impl.or(fallback.openjdk_impl),
            release_type: self.release_type.or(fallback.release_type),
            heap_size: self.heap_size.or(fallback.heap_size),
            vendor: self.vendor.or(fallback.vendor),
            allow_system_java: self.allow_system_java.or(fallback.allow_system_java),
            install_path: self.install_path.or(fallback.install_path),
            api_url: self.api_url.or(fallback.api_url),
            sha256: self.sha256.or(fallback.sha256),
            verify_checksum: self.verify_checksum.or(fallback.verify_checksum),
            skip_if_installed: self.skip_if_installed.or(fallback.skip_if_installed),
        }
    }

    /// Whether system java is acceptable, without resolving anything else.
    pub fn allow_system_java(&self) -> bool {
        self.allow_system_java.unwrap_or(DEFAULTS.allow_system_java)
    }

    /// Resolves these options into a fully-populated [`InstallRequest`] for the given host.
    pub fn resolve(&self, host: &HostPlatform) -> Result<InstallRequest> {
        let feature_version = self.feature_version.unwrap_or(DEFAULTS.feature_version);
        if feature_version == 0 {
            return Err(Error::InvalidOption {
                option: "feature_version",
                value: feature_version.to_string(),
            });
        }

        let os = match self.os {
            Some(os) => os,
            None => host.os()?,
        };
        let arch = match self.arch {
            Some(arch) => arch,
            None => host.arch()?,
        };

        let checksum = if let Some(ref sha256) = self.sha256 {
            ChecksumSource::Inline(sha256.trim().to_string())
        } else if self.verify_checksum.unwrap_or(DEFAULTS.verify_checksum) {
            ChecksumSource::Companion
        } else {
            ChecksumSource::Skip
        };

        Ok(InstallRequest {
            feature_version,
            os,
            arch,
            image_type: self.image_type.unwrap_or(DEFAULTS.image_type),
            openjdk_impl: self.openjdk_impl.unwrap_or(DEFAULTS.openjdk_impl),
            release_type: self.release_type.unwrap_or(DEFAULTS.release_type),
            heap_size: self.heap_size.unwrap_or(DEFAULTS.heap_size),
            vendor: self.vendor.unwrap_or(DEFAULTS.vendor),
            allow_system_java: self.allow_system_java(),
            install_path: self.expand_install_path()?,
            api_url: self.api_url.clone().unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            checksum,
            skip_if_installed: self.skip_if_installed.unwrap_or(DEFAULTS.skip_if_installed),
        })
    }

    /// Returns the install path with variables expanded and made absolute.
    pub fn expand_install_path(&self) -> Result<PathBuf> {
        let install_path = self.install_path.as_deref().unwrap_or(DEFAULTS.install_path);
        let invalid = || Error::InvalidOption {
            option: "install_path",
            value: install_path.to_string(),
        };
        let expanded = shellexpand::full(install_path).map_err(|_| invalid())?;
        path::absolute(expanded.as_ref()).map_err(|_| invalid())
    }
}

/// The fully resolved parameters of an installation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InstallRequest {
    /// The major version of the runtime.
    pub feature_version: u32,
    /// The operating system.
    pub os: Os,
    /// The architecture.
    pub arch: Arch,
    /// The kind of binary.
    pub image_type: ImageType,
    /// The JVM implementation.
    pub openjdk_impl: JvmImpl,
    /// The release type.
    pub release_type: ReleaseType,
    /// The heap size variant.
    pub heap_size: HeapSize,
    /// The organisation that built the binary.
    pub vendor: Vendor,
    /// Whether an existing system-wide java makes the installation unnecessary.
    pub allow_system_java: bool,
    /// The absolute directory to install into.
    pub install_path: PathBuf,
    /// The base URL of the binary API.
    pub api_url: String,
    /// Where the expected digest comes from.
    pub checksum: ChecksumSource,
    /// Whether an existing, intact installation makes the download unnecessary.
    pub skip_if_installed: bool,
}

impl InstallRequest {
    /// Returns the directory that holds the extracted runtime.
    pub fn install_root(&self) -> PathBuf {
        self.install_path.join(INSTALL_ROOT_DIR)
    }

    /// Returns the directory that receives downloads before relocation.
    pub fn staging_dir(&self) -> PathBuf {
        self.install_path.join(STAGING_DIR)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use test_log::test;

    const LINUX_X64: HostPlatform = HostPlatform { os: "linux", arch: "x86_64" };

    #[test]
    fn resolve_defaults() {
        let request = InstallOptions::default().resolve(&LINUX_X64).unwrap();
        assert_eq!(8, request.feature_version);
        assert_eq!(Os::Linux, request.os);
        assert_eq!(Arch::X64, request.arch);
        assert_eq!(ImageType::Jre, request.image_type);
        assert_eq!(JvmImpl::Hotspot, request.openjdk_impl);
        assert_eq!(ReleaseType::Ga, request.release_type);
        assert_eq!(HeapSize::Normal, request.heap_size);
        assert_eq!(Vendor::AdoptOpenJdk, request.vendor);
        assert!(!request.allow_system_java);
        assert!(request.install_path.is_absolute());
        assert_eq!(DEFAULT_API_URL, request.api_url);
        assert_eq!(ChecksumSource::Companion, request.checksum);
        assert!(!request.skip_if_installed);
    }

    #[test]
    fn resolve_keeps_given_values() {
        let options = InstallOptions {
            feature_version: Some(17),
            os: Some(Os::AlpineLinux),
            arch: Some(Arch::Aarch64),
            image_type: Some(ImageType::Jdk),
            vendor: Some(Vendor::Eclipse),
            allow_system_java: Some(true),
            install_path: Some("/opt/runtime".to_string()),
            ..Default::default()
        };
        // the host would not resolve, but os and arch are given
        let host = HostPlatform { os: "plan9", arch: "mips" };
        let request = options.resolve(&host).unwrap();
        assert_eq!(17, request.feature_version);
        assert_eq!(Os::AlpineLinux, request.os);
        assert_eq!(Arch::Aarch64, request.arch);
        assert_eq!(ImageType::Jdk, request.image_type);
        assert_eq!(Vendor::Eclipse, request.vendor);
        assert!(request.allow_system_java);
        assert_eq!(PathBuf::from("/opt/runtime").join("jre"), request.install_root());
        assert_eq!(PathBuf::from("/opt/runtime").join(".staging"), request.staging_dir());
    }

    #[test]
    fn resolve_zero_feature_version() {
        let options = InstallOptions {
            feature_version: Some(0),
            ..Default::default()
        };
        let err = options.resolve(&LINUX_X64).unwrap_err();
        assert!(matches!(err, Error::InvalidOption { option: "feature_version", .. }));
    }

    #[test]
    fn resolve_checksum_source() {
        let options = InstallOptions {
            verify_checksum: Some(false),
            ..Default::default()
        };
        assert_eq!(ChecksumSource::Skip, options.resolve(&LINUX_X64).unwrap().checksum);

        let options = InstallOptions {
            sha256: Some(" abcd \n".to_string()),
            verify_checksum: Some(false),
            ..Default::default()
        };
        assert_eq!(ChecksumSource::Inline("abcd".to_string()), options.resolve(&LINUX_X64).unwrap().checksum);
    }

    #[test]
    fn host_os_mapping() {
        let os = |id| HostPlatform { os: id, arch: "x86_64" }.os();
        assert_eq!(Os::Aix, os("aix").unwrap());
        assert_eq!(Os::Mac, os("macos").unwrap());
        assert_eq!(Os::Linux, os("linux").unwrap());
        assert_eq!(Os::Solaris, os("solaris").unwrap());
        assert_eq!(Os::Solaris, os("illumos").unwrap());
        assert_eq!(Os::Windows, os("windows").unwrap());
        assert!(matches!(os("freebsd"), Err(Error::UnsupportedPlatform(id)) if id == "freebsd"));
    }

    #[test]
    fn host_arch_mapping() {
        let arch = |id| HostPlatform { os: "linux", arch: id }.arch();
        // directly supported
        assert_eq!(Arch::X86, arch("x86").unwrap());
        assert_eq!(Arch::Aarch64, arch("aarch64").unwrap());
        assert_eq!(Arch::S390x, arch("s390x").unwrap());
        assert_eq!(Arch::Riscv64, arch("riscv64").unwrap());
        // aliases
        assert_eq!(Arch::X64, arch("x86_64").unwrap());
        assert_eq!(Arch::X32, arch("ia32").unwrap());
        assert_eq!(Arch::Aarch64, arch("arm64").unwrap());
        assert_eq!(Arch::S390x, arch("s390").unwrap());
        assert_eq!(Arch::Ppc64, arch("powerpc64").unwrap());
        assert!(matches!(arch("mips"), Err(Error::UnsupportedArchitecture(id)) if id == "mips"));
    }

    #[test]
    fn current_host_resolves_members() {
        // whatever the host is, a successful resolution yields members of the enumerations
        if let Ok(request) = InstallOptions::default().resolve(&HostPlatform::current()) {
            assert!(Os::ALL.contains(&request.os));
            assert!(Arch::ALL.contains(&request.arch));
        }
    }

    #[test]
    fn parse_ids() {
        assert_eq!(Os::AlpineLinux, "alpine-linux".parse::<Os>().unwrap());
        assert_eq!(Arch::Ppc64le, " PPC64LE ".parse::<Arch>().unwrap());
        assert_eq!(ImageType::StaticLibs, "staticlibs".parse::<ImageType>().unwrap());
        assert_eq!(JvmImpl::OpenJ9, "openj9".parse::<JvmImpl>().unwrap());
        assert!(matches!("beos".parse::<Os>(), Err(Error::UnsupportedPlatform(_))));
        assert!(matches!("vax".parse::<Arch>(), Err(Error::UnsupportedArchitecture(_))));
        assert!(matches!("tiny".parse::<HeapSize>(), Err(Error::InvalidOption { option: "heap_size", .. })));
        for vendor in Vendor::ALL {
            assert_eq!(*vendor, vendor.id().parse::<Vendor>().unwrap());
        }
    }

    #[test]
    fn deserialize_options() {
        let options = r"
          feature_version: 11
          os: windows
          arch: x64
          image_type: jdk
          openjdk_impl: openj9
          release_type: ea
          heap_size: large
          vendor: ibm
          allow_system_java: true
          install_path: /tmp/java
        ";
        let options: InstallOptions = serde_yaml::from_str(options).unwrap();
        assert_eq!(Some(11), options.feature_version);
        assert_eq!(Some(Os::Windows), options.os);
        assert_eq!(Some(JvmImpl::OpenJ9), options.openjdk_impl);
        assert_eq!(Some(Vendor::Ibm), options.vendor);
        assert_eq!(Some(true), options.allow_system_java);
        assert_eq!(None, options.sha256);
    }

    #[test]
    fn deserialize_feature_version_as_string() {
        let options: InstallOptions = serde_yaml::from_str(r#"feature_version: "17""#).unwrap();
        assert_eq!(Some(17), options.feature_version);
    }

    #[test]
    fn deserialize_feature_version_as_null() {
        let options: InstallOptions = serde_yaml::from_str("feature_version: ~").unwrap();
        assert_eq!(None, options.feature_version);

        let options: InstallOptions = serde_yaml::from_str("feature_version: null\nvendor: eclipse").unwrap();
        assert_eq!(None, options.feature_version);
        assert_eq!(8, options.resolve(&LINUX_X64).unwrap().feature_version);
    }

    #[test]
    fn deserialize_rejects_unknown_values() {
        assert!(serde_yaml::from_str::<InstallOptions>("os: beos").is_err());
        assert!(serde_yaml::from_str::<InstallOptions>("colour: blue").is_err());
    }

    #[test]
    fn overlay_prefers_self() {
        let cli = InstallOptions {
            feature_version: Some(21),
            ..Default::default()
        };
        let file = InstallOptions {
            feature_version: Some(11),
            vendor: Some(Vendor::Eclipse),
            ..Default::default()
        };
        let options = cli.overlay(file);
        assert_eq!(Some(21), options.feature_version);
        assert_eq!(Some(Vendor::Eclipse), options.vendor);
    }
}
