//! Download URL.
//!
//! This module maps a resolved [`InstallRequest`] onto the download URL of the binary API.

use crate::options::InstallRequest;

/// Base URL of the binary API endpoint.
// https://api.adoptopenjdk.net/q/swagger-ui/#/Binary/getBinary
pub const DEFAULT_API_URL: &str = "https://api.adoptopenjdk.net/v3/binary/latest/";

/// Builds the download URL for the given request.
///
/// The path segments are, in this order: feature version, release type, operating system, architecture, image
/// type, JVM implementation, heap size and vendor. The API resolves binaries by position, so the order must not
/// change.
pub fn build_url(request: &InstallRequest) -> String {
    let base = request.api_url.trim_end_matches('/');
    format!(
        "{base}/{}/{}/{}/{}/{}/{}/{}/{}",
        request.feature_version,
        request.release_type,
        request.os,
        request.arch,
        request.image_type,
        request.openjdk_impl,
        request.heap_size,
        request.vendor,
    )
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::options::*;
    use test_log::test;

    const HOST: HostPlatform = HostPlatform { os: "linux", arch: "x86_64" };

    #[test]
    fn default_options_on_windows() {
        let options = InstallOptions {
            os: Some(Os::Windows),
            ..Default::default()
        };
        let request = options.resolve(&HOST).unwrap();
        assert_eq!(
            "https://api.adoptopenjdk.net/v3/binary/latest/8/ga/windows/x64/jre/hotspot/normal/adoptopenjdk",
            build_url(&request)
        );
    }

    #[test]
    fn all_segments_overridden() {
        let options = InstallOptions {
            feature_version: Some(12),
            heap_size: Some(HeapSize::Large),
            vendor: Some(Vendor::Alibaba),
            openjdk_impl: Some(JvmImpl::Dragonwell),
            arch: Some(Arch::X86),
            release_type: Some(ReleaseType::Ea),
            image_type: Some(ImageType::StaticLibs),
            os: Some(Os::Linux),
            ..Default::default()
        };
        let request = options.resolve(&HOST).unwrap();
        assert_eq!(
            "https://api.adoptopenjdk.net/v3/binary/latest/12/ea/linux/x86/staticlibs/dragonwell/large/alibaba",
            build_url(&request)
        );
    }

    #[test]
    fn deterministic() {
        let request = InstallOptions::default().resolve(&HOST).unwrap();
        assert_eq!(build_url(&request), build_url(&request.clone()));
    }

    #[test]
    fn custom_base_with_and_without_slash() {
        let with_slash = InstallOptions {
            api_url: Some("http://mirror.local/binary/".to_string()),
            ..Default::default()
        };
        let without_slash = InstallOptions {
            api_url: Some("http://mirror.local/binary".to_string()),
            ..Default::default()
        };
        let expected = "http://mirror.local/binary/8/ga/linux/x64/jre/hotspot/normal/adoptopenjdk";
        assert_eq!(expected, build_url(&with_slash.resolve(&HOST).unwrap()));
        assert_eq!(expected, build_url(&without_slash.resolve(&HOST).unwrap()));
    }
}
