//! Library identifier derivation.
//!
//! Xcode expects each slot of an XCFramework to be named
//! `<platform>-<arch>[_<arch>...][-<variant>]`. The names are fixed per
//! platform and architecture set, so they are enumerated here rather than
//! assembled from parts.

use crate::Platform;

/// Architecture set of a built library, normalized for identifier lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchSet {
    Arm64,
    X86_64,
    Arm64X86_64,
    /// Empty, or anything outside the arm64/x86_64 pair.
    Other,
}

impl ArchSet {
    /// Classify a sorted, de-duplicated architecture list.
    #[must_use]
    pub fn classify(sorted_archs: &[String]) -> Self {
        let archs: Vec<&str> = sorted_archs.iter().map(String::as_str).collect();
        match archs.as_slice() {
            ["arm64"] => Self::Arm64,
            ["x86_64"] => Self::X86_64,
            ["arm64", "x86_64"] => Self::Arm64X86_64,
            _ => Self::Other,
        }
    }
}

/// Where a platform's library lives inside the bundle and how it is declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySlot {
    /// Directory name and `LibraryIdentifier`.
    pub identifier: &'static str,
    /// `SupportedPlatform`.
    pub supported_platform: &'static str,
    /// `SupportedPlatformVariant`, absent for device slices.
    pub variant: Option<&'static str>,
    /// `SupportedArchitectures`, ascending.
    pub architectures: Vec<String>,
}

impl LibrarySlot {
    /// Resolve the slot for a platform and the architectures found in its library.
    ///
    /// Architectures are sorted and de-duplicated first, so the result does not
    /// depend on the order `lipo` reported them in.
    #[must_use]
    pub fn resolve<S: AsRef<str>>(platform: Platform, archs: &[S]) -> Self {
        let architectures = normalize_archs(archs);
        let set = ArchSet::classify(&architectures);

        Self {
            identifier: identifier_for(platform, set),
            supported_platform: supported_platform(platform),
            variant: platform_variant(platform),
            architectures,
        }
    }
}

/// Sort ascending and drop duplicates.
#[must_use]
pub fn normalize_archs<S: AsRef<str>>(archs: &[S]) -> Vec<String> {
    let mut sorted: Vec<String> = archs.iter().map(|a| a.as_ref().to_string()).collect();
    sorted.sort();
    sorted.dedup();
    sorted
}

/// `SupportedPlatform` value for a platform.
#[must_use]
pub fn supported_platform(platform: Platform) -> &'static str {
    match platform {
        Platform::IphoneOs | Platform::IphoneSimulator | Platform::MacCatalyst => "ios",
        Platform::AppleTvOs | Platform::AppleTvSimulator => "tvos",
        Platform::MacOsx => "macos",
    }
}

/// `SupportedPlatformVariant` value for a platform.
#[must_use]
pub fn platform_variant(platform: Platform) -> Option<&'static str> {
    match platform {
        Platform::IphoneSimulator | Platform::AppleTvSimulator => Some("simulator"),
        Platform::MacCatalyst => Some("maccatalyst"),
        Platform::IphoneOs | Platform::AppleTvOs | Platform::MacOsx => None,
    }
}

fn identifier_for(platform: Platform, set: ArchSet) -> &'static str {
    use ArchSet::{Arm64, Arm64X86_64, Other, X86_64};

    match (platform, set) {
        (Platform::IphoneOs, Arm64) => "ios-arm64",
        (Platform::IphoneOs, X86_64) => "ios-x86_64",
        (Platform::IphoneOs, Arm64X86_64) => "ios-arm64_x86_64",
        (Platform::IphoneOs, Other) => "ios",

        (Platform::IphoneSimulator, Arm64) => "ios-arm64-simulator",
        (Platform::IphoneSimulator, X86_64) => "ios-x86_64-simulator",
        (Platform::IphoneSimulator, Arm64X86_64) => "ios-arm64_x86_64-simulator",
        (Platform::IphoneSimulator, Other) => "ios-simulator",

        (Platform::AppleTvOs, Arm64) => "tvos-arm64",
        (Platform::AppleTvOs, X86_64) => "tvos-x86_64",
        (Platform::AppleTvOs, Arm64X86_64) => "tvos-arm64_x86_64",
        (Platform::AppleTvOs, Other) => "tvos",

        (Platform::AppleTvSimulator, Arm64) => "tvos-arm64-simulator",
        (Platform::AppleTvSimulator, X86_64) => "tvos-x86_64-simulator",
        (Platform::AppleTvSimulator, Arm64X86_64) => "tvos-arm64_x86_64-simulator",
        (Platform::AppleTvSimulator, Other) => "tvos-simulator",

        (Platform::MacOsx, Arm64) => "macos-arm64",
        (Platform::MacOsx, X86_64) => "macos-x86_64",
        (Platform::MacOsx, Arm64X86_64) => "macos-arm64_x86_64",
        (Platform::MacOsx, Other) => "macos",

        (Platform::MacCatalyst, Arm64) => "ios-arm64-maccatalyst",
        (Platform::MacCatalyst, X86_64) => "ios-x86_64-maccatalyst",
        (Platform::MacCatalyst, Arm64X86_64) => "ios-arm64_x86_64-maccatalyst",
        (Platform::MacCatalyst, Other) => "ios-maccatalyst",
    }
}
