//! Apple platform table.
//!
//! Every SDK the bundle can carry is a [`Platform`] variant with a fixed
//! [`PlatformConfig`]. Target triples and architecture names are positionally
//! aligned: `targets[i]` produces code for `archs[i]`.

use std::fmt;

/// SDKs that can appear in the bundle, in build order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    /// iOS devices.
    IphoneOs,
    /// iOS Simulator.
    IphoneSimulator,
    /// tvOS devices.
    AppleTvOs,
    /// tvOS Simulator.
    AppleTvSimulator,
    /// macOS.
    MacOsx,
    /// Mac Catalyst.
    MacCatalyst,
}

/// Static configuration of one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Rust target triples to compile.
    pub targets: &'static [&'static str],
    /// Architecture names, aligned with `targets`.
    pub archs: &'static [&'static str],
    /// Xcode SDK name.
    pub sdk: &'static str,
    /// Minimum deployment version.
    pub min_version: &'static str,
    /// Human-readable name.
    pub display_name: &'static str,
}

/// Platform family, which decides the deployment-target variables of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentFamily {
    Ios,
    TvOs,
    MacOs,
    Catalyst,
}

impl DeploymentFamily {
    /// Environment variables that carry the deployment target.
    ///
    /// Catalyst links against both the macOS and iOS SDK halves, so it sets both.
    #[must_use]
    pub fn env_vars(&self) -> &'static [&'static str] {
        match self {
            Self::Ios => &["IPHONEOS_DEPLOYMENT_TARGET"],
            Self::TvOs => &["TVOS_DEPLOYMENT_TARGET"],
            Self::MacOs => &["MACOSX_DEPLOYMENT_TARGET"],
            Self::Catalyst => &["MACOSX_DEPLOYMENT_TARGET", "IPHONEOS_DEPLOYMENT_TARGET"],
        }
    }
}

const IPHONEOS: PlatformConfig = PlatformConfig {
    targets: &["aarch64-apple-ios"],
    archs: &["arm64"],
    sdk: "iphoneos",
    min_version: "12.0",
    display_name: "iOS",
};

const IPHONESIMULATOR: PlatformConfig = PlatformConfig {
    targets: &["aarch64-apple-ios-sim", "x86_64-apple-ios"],
    archs: &["arm64", "x86_64"],
    sdk: "iphonesimulator",
    min_version: "12.0",
    display_name: "iOS Simulator",
};

const APPLETVOS: PlatformConfig = PlatformConfig {
    targets: &["aarch64-apple-tvos"],
    archs: &["arm64"],
    sdk: "appletvos",
    min_version: "12.0",
    display_name: "tvOS",
};

const APPLETVSIMULATOR: PlatformConfig = PlatformConfig {
    targets: &["aarch64-apple-tvos-sim", "x86_64-apple-tvos"],
    archs: &["arm64", "x86_64"],
    sdk: "appletvsimulator",
    min_version: "12.0",
    display_name: "tvOS Simulator",
};

const MACOSX: PlatformConfig = PlatformConfig {
    targets: &["aarch64-apple-darwin", "x86_64-apple-darwin"],
    archs: &["arm64", "x86_64"],
    sdk: "macosx",
    min_version: "12.0",
    display_name: "macOS",
};

const MACCATALYST: PlatformConfig = PlatformConfig {
    targets: &["aarch64-apple-ios-macabi", "x86_64-apple-ios-macabi"],
    archs: &["arm64", "x86_64"],
    sdk: "macosx",
    min_version: "13.1",
    display_name: "Mac Catalyst",
};

impl Platform {
    /// Get the platform key string (e.g., "iphonesimulator").
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IphoneOs => "iphoneos",
            Self::IphoneSimulator => "iphonesimulator",
            Self::AppleTvOs => "appletvos",
            Self::AppleTvSimulator => "appletvsimulator",
            Self::MacOsx => "macosx",
            Self::MacCatalyst => "maccatalyst",
        }
    }

    /// Parse a platform from its key. Matching is exact.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "iphoneos" => Some(Self::IphoneOs),
            "iphonesimulator" => Some(Self::IphoneSimulator),
            "appletvos" => Some(Self::AppleTvOs),
            "appletvsimulator" => Some(Self::AppleTvSimulator),
            "macosx" => Some(Self::MacOsx),
            "maccatalyst" => Some(Self::MacCatalyst),
            _ => None,
        }
    }

    /// Parse an SDK name as Xcode reports it (`SDK_NAME`, any case).
    #[must_use]
    pub fn from_sdk_name(sdk: &str) -> Option<Self> {
        Self::parse(&sdk.to_ascii_lowercase())
    }

    /// Static configuration for this platform.
    #[must_use]
    pub fn config(&self) -> &'static PlatformConfig {
        match self {
            Self::IphoneOs => &IPHONEOS,
            Self::IphoneSimulator => &IPHONESIMULATOR,
            Self::AppleTvOs => &APPLETVOS,
            Self::AppleTvSimulator => &APPLETVSIMULATOR,
            Self::MacOsx => &MACOSX,
            Self::MacCatalyst => &MACCATALYST,
        }
    }

    /// Family used to pick deployment-target variables.
    #[must_use]
    pub fn deployment_family(&self) -> DeploymentFamily {
        match self {
            Self::IphoneOs | Self::IphoneSimulator => DeploymentFamily::Ios,
            Self::AppleTvOs | Self::AppleTvSimulator => DeploymentFamily::TvOs,
            Self::MacOsx => DeploymentFamily::MacOs,
            Self::MacCatalyst => DeploymentFamily::Catalyst,
        }
    }

    /// `(target triple, architecture)` pairs to build for this platform.
    pub fn targets(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        let config = self.config();
        config
            .targets
            .iter()
            .copied()
            .zip(config.archs.iter().copied())
    }

    /// Whether objects built for this platform carry iOS build-version metadata
    /// that has to be rewritten to tvOS after the build.
    #[must_use]
    pub fn needs_build_version_fix(&self) -> bool {
        matches!(self, Self::AppleTvOs)
    }

    /// Get all platforms in build order.
    #[must_use]
    pub fn all() -> &'static [Platform] {
        &[
            Self::IphoneOs,
            Self::IphoneSimulator,
            Self::AppleTvOs,
            Self::AppleTvSimulator,
            Self::MacOsx,
            Self::MacCatalyst,
        ]
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a target triple is a Tier 3 target that must be built with
/// `-Zbuild-std` on the nightly toolchain.
#[must_use]
pub fn is_tier3_target(triple: &str) -> bool {
    triple.contains("apple-tvos")
}

/// Stable target triples that `rustup target add` can install.
pub const INSTALLABLE_TARGETS: &[&str] = &[
    "aarch64-apple-ios",
    "aarch64-apple-ios-sim",
    "x86_64-apple-ios",
    "aarch64-apple-darwin",
    "x86_64-apple-darwin",
    "aarch64-apple-ios-macabi",
    "x86_64-apple-ios-macabi",
];
