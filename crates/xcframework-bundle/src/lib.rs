//! XCFramework bundle format.
//!
//! This crate provides the platform table, library identifier derivation and
//! `Info.plist` model used to assemble `.xcframework` bundles of static
//! libraries for Apple platforms.
//!
//! # Bundle Structure
//!
//! ```text
//! idevice_ffi.xcframework
//! ├── Info.plist
//! ├── ios-arm64/
//! │   ├── libidevice_ffi.a
//! │   └── Headers/
//! │       └── idevice.h
//! ├── ios-arm64_x86_64-simulator/
//! │   ├── libidevice_ffi.a
//! │   └── Headers/
//! └── macos-arm64_x86_64/
//!     ├── libidevice_ffi.a
//!     └── Headers/
//! ```
//!
//! Nothing here spawns processes. Architecture detection goes through the
//! [`ArchitectureProbe`] trait so callers decide how `lipo` is run.

mod arch;
mod error;
mod identifier;
mod manifest;
mod output;
mod platform;

pub mod builder;

pub use arch::{ArchitectureProbe, FixedProbe, parse_lipo_info};
pub use builder::BundleBuilder;
pub use error::BundleError;
pub use identifier::{ArchSet, LibrarySlot, normalize_archs};
pub use manifest::{LibraryEntry, Manifest};
pub use output::{BuildOutput, INCLUDE_DIR, copy_dir_all};
pub use platform::{DeploymentFamily, INSTALLABLE_TARGETS, Platform, PlatformConfig, is_tier3_target};

/// Result type for bundle operations.
pub type BundleResult<T> = Result<T, BundleError>;

/// Bundle directory extension.
pub const BUNDLE_EXTENSION: &str = "xcframework";

/// `CFBundlePackageType` of every XCFramework.
pub const PACKAGE_TYPE: &str = "XFWK";

/// `XCFrameworkFormatVersion` written by this crate.
pub const FORMAT_VERSION: &str = "1.0";

/// Manifest file name at the bundle root.
pub const INFO_PLIST: &str = "Info.plist";

/// Header directory name inside each library slot.
pub const HEADERS_DIR: &str = "Headers";
