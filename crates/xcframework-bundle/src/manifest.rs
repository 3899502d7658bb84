//! `Info.plist` schema for XCFramework bundles.
//!
//! Field declaration order is alphabetical so the XML output lists keys the
//! same way Xcode writes them.

use crate::{BundleError, BundleResult, FORMAT_VERSION, PACKAGE_TYPE};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Bundle manifest, the `Info.plist` at the bundle root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// One entry per library slot.
    #[serde(rename = "AvailableLibraries")]
    pub available_libraries: Vec<LibraryEntry>,

    /// Always `XFWK`.
    #[serde(rename = "CFBundlePackageType")]
    pub package_type: String,

    /// Always `1.0`.
    #[serde(rename = "XCFrameworkFormatVersion")]
    pub format_version: String,
}

/// One `AvailableLibraries` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LibraryEntry {
    /// Path of the static library inside the slot directory.
    pub binary_path: String,

    /// Header directory inside the slot directory, always `Headers`.
    pub headers_path: String,

    /// Slot directory name.
    pub library_identifier: String,

    /// Same as `binary_path` for static libraries.
    pub library_path: String,

    /// Ascending architecture names.
    pub supported_architectures: Vec<String>,

    /// `ios`, `tvos` or `macos`.
    pub supported_platform: String,

    /// `simulator` or `maccatalyst`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_platform_variant: Option<String>,
}

impl Manifest {
    /// Create an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self {
            available_libraries: Vec::new(),
            package_type: PACKAGE_TYPE.to_string(),
            format_version: FORMAT_VERSION.to_string(),
        }
    }

    /// Append a library entry.
    pub fn add_library(&mut self, entry: LibraryEntry) {
        self.available_libraries.push(entry);
    }

    /// Look up an entry by identifier.
    #[must_use]
    pub fn get_library(&self, identifier: &str) -> Option<&LibraryEntry> {
        self.available_libraries
            .iter()
            .find(|e| e.library_identifier == identifier)
    }

    /// Check if a slot with this identifier is declared.
    #[must_use]
    pub fn contains_identifier(&self, identifier: &str) -> bool {
        self.get_library(identifier).is_some()
    }

    /// Validate the manifest on its own.
    pub fn validate(&self) -> BundleResult<()> {
        if self.package_type != PACKAGE_TYPE {
            return Err(BundleError::InvalidManifest(format!(
                "CFBundlePackageType must be {PACKAGE_TYPE}, got {}",
                self.package_type
            )));
        }

        if self.format_version.is_empty() {
            return Err(BundleError::InvalidManifest(
                "XCFrameworkFormatVersion is required".to_string(),
            ));
        }

        if self.available_libraries.is_empty() {
            return Err(BundleError::InvalidManifest(
                "at least one library must be declared".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.available_libraries {
            if entry.library_identifier.is_empty() {
                return Err(BundleError::InvalidManifest(
                    "LibraryIdentifier is required".to_string(),
                ));
            }

            if !seen.insert(entry.library_identifier.as_str()) {
                return Err(BundleError::DuplicateIdentifier(
                    entry.library_identifier.clone(),
                ));
            }

            if entry.binary_path.is_empty() {
                return Err(BundleError::InvalidManifest(format!(
                    "{}: BinaryPath is required",
                    entry.library_identifier
                )));
            }

            if entry.supported_architectures.windows(2).any(|w| w[0] >= w[1]) {
                return Err(BundleError::InvalidManifest(format!(
                    "{}: SupportedArchitectures must be sorted and unique",
                    entry.library_identifier
                )));
            }
        }

        Ok(())
    }

    /// Validate the manifest against the bundle directory it describes.
    ///
    /// Every entry must name an existing slot directory holding its library
    /// and its header directory.
    pub fn validate_layout<P: AsRef<Path>>(&self, bundle_dir: P) -> BundleResult<()> {
        self.validate()?;

        let bundle_dir = bundle_dir.as_ref();
        for entry in &self.available_libraries {
            let slot_dir = bundle_dir.join(&entry.library_identifier);
            if !slot_dir.is_dir() {
                return Err(BundleError::InvalidManifest(format!(
                    "missing slot directory: {}",
                    slot_dir.display()
                )));
            }

            let library = slot_dir.join(&entry.library_path);
            if !library.is_file() {
                return Err(BundleError::LibraryNotFound(library.display().to_string()));
            }

            let headers = slot_dir.join(&entry.headers_path);
            if !headers.is_dir() {
                return Err(BundleError::InvalidManifest(format!(
                    "missing header directory: {}",
                    headers.display()
                )));
            }
        }

        Ok(())
    }

    /// Serialize to an XML property list.
    pub fn to_xml(&self) -> BundleResult<String> {
        let mut buf = Vec::new();
        plist::to_writer_xml(&mut buf, self)?;
        String::from_utf8(buf)
            .map_err(|e| BundleError::InvalidManifest(format!("non UTF-8 plist output: {e}")))
    }

    /// Write as an XML property list.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> BundleResult<()> {
        std::fs::write(path, self.to_xml()?)?;
        Ok(())
    }

    /// Read from a property list file (XML or binary).
    pub fn from_file<P: AsRef<Path>>(path: P) -> BundleResult<Self> {
        Ok(plist::from_file(path)?)
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}
