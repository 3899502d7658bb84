//! Architecture detection for static libraries.

use crate::BundleResult;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Reports the architectures contained in a static library.
///
/// The assembler never trusts the platform table alone: a fat library may
/// hold fewer slices than were requested if one cross-compile was skipped.
pub trait ArchitectureProbe {
    /// Architectures present in `library`, in any order. An empty list means
    /// the probe ran but could not tell.
    fn architectures(&self, library: &Path) -> BundleResult<Vec<String>>;
}

/// Parse the output of `lipo -info`.
///
/// Handles both shapes lipo prints:
///
/// ```text
/// Architectures in the fat file: libfoo.a are: x86_64 arm64
/// Non-fat file: libfoo.a is architecture: arm64
/// ```
///
/// ```
/// use xcframework_bundle::parse_lipo_info;
///
/// assert_eq!(
///     parse_lipo_info("Architectures in the fat file: libfoo.a are: x86_64 arm64"),
///     vec!["x86_64", "arm64"]
/// );
/// assert_eq!(
///     parse_lipo_info("Non-fat file: libfoo.a is architecture: arm64"),
///     vec!["arm64"]
/// );
/// ```
#[must_use]
pub fn parse_lipo_info(output: &str) -> Vec<String> {
    let output = output.trim();

    if let Some((_, archs)) = output.rsplit_once("are:") {
        return archs.split_whitespace().map(str::to_string).collect();
    }

    if let Some((_, arch)) = output.rsplit_once("architecture:") {
        let arch = arch.trim();
        if !arch.is_empty() {
            return vec![arch.to_string()];
        }
    }

    Vec::new()
}

/// Probe that answers from a fixed table, keyed by library path.
///
/// Useful when the architectures are already known, e.g. when re-packaging
/// prebuilt slices or in tests.
#[derive(Debug, Default, Clone)]
pub struct FixedProbe {
    archs: HashMap<PathBuf, Vec<String>>,
}

impl FixedProbe {
    /// Create an empty probe. Unknown paths report no architectures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the architectures of one library.
    #[must_use]
    pub fn with<P: Into<PathBuf>>(mut self, library: P, archs: &[&str]) -> Self {
        self.archs.insert(
            library.into(),
            archs.iter().map(|a| (*a).to_string()).collect(),
        );
        self
    }
}

impl ArchitectureProbe for FixedProbe {
    fn architectures(&self, library: &Path) -> BundleResult<Vec<String>> {
        Ok(self.archs.get(library).cloned().unwrap_or_default())
    }
}
