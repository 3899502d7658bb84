//! Bundle assembly.
//!
//! The [`BundleBuilder`] lays out an `.xcframework` directory from per-platform
//! [`BuildOutput`]s and writes its `Info.plist`.

use crate::{
    ArchitectureProbe, BUNDLE_EXTENSION, BuildOutput, BundleError, BundleResult, HEADERS_DIR,
    INFO_PLIST, LibraryEntry, LibrarySlot, Manifest, Platform, copy_dir_all,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Builder for XCFramework bundles.
///
/// Creating a builder deletes any bundle already at the target path; bundles
/// are always rebuilt from scratch, never merged.
///
/// # Example
///
/// ```no_run
/// use xcframework_bundle::{BuildOutput, BundleBuilder, FixedProbe, Platform};
///
/// let probe = FixedProbe::new().with("build/iphoneos-arm64/libfoo.a", &["arm64"]);
/// let bundle = BundleBuilder::create("xcframework", "foo", &probe)?
///     .add_platform(
///         Platform::IphoneOs,
///         &BuildOutput::new("build/iphoneos-arm64", "libfoo.a"),
///     )?
///     .write()?;
/// # Ok::<(), xcframework_bundle::BundleError>(())
/// ```
pub struct BundleBuilder<'a> {
    path: PathBuf,
    manifest: Manifest,
    probe: &'a dyn ArchitectureProbe,
}

impl<'a> BundleBuilder<'a> {
    /// Start a fresh bundle at `<output_dir>/<name>.xcframework`.
    pub fn create<P: AsRef<Path>>(
        output_dir: P,
        name: &str,
        probe: &'a dyn ArchitectureProbe,
    ) -> BundleResult<Self> {
        let path = output_dir
            .as_ref()
            .join(format!("{name}.{BUNDLE_EXTENSION}"));

        if path.exists() {
            tracing::debug!(path = %path.display(), "removing existing bundle");
            fs::remove_dir_all(&path)?;
        }
        fs::create_dir_all(&path)?;

        Ok(Self {
            path,
            manifest: Manifest::new(),
            probe,
        })
    }

    /// Bundle directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add the library built for `platform`.
    ///
    /// Outputs without a library file are skipped. The slot is chosen from the
    /// architectures the probe finds in the library; the platform table is only
    /// consulted when the probe cannot tell.
    pub fn add_platform(mut self, platform: Platform, output: &BuildOutput) -> BundleResult<Self> {
        let library = output.library();
        if !library.is_file() {
            tracing::warn!(%platform, library = %library.display(), "no library built, skipping");
            return Ok(self);
        }

        let mut archs = self.probe.architectures(&library)?;
        if archs.is_empty() {
            tracing::warn!(
                %platform,
                "could not detect architectures, using configured list"
            );
            archs = platform
                .config()
                .archs
                .iter()
                .map(|a| (*a).to_string())
                .collect();
        }

        let slot = LibrarySlot::resolve(platform, archs.as_slice());
        if self.manifest.contains_identifier(slot.identifier) {
            return Err(BundleError::DuplicateIdentifier(slot.identifier.to_string()));
        }

        let slot_dir = self.path.join(slot.identifier);
        fs::create_dir(&slot_dir)?;
        fs::copy(&library, slot_dir.join(output.library_name()))?;

        let headers_dir = slot_dir.join(HEADERS_DIR);
        match output.headers() {
            Some(include) => copy_dir_all(&include, &headers_dir)?,
            None => {
                tracing::warn!(%platform, "no headers in build output, slot gets an empty Headers/");
                fs::create_dir(&headers_dir)?;
            }
        }

        tracing::info!(
            %platform,
            identifier = slot.identifier,
            archs = %slot.architectures.join(","),
            "added library to bundle"
        );

        self.manifest.add_library(LibraryEntry {
            binary_path: output.library_name().to_string(),
            headers_path: HEADERS_DIR.to_string(),
            library_identifier: slot.identifier.to_string(),
            library_path: output.library_name().to_string(),
            supported_architectures: slot.architectures,
            supported_platform: slot.supported_platform.to_string(),
            supported_platform_variant: slot.variant.map(str::to_string),
        });

        Ok(self)
    }

    /// Add a library by platform key.
    ///
    /// Keys with no entry in the platform table are skipped with a warning
    /// rather than failing the bundle.
    pub fn add_keyed(self, key: &str, output: &BuildOutput) -> BundleResult<Self> {
        match Platform::parse(key) {
            Some(platform) => self.add_platform(platform, output),
            None => {
                tracing::warn!(key, "unknown platform key, skipping");
                Ok(self)
            }
        }
    }

    /// Get the current manifest (for inspection).
    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Validate the manifest and write `Info.plist`. Returns the bundle path.
    pub fn write(self) -> BundleResult<PathBuf> {
        self.manifest.validate_layout(&self.path)?;
        self.manifest.write(self.path.join(INFO_PLIST))?;

        tracing::info!(
            path = %self.path.display(),
            libraries = self.manifest.available_libraries.len(),
            "wrote XCFramework"
        );
        Ok(self.path)
    }
}
