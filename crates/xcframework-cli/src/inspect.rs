//! Inspect an existing XCFramework.

use anyhow::{Context, Result};
use std::path::Path;
use xcframework_bundle::{INFO_PLIST, Manifest};

/// Print the libraries of a bundle after checking its manifest against the
/// directory tree.
pub fn run(bundle_path: &Path) -> Result<()> {
    let manifest = Manifest::from_file(bundle_path.join(INFO_PLIST))
        .with_context(|| format!("Failed to open: {}", bundle_path.display()))?;
    manifest
        .validate_layout(bundle_path)
        .with_context(|| format!("Invalid bundle: {}", bundle_path.display()))?;

    println!("XCFramework: {}", bundle_path.display());
    println!(
        "Format: v{} ({})",
        manifest.format_version, manifest.package_type
    );

    println!("\nLibraries:");
    for library in &manifest.available_libraries {
        println!("  {}:", library.library_identifier);
        match &library.supported_platform_variant {
            Some(variant) => println!(
                "    Platform: {} ({variant})",
                library.supported_platform
            ),
            None => println!("    Platform: {}", library.supported_platform),
        }
        println!(
            "    Architectures: {}",
            library.supported_architectures.join(", ")
        );
        println!("    Library: {}", library.library_path);
        println!("    Headers: {}", library.headers_path);
    }

    Ok(())
}
