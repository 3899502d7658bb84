//! Build environment preparation

use crate::command::{CommandRunner, Invocation};
use crate::config::{Layout, ToolEnv};
use anyhow::{Context, Result};
use std::fs;
use xcframework_bundle::{BUNDLE_EXTENSION, INSTALLABLE_TARGETS};

/// Check the crate exists and start from empty output directories.
///
/// The previous bundle is removed here as well as during assembly, so a run
/// that fails halfway never leaves an older `Info.plist` in place.
pub fn prepare_directories(layout: &Layout, bundle_name: &str) -> Result<()> {
    if !layout.crate_dir.is_dir() {
        anyhow::bail!("Crate directory not found at: {}", layout.crate_dir.display());
    }

    if layout.build_dir.exists() {
        fs::remove_dir_all(&layout.build_dir).with_context(|| {
            format!("Failed to clean build directory: {}", layout.build_dir.display())
        })?;
    }
    fs::create_dir_all(&layout.build_dir)
        .with_context(|| format!("Failed to create {}", layout.build_dir.display()))?;

    fs::create_dir_all(&layout.xcframework_dir)
        .with_context(|| format!("Failed to create {}", layout.xcframework_dir.display()))?;
    let bundle = layout
        .xcframework_dir
        .join(format!("{bundle_name}.{BUNDLE_EXTENSION}"));
    if bundle.exists() {
        fs::remove_dir_all(&bundle)
            .with_context(|| format!("Failed to remove {}", bundle.display()))?;
    }

    Ok(())
}

/// Install `rust-src` for the nightly toolchain and the stable Apple targets.
///
/// Best effort: every step runs once, and a failure (most often "already
/// installed") is logged and ignored. A toolchain that is really broken shows
/// up later as a build failure.
pub fn install_toolchain_components<R: CommandRunner>(
    runner: &R,
    layout: &Layout,
    env: &ToolEnv,
    nightly: &str,
) {
    let component = Invocation::new("rustup", &layout.root)
        .args(["component", "add", "rust-src", "--toolchain", nightly])
        .env(env.clone());
    if let Err(e) = runner.run(&component) {
        tracing::warn!("rust-src component might already be installed: {e}");
    }

    for &target in INSTALLABLE_TARGETS {
        let add = Invocation::new("rustup", &layout.root)
            .args(["target", "add", target])
            .env(env.clone());
        if let Err(e) = runner.run(&add) {
            tracing::warn!(
                "Target {target} might already be installed or not required on this toolchain: {e}"
            );
        }
    }

    tracing::info!("Using {nightly} with -Zbuild-std for tvOS targets (Tier 3)");
}
