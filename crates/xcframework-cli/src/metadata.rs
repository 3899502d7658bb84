//! Build-version rewriting for static archives
//!
//! The tvOS device target links objects whose `LC_BUILD_VERSION` load command
//! still names iOS. Xcode refuses to link such a slice for tvOS, so every
//! object in the archive is rewritten with `vtool` and the archive rebuilt.

use crate::command::{CommandRunner, Invocation};
use crate::config::ToolEnv;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Mach-O build version to stamp into every object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildVersion {
    /// Mach-O platform code (`PLATFORM_TVOS` is 3).
    pub platform: u32,
    pub min_os: &'static str,
    pub sdk: &'static str,
}

impl BuildVersion {
    pub const TVOS: Self = Self {
        platform: 3,
        min_os: "12.0",
        sdk: "12.0",
    };
}

/// What happened to an archive's members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixReport {
    /// Objects extracted from the archive.
    pub members: usize,
    /// Objects `vtool` rewrote.
    pub rewritten: usize,
    /// Objects left as they were after `vtool` failed.
    pub failed: Vec<String>,
}

/// Rewrite the build version of every object in `library`.
///
/// Failing to extract or to re-archive is fatal. A `vtool` failure on one
/// object is logged and the object is archived unchanged, so the rebuilt
/// archive always has as many members as were extracted.
pub fn fix_build_version<R: CommandRunner>(
    runner: &R,
    env: &ToolEnv,
    library: &Path,
    version: &BuildVersion,
) -> Result<FixReport> {
    tracing::info!("Fixing platform metadata for {}", library.display());

    let scratch = tempfile::Builder::new()
        .prefix("xcframework-objects")
        .tempdir()
        .context("Failed to create scratch directory")?;

    let extract = Invocation::new("ar", scratch.path())
        .arg("x")
        .path_arg(library)
        .env(env.clone());
    runner
        .run(&extract)
        .with_context(|| format!("Failed to extract {}", library.display()))?;

    let objects = object_files(scratch.path())?;
    let mut report = FixReport {
        members: objects.len(),
        ..FixReport::default()
    };

    for object in &objects {
        let name = object
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let vtool = Invocation::new("vtool", scratch.path())
            .arg("-set-build-version")
            .args([
                version.platform.to_string(),
                version.min_os.to_string(),
                version.sdk.to_string(),
            ])
            .arg("-replace")
            .arg("-output")
            .path_arg(object)
            .path_arg(object)
            .env(env.clone());

        match runner.run(&vtool) {
            Ok(_) => {
                tracing::debug!("Updated platform metadata for {name}");
                report.rewritten += 1;
            }
            Err(e) => {
                tracing::warn!("vtool failed for {name}: {e}");
                report.failed.push(name);
            }
        }
    }

    if objects.is_empty() {
        tracing::warn!("No objects found in {}, leaving it as is", library.display());
        return Ok(report);
    }

    fs::remove_file(library)
        .with_context(|| format!("Failed to remove {}", library.display()))?;
    let archive = objects.iter().fold(
        Invocation::new("ar", scratch.path())
            .arg("rcs")
            .path_arg(library),
        |ar, object| ar.path_arg(object),
    );
    runner
        .run(&archive.env(env.clone()))
        .with_context(|| format!("Failed to recreate {}", library.display()))?;

    tracing::info!(
        "Rewrote {}/{} objects in {}",
        report.rewritten,
        report.members,
        library.display()
    );
    Ok(report)
}

/// `*.o` files in `dir`, sorted by name.
fn object_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut objects = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "o") {
            objects.push(path);
        }
    }
    objects.sort();
    Ok(objects)
}
