//! Fat libraries via `lipo`

use crate::command::{CommandRunner, Invocation};
use crate::config::ToolEnv;
use anyhow::{Context, Result};
use std::path::Path;
use xcframework_bundle::{
    ArchitectureProbe, BuildOutput, BundleResult, Platform, copy_dir_all, parse_lipo_info,
};

/// Merge the per-architecture outputs of `platform` into one.
///
/// A single output is returned as is. Otherwise the libraries are combined
/// into `<build_dir>/<platform>-fat/` with one `lipo -create` run, and the
/// first output's headers are copied alongside. The slices are not checked
/// here; the assembler reads them back with `lipo -info`. A missing fat
/// library after a successful `lipo` run is an error.
pub fn combine<R: CommandRunner>(
    runner: &R,
    env: &ToolEnv,
    build_dir: &Path,
    platform: Platform,
    mut outputs: Vec<BuildOutput>,
) -> Result<BuildOutput> {
    let first = match outputs.len() {
        0 => anyhow::bail!("No libraries were built for {platform}"),
        1 => return Ok(outputs.remove(0)),
        _ => &outputs[0],
    };

    tracing::info!("Creating fat library for {platform}...");

    let fat = BuildOutput::new(
        build_dir.join(format!("{platform}-fat")),
        first.library_name(),
    );
    std::fs::create_dir_all(fat.dir())
        .with_context(|| format!("Failed to create {}", fat.dir().display()))?;

    if let Some(include) = first.headers() {
        copy_dir_all(&include, fat.include_dir())
            .with_context(|| format!("Failed to copy headers from {}", include.display()))?;
    }

    let lipo = outputs
        .iter()
        .fold(Invocation::new("lipo", build_dir).arg("-create"), |lipo, output| {
            lipo.path_arg(&output.library())
        })
        .arg("-output")
        .path_arg(&fat.library())
        .env(env.clone());
    runner
        .run(&lipo)
        .with_context(|| format!("Failed to create fat library for {platform}"))?;
    fat.ensure_library()
        .with_context(|| format!("lipo produced no fat library for {platform}"))?;

    Ok(fat)
}

/// Reads architectures with `lipo -info`.
pub struct LipoProbe<'a, R: CommandRunner> {
    runner: &'a R,
    env: &'a ToolEnv,
}

impl<'a, R: CommandRunner> LipoProbe<'a, R> {
    pub fn new(runner: &'a R, env: &'a ToolEnv) -> Self {
        Self { runner, env }
    }
}

impl<R: CommandRunner> ArchitectureProbe for LipoProbe<'_, R> {
    fn architectures(&self, library: &Path) -> BundleResult<Vec<String>> {
        let cwd = library.parent().unwrap_or(Path::new("/"));
        let info = Invocation::new("lipo", cwd)
            .arg("-info")
            .path_arg(library)
            .env(self.env.clone());

        match self.runner.run(&info) {
            Ok(output) => {
                let archs = parse_lipo_info(&output.stdout);
                if archs.is_empty() {
                    Ok(parse_lipo_info(&output.stderr))
                } else {
                    Ok(archs)
                }
            }
            // missing or unreadable; the caller falls back to the configured archs
            Err(e) => {
                tracing::warn!("Could not read architectures of {}: {e}", library.display());
                Ok(Vec::new())
            }
        }
    }
}
