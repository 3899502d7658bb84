//! Per-target cargo builds

use crate::command::{CommandRunner, Invocation};
use crate::config::{Layout, ToolEnv};
use anyhow::{Context, Result};
use std::fs;
use xcframework_bundle::{BuildOutput, INCLUDE_DIR, Platform, is_tier3_target};

/// Builds the crate for one target triple at a time and collects the archive
/// and header into `<build_dir>/<platform>-<arch>/`.
pub struct TargetBuilder<'a, R: CommandRunner> {
    runner: &'a R,
    layout: &'a Layout,
    env: &'a ToolEnv,
    features: &'a [String],
    nightly: &'a str,
}

impl<'a, R: CommandRunner> TargetBuilder<'a, R> {
    pub fn new(
        runner: &'a R,
        layout: &'a Layout,
        env: &'a ToolEnv,
        features: &'a [String],
        nightly: &'a str,
    ) -> Self {
        Self {
            runner,
            layout,
            env,
            features,
            nightly,
        }
    }

    /// The cargo command for `triple`.
    ///
    /// Tier 3 triples go through the nightly toolchain and rebuild `std` from
    /// source; everything else uses the default toolchain.
    pub fn cargo_invocation(&self, platform: Platform, triple: &str) -> Invocation {
        let mut cargo = Invocation::new("cargo", &self.layout.crate_dir);

        if is_tier3_target(triple) {
            cargo = cargo
                .arg(format!("+{}", self.nightly))
                .args(["build", "-Zbuild-std=std,panic_abort"]);
        } else {
            cargo = cargo.arg("build");
        }

        cargo
            .args(["--release", "--target", triple])
            .args(["--features".to_string(), self.features.join(",")])
            .arg("--no-default-features")
            .env(self.build_env(platform))
    }

    /// Tool environment plus the deployment target of the platform family.
    pub fn build_env(&self, platform: Platform) -> ToolEnv {
        let min_version = platform.config().min_version;

        platform
            .deployment_family()
            .env_vars()
            .iter()
            .fold(self.env.clone(), |env, var| env.with(var, min_version))
    }

    /// Build `triple` and copy its outputs.
    ///
    /// A failed cargo run or a missing archive afterwards is fatal. A missing
    /// header only produces a warning.
    pub fn build(&self, platform: Platform, triple: &str, arch: &str) -> Result<BuildOutput> {
        let out_dir = self.layout.build_dir.join(format!("{platform}-{arch}"));
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;

        tracing::info!("=== Building for {platform} ({arch}) using target {triple} ===");

        let cargo = self.cargo_invocation(platform, triple);
        self.runner
            .run(&cargo)
            .with_context(|| format!("cargo build failed for {triple}"))?;

        let built = self.layout.cargo_output(triple);
        if !built.is_file() {
            anyhow::bail!("Built library not found at: {}", built.display());
        }

        let output = BuildOutput::new(&out_dir, &self.layout.library_file);
        fs::copy(&built, output.library())
            .with_context(|| format!("Failed to copy {}", built.display()))?;

        if self.layout.header.is_file() {
            let include = out_dir.join(INCLUDE_DIR);
            fs::create_dir_all(&include)?;
            let file_name = self
                .layout
                .header
                .file_name()
                .context("Header path has no file name")?;
            fs::copy(&self.layout.header, include.join(file_name))
                .with_context(|| format!("Failed to copy {}", self.layout.header.display()))?;
        } else {
            tracing::warn!("Header file not found at {}", self.layout.header.display());
        }

        Ok(output)
    }
}
