//! End-to-end XCFramework build

use crate::build::TargetBuilder;
use crate::command::CommandRunner;
use crate::config::{Config, Layout, ToolEnv};
use crate::fat::{self, LipoProbe};
use crate::metadata::{BuildVersion, fix_build_version};
use crate::prepare::{install_toolchain_components, prepare_directories};
use anyhow::{Context, Result};
use std::path::PathBuf;
use xcframework_bundle::{BuildOutput, BundleBuilder, Platform};

/// Drives preparation, every per-target build and bundle assembly.
///
/// Platforms are built strictly in table order; the first failure aborts the
/// run before any later platform is attempted and before `Info.plist` is
/// written.
pub struct Pipeline<'a, R: CommandRunner> {
    runner: &'a R,
    config: &'a Config,
    layout: &'a Layout,
    env: &'a ToolEnv,
}

impl<'a, R: CommandRunner> Pipeline<'a, R> {
    pub fn new(runner: &'a R, config: &'a Config, layout: &'a Layout, env: &'a ToolEnv) -> Self {
        Self {
            runner,
            config,
            layout,
            env,
        }
    }

    /// Build `sdk`, or every platform when `None`, and return the bundle path.
    pub fn run(&self, sdk: Option<Platform>, skip_prepare: bool) -> Result<PathBuf> {
        let platforms: Vec<Platform> = match sdk {
            Some(platform) => vec![platform],
            None => Platform::all().to_vec(),
        };

        prepare_directories(self.layout, &self.config.output.name)?;
        if skip_prepare {
            tracing::debug!("skipping toolchain setup");
        } else {
            install_toolchain_components(
                self.runner,
                self.layout,
                self.env,
                &self.config.toolchain.nightly,
            );
        }

        let mut built = Vec::with_capacity(platforms.len());
        for platform in platforms {
            let output = self.build_platform(platform)?;
            built.push((platform, output));
        }

        self.assemble(&built)
    }

    /// Build every target of `platform` and merge the results.
    fn build_platform(&self, platform: Platform) -> Result<BuildOutput> {
        let builder = TargetBuilder::new(
            self.runner,
            self.layout,
            self.env,
            &self.config.krate.features,
            &self.config.toolchain.nightly,
        );

        let mut outputs = Vec::new();
        for (triple, arch) in platform.targets() {
            let output = builder.build(platform, triple, arch)?;

            if platform.needs_build_version_fix() && self.config.toolchain.fix_tvos_metadata {
                fix_build_version(self.runner, self.env, &output.library(), &BuildVersion::TVOS)
                    .with_context(|| format!("Failed to fix platform metadata for {triple}"))?;
            }

            outputs.push(output);
        }

        fat::combine(
            self.runner,
            self.env,
            &self.layout.build_dir,
            platform,
            outputs,
        )
    }

    fn assemble(&self, built: &[(Platform, BuildOutput)]) -> Result<PathBuf> {
        tracing::info!("Creating XCFramework...");

        let probe = LipoProbe::new(self.runner, self.env);
        let mut bundle =
            BundleBuilder::create(&self.layout.xcframework_dir, &self.config.output.name, &probe)?;
        for (platform, output) in built {
            bundle = bundle.add_platform(*platform, output)?;
        }

        bundle.write().context("Failed to write XCFramework")
    }
}

#[cfg(test)]
#[path = "pipeline/pipeline_tests.rs"]
mod pipeline_tests;
