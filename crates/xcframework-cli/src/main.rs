//! build-xcframework - Cross-compile an FFI crate into an XCFramework
//!
//! Commands:
//! - `build-xcframework [--sdk <name>]` - Build every platform (or one SDK) and
//!   assemble `<name>.xcframework`
//! - `build-xcframework inspect <bundle>` - Validate and list an existing bundle

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use xcframework_bundle::Platform;

mod build;
mod command;
mod config;
mod fat;
mod inspect;
mod logging;
mod metadata;
mod pipeline;
mod prepare;

#[cfg(test)]
mod testing;

use command::SystemRunner;
use config::{Config, ToolEnv};
use pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "build-xcframework")]
#[command(author, version, about = "Build an XCFramework from a Rust FFI crate", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    build: BuildArgs,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct BuildArgs {
    /// Build only this SDK (iphoneos, iphonesimulator, appletvos,
    /// appletvsimulator, macosx, maccatalyst)
    #[arg(long, value_parser = parse_sdk)]
    sdk: Option<Platform>,

    /// Project root containing the crate directory (default: current directory)
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Path to xcframework.toml (default: <project-root>/xcframework.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip installing rustup components and targets
    #[arg(long)]
    skip_prepare: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an existing XCFramework and list its libraries
    Inspect {
        /// Path to the .xcframework directory
        path: PathBuf,
    },
}

/// Accepts SDK names in any case, as Xcode's `SDK_NAME` may report them.
fn parse_sdk(value: &str) -> Result<Platform, String> {
    Platform::from_sdk_name(value).ok_or_else(|| {
        let known: Vec<&str> = Platform::all().iter().map(Platform::as_str).collect();
        format!("unknown SDK '{value}' (expected one of: {})", known.join(", "))
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Some(Commands::Inspect { path }) => inspect::run(&path)?,
        None => build(cli.build)?,
    }

    Ok(())
}

fn build(args: BuildArgs) -> anyhow::Result<()> {
    let root = std::fs::canonicalize(&args.project_root).with_context(|| {
        format!("Project root not found: {}", args.project_root.display())
    })?;
    let config = Config::load(&root, args.config.as_deref())?;
    let layout = config.layout(&root);
    let env = ToolEnv::from_env();

    match args.sdk {
        Some(platform) => println!(
            "Building {} for {} only",
            config.output.name,
            platform.config().display_name
        ),
        None => println!("Building {} for all platforms", config.output.name),
    }

    let bundle = Pipeline::new(&SystemRunner, &config, &layout, &env)
        .run(args.sdk, args.skip_prepare)?;

    println!("✓ XCFramework created: {}", bundle.display());
    Ok(())
}
