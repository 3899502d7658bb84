#![allow(non_snake_case)]

use super::*;
use crate::command::CommandError;
use crate::testing::{FakeRunner, failure, simulate_toolchain};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use xcframework_bundle::{INFO_PLIST, Manifest};

struct Project {
    _temp_dir: TempDir,
    config: Config,
    layout: Layout,
    env: ToolEnv,
}

impl Project {
    fn new() -> Self {
        Self::with_config(Config::default())
    }

    fn with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let layout = config.layout(temp_dir.path());
        fs::create_dir_all(&layout.crate_dir).unwrap();
        fs::write(&layout.header, b"#pragma once\n").unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
            layout,
            env: ToolEnv::from_lookup(|_| None),
        }
    }

    fn runner(&self) -> FakeRunner {
        let layout = self.layout.clone();
        FakeRunner::with_handler(move |inv| simulate_toolchain(&layout, inv))
    }

    fn run(&self, runner: &FakeRunner, sdk: Option<Platform>) -> Result<PathBuf> {
        Pipeline::new(runner, &self.config, &self.layout, &self.env).run(sdk, false)
    }

    fn bundle(&self) -> PathBuf {
        self.layout.xcframework_dir.join("idevice_ffi.xcframework")
    }
}

fn slot_dirs(bundle: &Path) -> BTreeSet<String> {
    fs::read_dir(bundle)
        .unwrap()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().unwrap().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect()
}

fn cargo_targets(runner: &FakeRunner) -> Vec<String> {
    runner
        .calls_to("cargo")
        .iter()
        .filter_map(|c| c.arg_after("--target").map(str::to_string))
        .collect()
}

// ============================================================================
// Full runs
// ============================================================================

#[test]
fn Pipeline___run___all_platforms_produce_six_slots() {
    let project = Project::new();
    let runner = project.runner();

    let bundle = project.run(&runner, None).unwrap();

    assert_eq!(bundle, project.bundle());
    let manifest = Manifest::from_file(bundle.join(INFO_PLIST)).unwrap();
    let identifiers: BTreeSet<String> = manifest
        .available_libraries
        .iter()
        .map(|l| l.library_identifier.clone())
        .collect();
    let expected: BTreeSet<String> = [
        "ios-arm64",
        "ios-arm64_x86_64-simulator",
        "tvos-arm64",
        "tvos-arm64_x86_64-simulator",
        "macos-arm64_x86_64",
        "ios-arm64_x86_64-maccatalyst",
    ]
    .into_iter()
    .map(str::to_string)
    .collect();
    assert_eq!(identifiers, expected);
    assert_eq!(slot_dirs(&bundle), expected);

    for entry in &manifest.available_libraries {
        let mut sorted = entry.supported_architectures.clone();
        sorted.sort();
        assert_eq!(entry.supported_architectures, sorted);
        assert!(
            bundle
                .join(&entry.library_identifier)
                .join("Headers/idevice.h")
                .is_file()
        );
    }
}

#[test]
fn Pipeline___run___builds_targets_in_table_order() {
    let project = Project::new();
    let runner = project.runner();

    project.run(&runner, None).unwrap();

    assert_eq!(
        cargo_targets(&runner),
        vec![
            "aarch64-apple-ios",
            "aarch64-apple-ios-sim",
            "x86_64-apple-ios",
            "aarch64-apple-tvos",
            "aarch64-apple-tvos-sim",
            "x86_64-apple-tvos",
            "aarch64-apple-darwin",
            "x86_64-apple-darwin",
            "aarch64-apple-ios-macabi",
            "x86_64-apple-ios-macabi",
        ]
    );
}

#[test]
fn Pipeline___run___single_sdk_produces_one_slot() {
    let project = Project::new();
    let runner = project.runner();

    let bundle = project
        .run(&runner, Some(Platform::IphoneSimulator))
        .unwrap();

    let manifest = Manifest::from_file(bundle.join(INFO_PLIST)).unwrap();
    assert_eq!(manifest.available_libraries.len(), 1);
    let entry = &manifest.available_libraries[0];
    assert_eq!(entry.library_identifier, "ios-arm64_x86_64-simulator");
    assert_eq!(entry.supported_architectures, vec!["arm64", "x86_64"]);
    assert_eq!(entry.supported_platform_variant.as_deref(), Some("simulator"));
    assert_eq!(
        slot_dirs(&bundle),
        BTreeSet::from(["ios-arm64_x86_64-simulator".to_string()])
    );
    assert_eq!(runner.calls_to("cargo").len(), 2);
}

#[test]
fn Pipeline___run___rerun_replaces_previous_bundle() {
    let project = Project::new();

    project.run(&project.runner(), None).unwrap();
    let bundle = project.run(&project.runner(), Some(Platform::MacOsx)).unwrap();

    assert_eq!(
        slot_dirs(&bundle),
        BTreeSet::from(["macos-arm64_x86_64".to_string()])
    );
    let manifest = Manifest::from_file(bundle.join(INFO_PLIST)).unwrap();
    assert_eq!(manifest.available_libraries.len(), 1);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn Pipeline___run___tvos_failure_aborts_before_later_platforms() {
    let project = Project::new();
    let layout = project.layout.clone();
    let runner = FakeRunner::with_handler(move |inv| {
        if inv.arg_after("--target") == Some("aarch64-apple-tvos") {
            Err(failure(inv))
        } else {
            simulate_toolchain(&layout, inv)
        }
    });

    let result = project.run(&runner, None);

    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("simulated failure"));
    assert!(!project.bundle().join(INFO_PLIST).exists());
    assert!(
        !cargo_targets(&runner)
            .iter()
            .any(|t| t.ends_with("apple-darwin"))
    );
}

#[test]
fn Pipeline___run___failure_removes_previous_bundle() {
    let project = Project::new();
    project
        .run(&project.runner(), Some(Platform::IphoneOs))
        .unwrap();

    let layout = project.layout.clone();
    let runner = FakeRunner::with_handler(move |inv| {
        if inv.program == "cargo" {
            Err(failure(inv))
        } else {
            simulate_toolchain(&layout, inv)
        }
    });
    let result = project.run(&runner, Some(Platform::IphoneOs));

    assert!(result.is_err());
    assert!(!project.bundle().join(INFO_PLIST).exists());
}

#[test]
fn Pipeline___run___missing_crate_dir_fails_before_any_tool() {
    let project = Project::new();
    fs::remove_dir_all(&project.layout.crate_dir).unwrap();
    let runner = project.runner();

    let result = project.run(&runner, None);

    assert!(result.is_err());
    assert!(runner.calls().is_empty());
}

#[test]
fn Pipeline___run___unavailable_lipo_falls_back_to_configured_archs() {
    let project = Project::new();
    let layout = project.layout.clone();
    let runner = FakeRunner::with_handler(move |inv| {
        if inv.program == "lipo" {
            Err(CommandError::Spawn {
                command: inv.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no lipo"),
            })
        } else {
            simulate_toolchain(&layout, inv)
        }
    });

    let bundle = project.run(&runner, Some(Platform::IphoneOs)).unwrap();

    let manifest = Manifest::from_file(bundle.join(INFO_PLIST)).unwrap();
    assert_eq!(manifest.available_libraries.len(), 1);
    let entry = &manifest.available_libraries[0];
    assert_eq!(entry.library_identifier, "ios-arm64");
    assert_eq!(entry.supported_architectures, vec!["arm64"]);
    assert_eq!(runner.calls_to("lipo").len(), 1);
}

// ============================================================================
// Toolchain steps
// ============================================================================

#[test]
fn Pipeline___run___rewrites_tvos_device_metadata_only() {
    let project = Project::new();
    let runner = project.runner();

    project.run(&runner, None).unwrap();

    let vtool = runner.calls_to("vtool");
    assert_eq!(vtool.len(), 1);
    assert!(
        vtool[0]
            .cwd
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("xcframework-objects")
    );
    let extracted: Vec<String> = runner
        .calls_to("ar")
        .iter()
        .filter(|c| c.args[0] == "x")
        .map(|c| c.args[1].clone())
        .collect();
    assert_eq!(extracted.len(), 1);
    assert!(extracted[0].contains("appletvos-arm64"));
}

#[test]
fn Pipeline___run___metadata_fix_can_be_disabled() {
    let mut config = Config::default();
    config.toolchain.fix_tvos_metadata = false;
    let project = Project::with_config(config);
    let runner = project.runner();

    project.run(&runner, Some(Platform::AppleTvOs)).unwrap();

    assert!(runner.calls_to("vtool").is_empty());
    assert!(runner.calls_to("ar").is_empty());
}

#[test]
fn Pipeline___run___skip_prepare_does_not_call_rustup() {
    let project = Project::new();
    let runner = project.runner();

    Pipeline::new(&runner, &project.config, &project.layout, &project.env)
        .run(Some(Platform::IphoneOs), true)
        .unwrap();

    assert!(runner.calls_to("rustup").is_empty());
    assert!(runner.calls_to("lipo").iter().all(|c| c.args[0] == "-info"));
}

#[test]
fn Pipeline___run___every_tool_gets_the_tool_env() {
    let project = Project::new();
    let runner = project.runner();

    project.run(&runner, Some(Platform::MacCatalyst)).unwrap();

    for call in runner.calls() {
        let env = call.env.as_ref().unwrap();
        assert_eq!(env.get("HOME"), Some("/"));
        assert_eq!(env.get("USER"), Some("unknown"));
    }
    let cargo = runner.calls_to("cargo");
    assert!(cargo.iter().all(|c| {
        let env = c.env.as_ref().unwrap();
        env.get("MACOSX_DEPLOYMENT_TARGET") == Some("13.1")
            && env.get("IPHONEOS_DEPLOYMENT_TARGET") == Some("13.1")
    }));
}
