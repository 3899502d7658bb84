//! Build configuration
//!
//! Settings come from an optional `xcframework.toml` at the project root.
//! Every field has a default, so a project laid out like
//!
//! ```text
//! project/
//! ├── ffi/            # the crate being packaged
//! │   └── idevice.h
//! └── target/         # shared cargo target directory
//! ```
//!
//! needs no configuration file at all.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "xcframework.toml";

/// `xcframework.toml` structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, rename = "crate")]
    pub krate: CrateSection,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub toolchain: ToolchainSection,
}

/// The crate being cross-compiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrateSection {
    /// Crate directory, relative to the project root.
    #[serde(default = "default_crate_dir")]
    pub dir: PathBuf,

    /// Library name; the archive is `lib<lib_name>.a`.
    #[serde(default = "default_lib_name")]
    pub lib_name: String,

    /// Header file inside the crate directory.
    #[serde(default = "default_header")]
    pub header: String,

    /// Cargo features to enable. Default features are always disabled.
    #[serde(default = "default_features")]
    pub features: Vec<String>,

    /// Cargo target directory, relative to the crate directory's parent.
    #[serde(default = "default_target_dir")]
    pub target_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSection {
    /// Scratch directory for per-target outputs.
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// Directory that receives `<name>.xcframework`.
    #[serde(default = "default_xcframework_dir")]
    pub xcframework_dir: PathBuf,

    /// Bundle name without extension.
    #[serde(default = "default_lib_name")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainSection {
    /// Toolchain used for Tier 3 (tvOS) targets.
    #[serde(default = "default_nightly")]
    pub nightly: String,

    /// Rewrite tvOS build-version metadata after building.
    #[serde(default = "default_true")]
    pub fix_tvos_metadata: bool,
}

fn default_crate_dir() -> PathBuf {
    PathBuf::from("ffi")
}

fn default_lib_name() -> String {
    "idevice_ffi".to_string()
}

fn default_header() -> String {
    "idevice.h".to_string()
}

fn default_features() -> Vec<String> {
    vec!["full".to_string(), "ring".to_string()]
}

fn default_target_dir() -> PathBuf {
    PathBuf::from("target")
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("build/idevice_ffi")
}

fn default_xcframework_dir() -> PathBuf {
    PathBuf::from("xcframework")
}

fn default_nightly() -> String {
    "nightly".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CrateSection {
    fn default() -> Self {
        Self {
            dir: default_crate_dir(),
            lib_name: default_lib_name(),
            header: default_header(),
            features: default_features(),
            target_dir: default_target_dir(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            build_dir: default_build_dir(),
            xcframework_dir: default_xcframework_dir(),
            name: default_lib_name(),
        }
    }
}

impl Default for ToolchainSection {
    fn default() -> Self {
        Self {
            nightly: default_nightly(),
            fix_tvos_metadata: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from string
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config")
    }

    /// Load the explicit config file, or `<root>/xcframework.toml` if it
    /// exists, or the defaults.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = root.join(CONFIG_FILE);
                if path.is_file() {
                    tracing::debug!(path = %path.display(), "loading config");
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.krate.lib_name.is_empty() {
            anyhow::bail!("crate.lib_name cannot be empty");
        }

        if self.krate.header.is_empty() {
            anyhow::bail!("crate.header cannot be empty");
        }

        if self.krate.features.is_empty() {
            anyhow::bail!("crate.features must list at least one feature");
        }

        if self.output.name.is_empty() {
            anyhow::bail!("output.name cannot be empty");
        }

        if self.toolchain.nightly.is_empty() {
            anyhow::bail!("toolchain.nightly cannot be empty");
        }

        Ok(())
    }

    /// Resolve all paths against the project root.
    #[must_use]
    pub fn layout(&self, root: &Path) -> Layout {
        let crate_dir = root.join(&self.krate.dir);
        let target_dir = crate_dir
            .parent()
            .unwrap_or(root)
            .join(&self.krate.target_dir);

        Layout {
            root: root.to_path_buf(),
            header: crate_dir.join(&self.krate.header),
            crate_dir,
            target_dir,
            build_dir: root.join(&self.output.build_dir),
            xcframework_dir: root.join(&self.output.xcframework_dir),
            library_file: format!("lib{}.a", self.krate.lib_name),
        }
    }
}

/// Absolute locations used by a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub crate_dir: PathBuf,
    pub header: PathBuf,
    pub target_dir: PathBuf,
    pub build_dir: PathBuf,
    pub xcframework_dir: PathBuf,
    /// `lib<name>.a`
    pub library_file: String,
}

impl Layout {
    /// Where cargo leaves the release archive for `triple`.
    #[must_use]
    pub fn cargo_output(&self, triple: &str) -> PathBuf {
        self.target_dir
            .join(triple)
            .join("release")
            .join(&self.library_file)
    }
}

/// Environment handed to every subprocess.
///
/// Rebuilt from a handful of variables of the invoking environment instead of
/// inheriting it, so builds do not pick up stray `CARGO_*` or SDK settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolEnv {
    vars: BTreeMap<String, String>,
}

/// Inherited variables and the value used when they are unset.
const INHERITED: &[(&str, &str)] = &[
    ("HOME", "/"),
    ("USER", "unknown"),
    ("SHELL", "/bin/zsh"),
    ("TERM", "xterm-256color"),
    ("LANG", "en_US.UTF-8"),
    ("LC_ALL", "en_US.UTF-8"),
];

const SYSTEM_PATH: &str = "/usr/bin:/bin:/usr/sbin:/sbin:/opt/homebrew/bin:/usr/local/bin";

impl ToolEnv {
    /// Build from the current process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut vars = BTreeMap::new();
        for (key, default) in INHERITED {
            let value = lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| (*default).to_string());
            vars.insert((*key).to_string(), value);
        }

        let home = vars.get("HOME").cloned().unwrap_or_default();
        vars.insert(
            "PATH".to_string(),
            format!("{}/.cargo/bin:{SYSTEM_PATH}", home.trim_end_matches('/')),
        );

        Self { vars }
    }

    /// Copy with one extra variable set.
    #[must_use]
    pub fn with(&self, key: &str, value: &str) -> Self {
        let mut env = self.clone();
        env.vars.insert(key.to_string(), value.to_string());
        env
    }

    /// Look up a variable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// All variables, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
