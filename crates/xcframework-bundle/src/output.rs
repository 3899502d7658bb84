//! Build output directories.

use crate::{BundleError, BundleResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the header directory inside a build output.
pub const INCLUDE_DIR: &str = "include";

/// A directory holding one static library and, optionally, its headers.
///
/// ```text
/// build/idevice_ffi/iphoneos-arm64/
/// ├── libidevice_ffi.a
/// └── include/
///     └── idevice.h
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    dir: PathBuf,
    library_name: String,
}

impl BuildOutput {
    /// Wrap an output directory. `library_name` is the archive file name,
    /// e.g. `libidevice_ffi.a`.
    pub fn new<P: Into<PathBuf>>(dir: P, library_name: &str) -> Self {
        Self {
            dir: dir.into(),
            library_name: library_name.to_string(),
        }
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Archive file name.
    #[must_use]
    pub fn library_name(&self) -> &str {
        &self.library_name
    }

    /// Path of the static library.
    #[must_use]
    pub fn library(&self) -> PathBuf {
        self.dir.join(&self.library_name)
    }

    /// Path of the header directory, whether or not it exists.
    #[must_use]
    pub fn include_dir(&self) -> PathBuf {
        self.dir.join(INCLUDE_DIR)
    }

    /// Header directory if the build produced one.
    #[must_use]
    pub fn headers(&self) -> Option<PathBuf> {
        let include = self.include_dir();
        include.is_dir().then_some(include)
    }

    /// Fail unless the static library exists.
    pub fn ensure_library(&self) -> BundleResult<PathBuf> {
        let library = self.library();
        if library.is_file() {
            Ok(library)
        } else {
            Err(BundleError::LibraryNotFound(library.display().to_string()))
        }
    }
}

/// Recursively copy a directory tree, creating `dst` as needed.
pub fn copy_dir_all<S: AsRef<Path>, D: AsRef<Path>>(src: S, dst: D) -> BundleResult<()> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}
