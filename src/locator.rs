// SPDX-License-Identifier: MIT
// Model artifact discovery. The core only consumes the trait; the bundled
// implementation scans local directories and never errors.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Where a locator should look for model artifacts.
///
/// Borrowed view over a strategy's configuration: its storage directory,
/// its remote source, and the user-supplied search directory. The remote
/// source is carried for locators that fetch; the bundled one ignores it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ModelQuery<'a> {
    pub storage_dir: Option<&'a Path>,
    pub remote_source: Option<&'a str>,
    pub user_dir: Option<&'a Path>,
    /// Extensions without the leading dot, e.g. `["pth", "onnx"]`.
    pub ext_filter: Option<&'a [&'a str]>,
}

/// Resolves candidate model file paths from configured sources.
///
/// Infallible by contract: an unreachable directory contributes nothing
/// rather than raising. Validation of what the paths contain is
/// `load_model`'s job, not the locator's.
pub trait ModelLocator: Send + Sync {
    fn locate(&self, query: &ModelQuery<'_>) -> Vec<PathBuf>;
}

/// Filesystem locator: scans the storage directory, then the user search
/// directory, filtering by extension. Results are sorted and deduplicated
/// so enumeration order is stable across runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirModelLocator;

impl ModelLocator for DirModelLocator {
    fn locate(&self, query: &ModelQuery<'_>) -> Vec<PathBuf> {
        let mut found = Vec::new();
        for dir in [query.storage_dir, query.user_dir].into_iter().flatten() {
            scan_dir(dir, query.ext_filter, &mut found);
        }
        found.sort();
        found.dedup();
        found
    }
}

fn scan_dir(dir: &Path, ext_filter: Option<&[&str]>, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() && matches_ext(&path, ext_filter) {
            out.push(path);
        }
    }
}

fn matches_ext(path: &Path, ext_filter: Option<&[&str]>) -> bool {
    let Some(exts) = ext_filter else {
        return true;
    };
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|e| exts.iter().any(|want| want.eq_ignore_ascii_case(e)))
}
