use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::bundle::{BundleProvider, DirListing};
use crate::error::Result;

/// Bundle provider over an extracted bundle tree on disk.
///
/// Listings come back sorted so browsing order is stable across platforms.
#[derive(Debug, Clone)]
pub struct FsBundleProvider {
    root: PathBuf,
}

impl FsBundleProvider {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Recursively finds every table file under the root, as bundle-relative
    /// `/`-separated paths, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the walk fails on an unreadable entry.
    pub fn walk_tables(&self) -> Result<Vec<String>> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            let lower = name.to_ascii_lowercase();
            if !(lower.ends_with(".dat") || lower.ends_with(".dat64")) {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                paths.push(to_bundle_path(relative));
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let mut resolved = self.root.clone();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            resolved.push(part);
        }
        resolved
    }
}

fn to_bundle_path(relative: &Path) -> String {
    let mut out = String::new();
    for component in relative.components() {
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(&component.as_os_str().to_string_lossy());
    }
    out
}

impl BundleProvider for FsBundleProvider {
    fn load_file_content(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.resolve(path))?)
    }

    fn list_directory(&self, path: &str) -> Result<DirListing> {
        let mut listing = DirListing::default();
        for entry in fs::read_dir(self.resolve(path))? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_dir() {
                listing.directories.push(name);
            } else {
                listing.files.push(name);
            }
        }
        listing.files.sort();
        listing.directories.sort();
        Ok(listing)
    }

    fn list_root_directories(&self) -> Result<Vec<String>> {
        Ok(self.list_directory("")?.directories)
    }
}
