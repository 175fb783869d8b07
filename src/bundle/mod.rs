mod fs;

pub use fs::FsBundleProvider;

use crate::error::Result;

/// One directory level of the bundle tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    pub files: Vec<String>,
    pub directories: Vec<String>,
}

/// Source of bundle content and directory structure.
///
/// Retrieval and caching live behind this trait; by the time the decoder
/// runs, bytes are resident in memory. Implementations are constructed once
/// at startup and passed by reference into the browser.
pub trait BundleProvider {
    /// Loads the raw bytes of the file at `path` (bundle-relative, `/`
    /// separated).
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be read.
    fn load_file_content(&self, path: &str) -> Result<Vec<u8>>;

    /// Lists files and subdirectories directly under `path` (`""` for the
    /// root).
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be enumerated.
    fn list_directory(&self, path: &str) -> Result<DirListing>;

    /// Lists the top-level directories of the bundle.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be enumerated.
    fn list_root_directories(&self) -> Result<Vec<String>>;
}
