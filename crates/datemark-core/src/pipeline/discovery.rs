//! File discovery for finding images in directories.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;

/// Discovers image files in directories.
pub struct FileDiscovery {
    config: ProcessingConfig,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Path relative to the input root (just the file name for single files)
    pub relative: PathBuf,
}

/// Everything found under an input path.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Supported files, sorted by path
    pub files: Vec<DiscoveredFile>,
    /// Regular files ignored because of their extension
    pub skipped: usize,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Discover all supported image files at a path.
    ///
    /// If path is a file, returns it if supported.
    /// If path is a directory, recursively finds all supported files,
    /// never descending into `exclude` (the output root).
    pub fn discover(&self, path: &Path, exclude: Option<&Path>) -> Discovery {
        let mut discovery = Discovery::default();

        if path.is_file() {
            if !self.is_supported(path) {
                tracing::debug!("Skipping unsupported file {:?}", path);
                discovery.skipped = 1;
                return discovery;
            }
            let relative = path.file_name().map(PathBuf::from).unwrap_or_default();
            discovery.files.push(DiscoveredFile {
                path: path.to_path_buf(),
                relative,
            });
            return discovery;
        }

        let walker = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| exclude.map_or(true, |ex| entry.path() != ex));

        for entry in walker.filter_map(|e| e.ok()) {
            let entry_path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if !self.is_supported(entry_path) {
                tracing::debug!("Skipping unsupported file {:?}", entry_path);
                discovery.skipped += 1;
                continue;
            }
            let Ok(relative) = entry_path.strip_prefix(path) else {
                continue;
            };
            discovery.files.push(DiscoveredFile {
                path: entry_path.to_path_buf(),
                relative: relative.to_path_buf(),
            });
        }

        // Sort by path for deterministic ordering
        discovery.files.sort_by(|a, b| a.path.cmp(&b.path));
        discovery
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}
