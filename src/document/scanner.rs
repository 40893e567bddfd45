//! Source directory scanning.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::{PaperSiftError, Result};

/// Lists the `.txt` files directly inside a source directory.
///
/// The scan is not recursive. Results are sorted by file name so that
/// document ids are reproducible across runs.
#[derive(Clone, Debug)]
pub struct DirectoryScanner {
    directory: PathBuf,
    extension: String,
}

impl DirectoryScanner {
    /// Create a scanner for `.txt` files in `directory`.
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        DirectoryScanner {
            directory: directory.as_ref().to_path_buf(),
            extension: "txt".to_string(),
        }
    }

    /// The scanned directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Fail with a configuration error unless the directory exists and is a directory.
    pub fn validate(&self) -> Result<()> {
        match fs::metadata(&self.directory) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(PaperSiftError::configuration(format!(
                "source path is not a directory: {}",
                self.directory.display()
            ))),
            Err(e) => Err(PaperSiftError::configuration(format!(
                "source directory not found: {}: {e}",
                self.directory.display()
            ))),
        }
    }

    /// Scan the directory.
    ///
    /// A missing or unreadable directory yields an empty list with a warning.
    /// Files that cannot be opened are skipped with a warning.
    pub fn scan(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!(
                    "Cannot read source directory {}: {e}",
                    self.directory.display()
                );
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping unreadable directory entry: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.path())
            .filter(|path| self.has_extension(path))
            .filter(|path| match File::open(path) {
                Ok(_) => true,
                Err(e) => {
                    log::warn!("Skipping unreadable file {}: {e}", path.display());
                    false
                }
            })
            .collect();

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        log::debug!(
            "Found {} .{} files in {}",
            files.len(),
            self.extension,
            self.directory.display()
        );
        files
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}
