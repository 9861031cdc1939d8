//! Discovery of level files on disk.

use std::path::{Path, PathBuf};

use thiserror::Error;

const TESTING_LEVEL: &str = "testing.toml";
const LEVEL_PREFIX: &str = "level_";
const LEVEL_EXTENSION: &str = "toml";

/// Ordered list of level files found in a directory.
///
/// The optional `testing.toml` comes first, followed by `level_0.toml`,
/// `level_1.toml` and so on up to the first missing number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelCatalog {
    directory: PathBuf,
    levels: Vec<PathBuf>,
}

impl LevelCatalog {
    /// Scans `directory` for level files.
    pub fn discover(directory: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(CatalogError::MissingDirectory(directory.to_path_buf()));
        }

        let mut levels = Vec::new();
        let testing = directory.join(TESTING_LEVEL);
        if testing.is_file() {
            levels.push(testing);
        }

        for number in 0_u32.. {
            let candidate = directory.join(format!("{LEVEL_PREFIX}{number}.{LEVEL_EXTENSION}"));
            if !candidate.is_file() {
                break;
            }
            levels.push(candidate);
        }

        if levels.is_empty() {
            return Err(CatalogError::Empty(directory.to_path_buf()));
        }

        Ok(Self {
            directory: directory.to_path_buf(),
            levels,
        })
    }

    /// Directory the catalog was discovered in.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Level files in play order.
    #[must_use]
    pub fn levels(&self) -> &[PathBuf] {
        &self.levels
    }

    /// Number of levels available.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Reports whether the catalog holds no levels. Discovery never produces
    /// such a catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level file for `level_number`, cycling past the end of the catalog.
    pub fn select(&self, level_number: usize) -> Result<&Path, CatalogError> {
        if self.levels.is_empty() {
            return Err(CatalogError::Empty(self.directory.clone()));
        }
        Ok(&self.levels[level_number % self.levels.len()])
    }
}

/// Errors raised while discovering levels.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The level directory does not exist.
    #[error("level directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),
    /// The directory contains no level files.
    #[error("no level files found in {}", .0.display())]
    Empty(PathBuf),
}
