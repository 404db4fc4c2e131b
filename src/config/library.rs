//! Discovery of configuration files by technology.
//!
//! Every `*.json` file in the search path is loaded and indexed by its
//! `technology` field. Files that fail to load are skipped and remembered as
//! [`LoadFailure`]s, so one broken file never disables the others.

use super::model::Configuration;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// A loaded configuration and where it came from.
#[derive(Debug, Clone)]
pub struct LibraryEntry {
    /// Source file, `None` for configurations inserted programmatically
    pub path: Option<PathBuf>,
    /// The validated configuration
    pub config: Arc<Configuration>,
}

/// A configuration file that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    /// File or directory that failed
    pub path: PathBuf,
    /// Error description
    pub error: String,
}

/// Configurations indexed by technology name.
#[derive(Debug, Clone, Default)]
pub struct ConfigLibrary {
    search_path: Vec<PathBuf>,
    by_technology: BTreeMap<String, LibraryEntry>,
    failures: Vec<LoadFailure>,
}

impl ConfigLibrary {
    /// Creates an empty library with the given search path (not scanned yet).
    #[must_use]
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self {
            search_path,
            by_technology: BTreeMap::new(),
            failures: Vec::new(),
        }
    }

    /// Creates a library and scans its search path.
    #[must_use]
    pub fn scan(search_path: Vec<PathBuf>) -> Self {
        let mut library = Self::new(search_path);
        library.reload();
        library
    }

    /// Directories scanned by [`reload`](Self::reload).
    #[must_use]
    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// Rescans the search path, replacing every previously loaded entry.
    ///
    /// Files are loaded in sorted path order. When two files declare the same
    /// technology, the later one wins.
    pub fn reload(&mut self) {
        self.by_technology.clear();
        self.failures.clear();

        let mut files = BTreeSet::new();
        for dir in &self.search_path {
            match json_files(dir) {
                Ok(found) => files.extend(found),
                Err(e) => {
                    warn!("Failed to scan configuration directory {}: {e}", dir.display());
                    self.failures.push(LoadFailure {
                        path: dir.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        for file in files {
            match super::load_file(&file) {
                Ok(config) => self.insert_entry(Some(file), config),
                Err(e) => {
                    error!("Failed to load layer shortcut file {}, skipping: {e:#}", file.display());
                    self.failures.push(LoadFailure {
                        path: file,
                        error: format!("{e:#}"),
                    });
                }
            }
        }

        info!(
            "Loaded {} layer shortcut configuration(s), {} failure(s)",
            self.by_technology.len(),
            self.failures.len()
        );
    }

    /// Adds a configuration that did not come from the search path.
    pub fn insert(&mut self, config: Configuration) {
        self.insert_entry(None, config);
    }

    fn insert_entry(&mut self, path: Option<PathBuf>, config: Configuration) {
        let technology = config.technology().to_string();
        let entry = LibraryEntry {
            path,
            config: Arc::new(config),
        };

        if let Some(previous) = self.by_technology.insert(technology.clone(), entry) {
            warn!(
                "Technology '{technology}' is configured more than once; {} replaces {}",
                describe(self.by_technology[&technology].path.as_deref()),
                describe(previous.path.as_deref())
            );
        } else {
            debug!("Registered layer shortcuts for technology '{technology}'");
        }
    }

    /// Configuration for a technology, if one was loaded.
    #[must_use]
    pub fn get(&self, technology: &str) -> Option<Arc<Configuration>> {
        self.by_technology
            .get(technology)
            .map(|entry| Arc::clone(&entry.config))
    }

    /// Loaded entries, sorted by technology name.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &LibraryEntry)> {
        self.by_technology.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Technology names with a loaded configuration, sorted.
    pub fn technologies(&self) -> impl Iterator<Item = &str> {
        self.by_technology.keys().map(String::as_str)
    }

    /// Files and directories that failed during the last scan.
    #[must_use]
    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }
}

/// Lists `*.json` files directly inside `dir`. A missing directory is empty.
fn json_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !dir.exists() {
        debug!("Configuration directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(files)
}

fn describe(path: Option<&Path>) -> String {
    path.map_or_else(|| "<inserted>".to_string(), |p| p.display().to_string())
}
