//! Lists the technologies found in the configuration search path.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::ConfigLibrary;
use crate::constants::APP_NAME;
use crate::settings::Settings;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// List configured technologies
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Directory to scan instead of the configured search path (repeatable)
    #[arg(long = "search-path", value_name = "DIR")]
    pub search_path: Vec<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// One loaded technology.
#[derive(Debug, Clone, Serialize)]
pub struct TechnologyEntry {
    /// Technology name
    pub technology: String,
    /// Number of shortcuts
    pub shortcuts: usize,
    /// Number of layer groups
    pub groups: usize,
    /// Source file
    pub path: Option<PathBuf>,
}

/// One file that failed to load.
#[derive(Debug, Clone, Serialize)]
pub struct FailureEntry {
    /// File or directory
    pub path: PathBuf,
    /// Error description
    pub error: String,
}

/// Response of the list command.
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    /// Directories scanned
    pub search_path: Vec<PathBuf>,
    /// Loaded technologies, sorted by name
    pub technologies: Vec<TechnologyEntry>,
    /// Files skipped
    pub failures: Vec<FailureEntry>,
}

impl ListArgs {
    /// Execute the list command
    pub fn execute(&self) -> CliResult<()> {
        let search_path = if self.search_path.is_empty() {
            Settings::load()
                .map_err(|e| CliError::io(format!("Failed to load settings: {e:#}")))?
                .effective_search_path(&[])
        } else {
            self.search_path.clone()
        };

        let library = ConfigLibrary::scan(search_path);

        let response = ListResponse {
            search_path: library.search_path().to_vec(),
            technologies: library
                .entries()
                .map(|(technology, entry)| TechnologyEntry {
                    technology: technology.to_string(),
                    shortcuts: entry.config.shortcuts().len(),
                    groups: entry.config.groups().len(),
                    path: entry.path.clone(),
                })
                .collect(),
            failures: library
                .failures()
                .iter()
                .map(|f| FailureEntry {
                    path: f.path.clone(),
                    error: f.error.clone(),
                })
                .collect(),
        };

        if self.json {
            return print_json(&response);
        }

        println!("{APP_NAME} search path:");
        for dir in &response.search_path {
            println!("  {}", dir.display());
        }
        println!();

        if response.technologies.is_empty() {
            println!("No layer shortcut configurations found.");
        } else {
            println!("Technologies:");
            for entry in &response.technologies {
                let source = entry
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!(
                    "  {:<16} {:>3} shortcut(s) {:>3} group(s)  {source}",
                    entry.technology, entry.shortcuts, entry.groups
                );
            }
        }

        if !response.failures.is_empty() {
            println!("\nSkipped:");
            for failure in &response.failures {
                println!("  ⚠ {}: {}", failure.path.display(), failure.error);
            }
        }

        Ok(())
    }
}
