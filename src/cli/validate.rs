//! Validation command for shortcut configuration files.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::{self, HostBinding};
use clap::Args;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Validate a layer shortcut configuration file
#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Path to configuration JSON file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Key already bound by the host, as KEY or KEY=TITLE (repeatable)
    #[arg(long = "reserved", value_name = "KEY")]
    pub reserved: Vec<String>,
}

/// One configuration error in the response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEntry {
    /// Error kind
    pub kind: String,
    /// Offending field
    pub field: String,
    /// Message
    pub message: String,
}

/// One host key conflict in the response.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictEntry {
    /// Configured key
    pub key: String,
    /// Title of the configured shortcut
    pub shortcut: String,
    /// Title of the host action
    pub host: String,
}

/// Result of validating one file.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateResponse {
    /// Whether the configuration loads
    pub valid: bool,
    /// Technology, when the configuration loads
    pub technology: Option<String>,
    /// Number of shortcuts, when the configuration loads
    pub shortcuts: usize,
    /// Every error found
    pub errors: Vec<ErrorEntry>,
    /// Keys the host already binds
    pub conflicts: Vec<ConflictEntry>,
}

/// Splits `KEY=TITLE`; a lone `=` or a key without title is taken as is.
fn parse_reserved(spec: &str) -> HostBinding {
    match spec.split_once('=') {
        Some((key, title)) if !key.is_empty() => HostBinding {
            title: title.to_string(),
            key: key.to_string(),
        },
        _ => HostBinding {
            title: spec.to_string(),
            key: spec.to_string(),
        },
    }
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> CliResult<()> {
        let content = fs::read_to_string(&self.file).map_err(|e| {
            CliError::io(format!(
                "Failed to read configuration file {}: {e}",
                self.file.display()
            ))
        })?;

        let errors = config::validate(&content);
        let loaded = if errors.is_empty() {
            config::load(&content).ok()
        } else {
            None
        };

        let host_bindings: Vec<HostBinding> =
            self.reserved.iter().map(|s| parse_reserved(s)).collect();
        let conflicts = loaded
            .as_ref()
            .map(|c| c.conflicts(&host_bindings))
            .unwrap_or_default();

        let response = ValidateResponse {
            valid: loaded.is_some(),
            technology: loaded.as_ref().map(|c| c.technology().to_string()),
            shortcuts: loaded.as_ref().map_or(0, |c| c.shortcuts().len()),
            errors: errors
                .iter()
                .map(|e| ErrorEntry {
                    kind: e.kind.to_string(),
                    field: e.field.clone(),
                    message: e.message.clone(),
                })
                .collect(),
            conflicts: conflicts
                .into_iter()
                .map(|c| ConflictEntry {
                    key: c.key,
                    shortcut: c.shortcut_title,
                    host: c.host_title,
                })
                .collect(),
        };

        if self.json {
            print_json(&response)?;
        } else {
            if let Some(technology) = &response.technology {
                println!(
                    "✓ Valid configuration for '{technology}' ({} shortcut(s))",
                    response.shortcuts
                );
            } else {
                println!("✗ Validation failed");
            }

            if !response.errors.is_empty() {
                println!("\nErrors:");
                for error in &response.errors {
                    println!("  ✗ {} at {}: {}", error.kind, error.field, error.message);
                }
            }

            if !response.conflicts.is_empty() {
                println!("\nConflicts with host key bindings:");
                for conflict in &response.conflicts {
                    println!(
                        "  ⚠ '{}' is bound to '{}' and to '{}'",
                        conflict.key, conflict.shortcut, conflict.host
                    );
                }
            }
        }

        if !response.valid {
            return Err(CliError::validation("Validation failed"));
        }

        Ok(())
    }
}
