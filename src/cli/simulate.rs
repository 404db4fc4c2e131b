//! Presses keys against an in-memory layer list.
//!
//! Useful for checking a configuration against a technology's layers without
//! a running layout viewer.

use crate::catalog::MemoryCatalog;
use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::{self, ConfigLibrary};
use crate::engine::{Engine, ViewId};
use crate::shortcuts::KeyBinding;
use crate::state::FocusState;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

const VIEW: ViewId = ViewId(0);

/// Simulate key presses against a layer list
#[derive(Debug, Clone, Args)]
pub struct SimulateArgs {
    /// Path to configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub config: PathBuf,

    /// Path to layer list JSON file
    #[arg(long, value_name = "FILE")]
    pub catalog: PathBuf,

    /// Keys to press, in order
    #[arg(value_name = "KEY", required = true)]
    pub keys: Vec<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// One key press.
#[derive(Debug, Clone, Serialize)]
pub struct StepEntry {
    /// Key as given
    pub key: String,
    /// Shortcut title, when the key is bound
    pub title: Option<String>,
    /// Layers changed
    pub changed: usize,
    /// Layer made current
    pub selected: Option<String>,
    /// Warnings
    pub warnings: Vec<String>,
    /// Error, when the press failed
    pub error: Option<String>,
    /// Focused group after the press
    pub focused: Option<String>,
}

/// Final visibility of one layer.
#[derive(Debug, Clone, Serialize)]
pub struct LayerEntry {
    /// Layer label
    pub layer: String,
    /// Visibility
    pub visible: bool,
}

/// Response of the simulate command.
#[derive(Debug, Clone, Serialize)]
pub struct SimulateResponse {
    /// Technology of the configuration
    pub technology: String,
    /// References the layer list cannot satisfy
    pub unresolved: Vec<String>,
    /// One entry per key
    pub steps: Vec<StepEntry>,
    /// Visibility after the last key
    pub layers: Vec<LayerEntry>,
}

impl SimulateArgs {
    /// Execute the simulate command
    pub fn execute(&self) -> CliResult<()> {
        if !self.config.exists() {
            return Err(CliError::io(format!(
                "Configuration file not found: {}",
                self.config.display()
            )));
        }
        let configuration = config::load_file(&self.config)
            .map_err(|e| CliError::validation(format!("{e:#}")))?;
        let catalog = MemoryCatalog::load(&self.catalog)
            .map_err(|e| CliError::io(format!("{e:#}")))?;

        let technology = configuration.technology().to_string();
        let mut library = ConfigLibrary::new(Vec::new());
        library.insert(configuration);

        let mut engine = Engine::new(library);
        let report = engine.open_view(VIEW, &technology, catalog);

        let mut steps = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            let title = KeyBinding::parse(key).ok().and_then(|binding| {
                engine
                    .view(VIEW)
                    .ok()?
                    .configuration()?
                    .shortcut(&binding)
                    .map(|s| s.title.clone())
            });

            let mut step = StepEntry {
                key: key.clone(),
                title,
                changed: 0,
                selected: None,
                warnings: Vec::new(),
                error: None,
                focused: None,
            };
            match engine.handle_key(VIEW, key) {
                Ok(result) => {
                    step.changed = result.changed;
                    step.selected = result.selected;
                    step.warnings = result.warnings.iter().map(ToString::to_string).collect();
                }
                Err(e) => step.error = Some(e.to_string()),
            }
            if let Ok(state) = engine.view(VIEW) {
                if let FocusState::Focused(group) = state.focus_state() {
                    step.focused = Some(group.clone());
                }
            }
            steps.push(step);
        }

        let catalog = engine
            .close_view(VIEW)
            .ok_or_else(|| CliError::io("View closed unexpectedly"))?;

        let response = SimulateResponse {
            technology,
            unresolved: report.warnings.iter().map(ToString::to_string).collect(),
            steps,
            layers: catalog
                .visibility()
                .into_iter()
                .map(|(layer, visible)| LayerEntry { layer, visible })
                .collect(),
        };

        let failed = response.steps.iter().any(|s| s.error.is_some());

        if self.json {
            print_json(&response)?;
        } else {
            print_human(&response);
        }

        if failed {
            return Err(CliError::validation("One or more keys failed"));
        }
        Ok(())
    }
}

fn print_human(response: &SimulateResponse) {
    println!("Technology: {}", response.technology);
    for warning in &response.unresolved {
        println!("  ⚠ {warning}");
    }

    println!();
    for step in &response.steps {
        match (&step.error, &step.title) {
            (Some(error), _) => println!("[{}] ✗ {error}", step.key),
            (None, Some(title)) => println!("[{}] {title}: {} changed", step.key, step.changed),
            (None, None) => println!("[{}] {} changed", step.key, step.changed),
        }
        if let Some(selected) = &step.selected {
            println!("    selected {selected}");
        }
        for warning in &step.warnings {
            println!("    ⚠ {warning}");
        }
        if let Some(group) = &step.focused {
            println!("    focused on {group}");
        }
    }

    println!("\nLayers:");
    for layer in &response.layers {
        let mark = if layer.visible { "x" } else { " " };
        println!("  [{mark}] {}", layer.layer);
    }
}
