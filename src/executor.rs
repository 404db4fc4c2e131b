//! Applies a [`VisibilityPlan`] through the catalog.
//!
//! Application is best effort: a write the host rejects becomes a
//! [`Warning::CatalogWriteFailed`] and the remaining writes still run.

use crate::catalog::LayerCatalog;
use crate::state::VisibilityPlan;
use crate::warning::Warning;
use tracing::{debug, warn};

/// What one key press changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Number of layers whose visibility was written successfully
    pub changed: usize,
    /// Label of the layer made current, if a `select` action succeeded
    pub selected: Option<String>,
    /// Warnings from planning and execution
    pub warnings: Vec<Warning>,
}

impl ExecutionResult {
    /// One-line summary for status bars and logs.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut summary = format!("{} layer(s) changed", self.changed);
        if let Some(selected) = &self.selected {
            summary.push_str(&format!(", selected {selected}"));
        }
        if !self.warnings.is_empty() {
            summary.push_str(&format!(", {} warning(s)", self.warnings.len()));
        }
        summary
    }
}

/// Writes a plan to the catalog in plan order.
pub fn apply<C>(plan: VisibilityPlan, catalog: &mut C) -> ExecutionResult
where
    C: LayerCatalog + ?Sized,
{
    let mut result = ExecutionResult {
        warnings: plan.warnings,
        ..ExecutionResult::default()
    };

    for write in plan.writes {
        match catalog.set_visibility(write.handle, write.visible) {
            Ok(()) => {
                debug!("{} -> {}", write.label, if write.visible { "visible" } else { "hidden" });
                result.changed += 1;
            }
            Err(e) => {
                warn!("Failed to set visibility of {}: {}", write.label, e.reason);
                result.warnings.push(Warning::CatalogWriteFailed {
                    layer: write.label,
                    reason: e.reason,
                });
            }
        }
    }

    if let Some(selection) = plan.selection {
        match catalog.set_selected(selection.handle) {
            Ok(()) => result.selected = Some(selection.label),
            Err(e) => {
                warn!("Failed to select {}: {}", selection.label, e.reason);
                result.warnings.push(Warning::CatalogWriteFailed {
                    layer: selection.label,
                    reason: e.reason,
                });
            }
        }
    }

    result
}
