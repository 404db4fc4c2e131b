//! Non-fatal conditions reported after a key press or a load.

use crate::config::LayerReference;
use std::fmt;

/// A problem that did not stop the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A reference matched no layer in the current technology
    LayerNotFound {
        /// Group the reference belongs to, when resolved as part of one
        group: Option<String>,
        /// The unresolved reference
        reference: LayerReference,
    },
    /// The host rejected a write to one layer
    CatalogWriteFailed {
        /// Label of the layer
        layer: String,
        /// Reason given by the host
        reason: String,
    },
    /// `restore` was requested but no focus snapshot exists
    NothingToRestore,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LayerNotFound {
                group: Some(group),
                reference,
            } => write!(f, "Layer not found: {reference} (group '{group}')"),
            Self::LayerNotFound {
                group: None,
                reference,
            } => write!(f, "Layer not found: {reference}"),
            Self::CatalogWriteFailed { layer, reason } => {
                write!(f, "Catalog write failed for {layer}: {reason}")
            }
            Self::NothingToRestore => write!(f, "Nothing to restore: no layer group is focused"),
        }
    }
}
