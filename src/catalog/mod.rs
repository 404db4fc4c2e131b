//! The narrow interface to the host's live layer list.
//!
//! The engine never creates, deletes or renames layers. It reads the list,
//! watches the generation counter, and toggles visibility and selection.

pub mod memory;

pub use memory::{LayerSpec, MemoryCatalog};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque host-side handle of one layer.
///
/// Handles are only meaningful for the catalog generation they were read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerHandle(pub usize);

/// One entry of the host's layer list with its display flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogLayer {
    /// Host handle
    pub handle: LayerHandle,
    /// Layer name, e.g. "Metal1"
    pub name: String,
    /// GDS layer number, if known
    pub layer_number: Option<u32>,
    /// GDS datatype number, if known
    pub datatype: Option<u32>,
    /// Purpose, e.g. "drawing"; `None` for unqualified layers
    pub purpose: Option<String>,
    /// Host-side group (layer properties folder) the layer belongs to
    pub group: Option<String>,
    /// Whether the layer is currently drawn
    pub visible: bool,
    /// Whether the layer is the host's current layer
    pub selected: bool,
}

impl CatalogLayer {
    /// Identity of the layer independent of its handle.
    #[must_use]
    pub fn identity(&self) -> LayerIdentity {
        LayerIdentity {
            name: self.name.clone(),
            purpose: self.purpose.clone(),
            layer_number: self.layer_number,
            datatype: self.datatype,
        }
    }

    /// Display label, e.g. `Metal1.drawing (8/0)`.
    #[must_use]
    pub fn label(&self) -> String {
        let mut label = match &self.purpose {
            Some(purpose) => format!("{}.{}", self.name, purpose),
            None => self.name.clone(),
        };
        if let (Some(layer), Some(datatype)) = (self.layer_number, self.datatype) {
            label.push_str(&format!(" ({layer}/{datatype})"));
        }
        label
    }
}

/// What identifies a layer across catalog reloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayerIdentity {
    /// Layer name
    pub name: String,
    /// Purpose
    pub purpose: Option<String>,
    /// GDS layer number
    pub layer_number: Option<u32>,
    /// GDS datatype number
    pub datatype: Option<u32>,
}

/// The host rejected a mutation of one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogWriteError {
    /// Layer the write was addressed to
    pub handle: LayerHandle,
    /// Reason given by the host
    pub reason: String,
}

impl CatalogWriteError {
    /// Creates a new write error.
    pub fn new(handle: LayerHandle, reason: impl Into<String>) -> Self {
        Self {
            handle,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CatalogWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "write to layer #{} rejected: {}", self.handle.0, self.reason)
    }
}

impl std::error::Error for CatalogWriteError {}

/// Read/write access to the host's layer list for one view.
pub trait LayerCatalog {
    /// Counter that increases whenever the layer set is reloaded.
    fn generation(&self) -> u64;

    /// Current layers in host order.
    fn layers(&self) -> Vec<CatalogLayer>;

    /// Sets the visibility flag of one layer.
    fn set_visibility(&mut self, handle: LayerHandle, visible: bool)
        -> Result<(), CatalogWriteError>;

    /// Makes one layer the host's current layer.
    fn set_selected(&mut self, handle: LayerHandle) -> Result<(), CatalogWriteError>;
}
