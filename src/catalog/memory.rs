//! In-memory layer catalog.
//!
//! Used by tests and by the `simulate` command. A layer list can be loaded
//! from JSON, either a bare array of [`LayerSpec`]s or `{"layers": [...]}`.

use super::{CatalogLayer, CatalogWriteError, LayerCatalog, LayerHandle};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Description of one layer for building a [`MemoryCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Layer name
    pub name: String,
    /// Purpose
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    /// GDS layer number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<u32>,
    /// GDS datatype number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<u32>,
    /// Host-side group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Initial visibility (default: visible)
    #[serde(default = "default_visible")]
    pub visible: bool,
}

const fn default_visible() -> bool {
    true
}

impl LayerSpec {
    /// A visible layer with the given name and purpose.
    pub fn new(name: impl Into<String>, purpose: Option<&str>) -> Self {
        Self {
            name: name.into(),
            purpose: purpose.map(str::to_string),
            layer: None,
            datatype: None,
            group: None,
            visible: true,
        }
    }

    /// Sets the GDS layer/datatype pair.
    #[must_use]
    pub const fn with_numbers(mut self, layer: u32, datatype: u32) -> Self {
        self.layer = Some(layer);
        self.datatype = Some(datatype);
        self
    }

    /// Sets the initial visibility.
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets the host-side group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LayerFile {
    List(Vec<LayerSpec>),
    Object { layers: Vec<LayerSpec> },
}

/// A layer catalog held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    layers: Vec<CatalogLayer>,
    generation: u64,
    next_handle: usize,
    locked: HashSet<LayerHandle>,
    layer_queries: Cell<usize>,
}

impl MemoryCatalog {
    /// Creates a catalog at generation 0.
    #[must_use]
    pub fn new(specs: Vec<LayerSpec>) -> Self {
        let mut catalog = Self::default();
        catalog.layers = catalog.build(specs);
        catalog
    }

    /// Parses a catalog from JSON text.
    pub fn from_json(raw: &str) -> Result<Self> {
        let file: LayerFile =
            serde_json::from_str(raw).context("Failed to parse layer list JSON")?;
        let specs = match file {
            LayerFile::List(specs) | LayerFile::Object { layers: specs } => specs,
        };
        Ok(Self::new(specs))
    }

    /// Loads a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read layer list: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid layer list: {}", path.display()))
    }

    fn build(&mut self, specs: Vec<LayerSpec>) -> Vec<CatalogLayer> {
        specs
            .into_iter()
            .map(|spec| {
                let handle = LayerHandle(self.next_handle);
                self.next_handle += 1;
                CatalogLayer {
                    handle,
                    name: spec.name,
                    layer_number: spec.layer,
                    datatype: spec.datatype,
                    purpose: spec.purpose,
                    group: spec.group,
                    visible: spec.visible,
                    selected: false,
                }
            })
            .collect()
    }

    /// Replaces the whole layer set, as a technology reload would.
    ///
    /// New handles are issued and the generation counter advances, so handles
    /// from before the replacement no longer address any layer.
    pub fn replace(&mut self, specs: Vec<LayerSpec>) {
        self.layers = self.build(specs);
        self.locked.clear();
        self.generation += 1;
    }

    /// Makes the host reject writes to a layer.
    pub fn lock(&mut self, handle: LayerHandle) {
        self.locked.insert(handle);
    }

    /// Finds a layer by name and purpose.
    #[must_use]
    pub fn find(&self, name: &str, purpose: Option<&str>) -> Option<&CatalogLayer> {
        self.layers
            .iter()
            .find(|l| l.name == name && l.purpose.as_deref() == purpose)
    }

    /// Visibility of a layer by name and purpose.
    #[must_use]
    pub fn is_visible(&self, name: &str, purpose: Option<&str>) -> Option<bool> {
        self.find(name, purpose).map(|l| l.visible)
    }

    /// The current layer, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&CatalogLayer> {
        self.layers.iter().find(|l| l.selected)
    }

    /// `(label, visible)` for every layer, in order.
    #[must_use]
    pub fn visibility(&self) -> Vec<(String, bool)> {
        self.layers.iter().map(|l| (l.label(), l.visible)).collect()
    }

    /// How many times [`LayerCatalog::layers`] has been called.
    #[must_use]
    pub fn layer_queries(&self) -> usize {
        self.layer_queries.get()
    }

    fn position(&self, handle: LayerHandle) -> Result<usize, CatalogWriteError> {
        if self.locked.contains(&handle) {
            return Err(CatalogWriteError::new(handle, "layer is locked"));
        }
        self.layers
            .iter()
            .position(|l| l.handle == handle)
            .ok_or_else(|| CatalogWriteError::new(handle, "no such layer"))
    }
}

impl LayerCatalog for MemoryCatalog {
    fn generation(&self) -> u64 {
        self.generation
    }

    fn layers(&self) -> Vec<CatalogLayer> {
        self.layer_queries.set(self.layer_queries.get() + 1);
        self.layers.clone()
    }

    fn set_visibility(
        &mut self,
        handle: LayerHandle,
        visible: bool,
    ) -> Result<(), CatalogWriteError> {
        let idx = self.position(handle)?;
        self.layers[idx].visible = visible;
        Ok(())
    }

    fn set_selected(&mut self, handle: LayerHandle) -> Result<(), CatalogWriteError> {
        let idx = self.position(handle)?;
        for layer in &mut self.layers {
            layer.selected = false;
        }
        self.layers[idx].selected = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryCatalog {
        MemoryCatalog::new(vec![
            LayerSpec::new("Metal1", Some("drawing")).with_numbers(8, 0),
            LayerSpec::new("Metal1", Some("pin")).with_visible(false),
        ])
    }

    #[test]
    fn test_from_json_accepts_both_forms() {
        let list = r#"[{"name": "Metal1", "purpose": "drawing", "layer": 8, "datatype": 0}]"#;
        let object = r#"{"layers": [{"name": "Metal1", "visible": false}]}"#;

        let a = MemoryCatalog::from_json(list).unwrap();
        assert_eq!(a.is_visible("Metal1", Some("drawing")), Some(true));

        let b = MemoryCatalog::from_json(object).unwrap();
        assert_eq!(b.is_visible("Metal1", None), Some(false));

        assert!(MemoryCatalog::from_json("{").is_err());
    }

    #[test]
    fn test_set_visibility_and_selection() {
        let mut catalog = sample();
        let pin = catalog.find("Metal1", Some("pin")).unwrap().handle;

        catalog.set_visibility(pin, true).unwrap();
        assert_eq!(catalog.is_visible("Metal1", Some("pin")), Some(true));

        catalog.set_selected(pin).unwrap();
        assert_eq!(catalog.selected().unwrap().handle, pin);
    }

    #[test]
    fn test_locked_layer_rejects_writes() {
        let mut catalog = sample();
        let drawing = catalog.find("Metal1", Some("drawing")).unwrap().handle;
        catalog.lock(drawing);

        let err = catalog.set_visibility(drawing, false).unwrap_err();
        assert_eq!(err.handle, drawing);
        assert_eq!(catalog.is_visible("Metal1", Some("drawing")), Some(true));
    }

    #[test]
    fn test_replace_bumps_generation_and_invalidates_handles() {
        let mut catalog = sample();
        let old = catalog.find("Metal1", Some("drawing")).unwrap().handle;
        assert_eq!(catalog.generation(), 0);

        catalog.replace(vec![LayerSpec::new("Metal1", Some("drawing"))]);

        assert_eq!(catalog.generation(), 1);
        assert!(catalog.set_visibility(old, false).is_err());
        assert_ne!(catalog.find("Metal1", Some("drawing")).unwrap().handle, old);
    }

    #[test]
    fn test_layer_queries_are_counted() {
        let catalog = sample();
        assert_eq!(catalog.layer_queries(), 0);
        let _ = catalog.layers();
        let _ = catalog.layers();
        assert_eq!(catalog.layer_queries(), 2);
    }
}
