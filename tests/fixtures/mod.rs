//! Shared test fixtures for engine and CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use layer_shortcuts::catalog::{LayerSpec, MemoryCatalog};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// One group, one focus shortcut, three layers.
pub const SCENARIO_CONFIG: &str = r#"{
    "technology": "scenario",
    "layer_groups": {
        "metal1": [
            {"name": "Metal1", "purpose": "drawing"},
            {"name": "Metal1", "purpose": "pin"}
        ]
    },
    "shortcuts": {
        "1": [{"verb": "focus", "target": "metal1"}]
    }
}"#;

/// Exercises every verb; `ghost` references a layer no catalog has.
pub const DEMO_CONFIG: &str = r#"{
    "technology": "demo",
    "layer_groups": {
        "metal1": [
            {"name": "Metal1", "purpose": "drawing"},
            {"name": "Metal1", "purpose": "pin"}
        ],
        "metal2": ["Metal2.drawing", "Via1.drawing"],
        "ghost": ["Metal9.drawing"]
    },
    "shortcuts": {
        "1": [{"verb": "focus", "target": "metal1"}],
        "2": [{"verb": "focus", "target": "metal2"}],
        "0": {"title": "Show default layers", "actions": [{"verb": "restore"}]},
        ",": [{"verb": "hide", "target": "all"}],
        "a": [{"verb": "show", "target": "all"}],
        "s": [{"verb": "show", "target": "metal1"}],
        "h": [{"verb": "hide", "target": "metal1"}],
        "g": [{"verb": "show", "target": "ghost"}],
        "Ctrl+M": [{"verb": "select", "target": "metal2"}]
    }
}"#;

/// Layers for [`SCENARIO_CONFIG`].
pub fn scenario_catalog() -> MemoryCatalog {
    MemoryCatalog::new(vec![
        LayerSpec::new("Metal1", Some("drawing")).with_visible(false),
        LayerSpec::new("Metal1", Some("pin")).with_visible(false),
        LayerSpec::new("Metal2", Some("drawing")),
    ])
}

/// Layer specs for [`DEMO_CONFIG`].
pub fn demo_specs() -> Vec<LayerSpec> {
    vec![
        LayerSpec::new("Metal1", Some("drawing"))
            .with_numbers(8, 0)
            .with_visible(false),
        LayerSpec::new("Metal1", Some("pin"))
            .with_numbers(8, 2)
            .with_visible(false),
        LayerSpec::new("Metal2", Some("drawing")).with_numbers(10, 0),
        LayerSpec::new("Via1", Some("drawing")).with_numbers(19, 0),
        LayerSpec::new("Cont", Some("drawing")).with_numbers(6, 0),
    ]
}

/// Layers for [`DEMO_CONFIG`].
pub fn demo_catalog() -> MemoryCatalog {
    MemoryCatalog::new(demo_specs())
}

/// A reduced sg13g2 layer stack: drawing and pin purposes only.
pub fn sg13g2_specs() -> Vec<LayerSpec> {
    let mut specs = Vec::new();
    for name in [
        "Metal1", "Metal2", "Metal3", "Metal4", "Metal5", "TopMetal1", "TopMetal2",
    ] {
        specs.push(LayerSpec::new(name, Some("drawing")));
        specs.push(LayerSpec::new(name, Some("pin")));
    }
    for name in [
        "Via1", "Via2", "Via3", "Via4", "TopVia1", "TopVia2", "Cont", "GatPoly", "Activ",
    ] {
        specs.push(LayerSpec::new(name, Some("drawing")));
    }
    specs
}

/// The bundled sg13g2 configuration.
pub fn sample_pdk_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("pdks")
        .join("sg13g2.json")
}

/// Writes `content` to `name` inside a fresh temp dir.
pub fn create_temp_file(name: &str, content: &str) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join(name);
    fs::write(&path, content).expect("Failed to write temp file");
    (path, temp_dir)
}

/// Writes a layer list for the simulate command.
pub fn write_catalog_file(dir: &Path, specs: &[LayerSpec]) -> PathBuf {
    let path = dir.join("layers.json");
    let json = serde_json::to_string_pretty(specs).expect("Failed to serialize layer list");
    fs::write(&path, json).expect("Failed to write layer list");
    path
}

/// Visibility flags in catalog order.
pub fn flags(catalog: &MemoryCatalog) -> Vec<bool> {
    catalog.visibility().into_iter().map(|(_, v)| v).collect()
}
