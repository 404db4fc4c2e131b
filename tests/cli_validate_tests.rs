//! End-to-end tests for `layer-shortcuts validate`.

use std::process::Command;

mod fixtures;
use fixtures::*;

/// Path to the layer-shortcuts binary
fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_layer-shortcuts")
}

#[test]
fn test_validate_sample_pdk() {
    let output = Command::new(bin())
        .args(["validate", sample_pdk_path().to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "Valid configuration should exit with code 0. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sg13g2"), "Output should name the technology");
}

#[test]
fn test_validate_json_output() {
    let (path, _temp_dir) = create_temp_file("demo.json", DEMO_CONFIG);

    let output = Command::new(bin())
        .args(["validate", path.to_str().unwrap(), "--json"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let result: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Should parse JSON output");
    assert_eq!(result["valid"], true);
    assert_eq!(result["technology"], "demo");
    assert_eq!(result["shortcuts"], 9);
    assert_eq!(result["errors"].as_array().unwrap().len(), 0);
}

#[test]
fn test_validate_reports_all_errors() {
    let raw = r#"{
        "technology": "",
        "layer_groups": {"m1": []},
        "shortcuts": {"1": [{"verb": "focus", "target": "m2"}]}
    }"#;
    let (path, _temp_dir) = create_temp_file("bad.json", raw);

    let output = Command::new(bin())
        .args(["validate", path.to_str().unwrap(), "--json"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(1),
        "Invalid configuration should exit with code 1"
    );
    let result: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Should parse JSON output");
    assert_eq!(result["valid"], false);
    let kinds: Vec<&str> = result["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["kind"].as_str().unwrap())
        .collect();
    assert_eq!(
        kinds,
        vec!["Missing Technology Name", "Empty Group", "Unknown Group Target"]
    );
    assert_eq!(result["errors"][2]["field"], "shortcuts.\"1\"[0].target");
}

#[test]
fn test_validate_reports_host_conflicts() {
    let (path, _temp_dir) = create_temp_file("demo.json", DEMO_CONFIG);

    let output = Command::new(bin())
        .args([
            "validate",
            path.to_str().unwrap(),
            "--json",
            "--reserved",
            "ctrl+m=Mirror",
            "--reserved",
            "F5",
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0), "Conflicts are not errors");
    let result: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Should parse JSON output");
    let conflicts = result["conflicts"].as_array().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0]["key"], "Ctrl+M");
    assert_eq!(conflicts[0]["host"], "Mirror");
}

#[test]
fn test_validate_missing_file() {
    let output = Command::new(bin())
        .args(["validate", "/nonexistent/config.json"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(2),
        "Nonexistent file should exit with code 2"
    );
}

#[cfg(target_os = "linux")]
#[test]
fn test_broken_settings_file_is_reported() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let settings_dir = temp_dir.path().join("LayerShortcuts");
    std::fs::create_dir_all(&settings_dir).unwrap();
    std::fs::write(settings_dir.join("settings.toml"), "logging = 5").unwrap();

    let output = Command::new(bin())
        .env("XDG_CONFIG_HOME", temp_dir.path())
        .args(["validate", sample_pdk_path().to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse settings file"), "{stderr}");
    assert!(stderr.contains("using log level 'info'"), "{stderr}");
}
