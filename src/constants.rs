//! Application-wide constants.

/// The display name of the application.
pub const APP_NAME: &str = "Layer Shortcuts";

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "layer-shortcuts";

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "LayerShortcuts";
