//! Layer shortcut configuration.
//!
//! A configuration file is JSON, one per technology:
//!
//! ```json
//! {
//!     "technology": "sg13g2",
//!     "layer_groups": {
//!         "metal1": [{"name": "Metal1", "purpose": "drawing"}, "Metal1.pin"]
//!     },
//!     "shortcuts": {
//!         "1": [{"verb": "focus", "target": "metal1"}],
//!         "0": {"title": "Show default layers", "actions": [{"verb": "restore"}]}
//!     }
//! }
//! ```
//!
//! [`load`] validates everything eagerly; [`ConfigLibrary`] discovers files on
//! disk and selects one by technology.

pub mod library;
pub mod model;
mod raw;
pub mod validator;

pub use library::{ConfigLibrary, LibraryEntry, LoadFailure};
pub use model::{
    Action, Configuration, HostBinding, LayerGroup, LayerReference, ShortcutBinding,
    ShortcutConflict, Target, Verb, TARGET_ALL, TARGET_DEFAULTS,
};
pub use validator::{load, validate, ConfigError, ConfigErrorKind};

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Reads and validates a configuration file.
pub fn load_file(path: &Path) -> Result<Configuration> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

    load(&content)
        .with_context(|| format!("Invalid configuration file: {}", path.display()))
}
