//! CLI command handlers for layer shortcuts.
//!
//! These commands give headless, scriptable access to configuration
//! validation and to the visibility engine, for PDK maintainers and CI.

pub mod common;
pub mod list;
pub mod simulate;
pub mod validate;

pub use common::{CliError, CliResult, ExitCode};
pub use list::ListArgs;
pub use simulate::SimulateArgs;
pub use validate::ValidateArgs;
