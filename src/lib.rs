//! Layer Shortcuts Library
//!
//! Single-key layer visibility shortcuts for chip layout viewers. A
//! technology-specific JSON configuration maps keys to actions on named layer
//! groups; the engine resolves those groups against the viewer's live layer
//! list and applies show, hide, focus and restore transitions.
//!
//! The host viewer is reached only through [`catalog::LayerCatalog`].

// Module declarations
pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod engine;
pub mod executor;
pub mod resolver;
pub mod settings;
pub mod shortcuts;
pub mod state;
pub mod warning;

pub use catalog::{CatalogLayer, LayerCatalog, LayerHandle, MemoryCatalog};
pub use config::{ConfigError, ConfigErrorKind, ConfigLibrary, Configuration};
pub use engine::{Engine, EngineError, EngineState, LoadReport, ViewId};
pub use executor::ExecutionResult;
pub use state::FocusState;
pub use warning::Warning;
