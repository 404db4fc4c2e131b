//! Per-view engine state and the keystroke entry point.
//!
//! Every layout view owns one [`EngineState`]: its technology, the active
//! configuration, a resolver cache, the focus state machine and the catalog
//! of the view's layers. [`Engine`] keeps these by [`ViewId`] and selects
//! configurations from a shared [`ConfigLibrary`].

use crate::catalog::LayerCatalog;
use crate::config::{ConfigLibrary, Configuration};
use crate::executor::{self, ExecutionResult};
use crate::resolver::LayerResolver;
use crate::shortcuts::{KeyBinding, KeyParseError};
use crate::state::{FocusState, ShortcutStateMachine};
use crate::warning::Warning;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Identifier of a layout view in the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view #{}", self.0)
    }
}

/// Errors returned by [`Engine::handle_key`] and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The view was never opened or has been closed
    UnknownView(ViewId),
    /// The view's technology has no valid configuration
    NoConfiguration {
        /// Technology of the view
        technology: String,
    },
    /// No shortcut is bound to the key
    UnboundKey(String),
    /// The key identifier could not be parsed
    InvalidKey(KeyParseError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownView(view) => write!(f, "Unknown {view}"),
            Self::NoConfiguration { technology } => {
                write!(f, "No layer shortcuts configured for technology '{technology}'")
            }
            Self::UnboundKey(key) => write!(f, "No layer shortcut bound to '{key}'"),
            Self::InvalidKey(e) => write!(f, "Invalid key: {e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidKey(e) => Some(e),
            _ => None,
        }
    }
}

impl From<KeyParseError> for EngineError {
    fn from(e: KeyParseError) -> Self {
        Self::InvalidKey(e)
    }
}

/// Outcome of activating a configuration for a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Technology of the view
    pub technology: String,
    /// Whether a configuration was found and activated
    pub active: bool,
    /// Number of active shortcuts
    pub shortcuts: usize,
    /// References the view's catalog cannot satisfy
    pub warnings: Vec<Warning>,
}

/// Everything the engine keeps for one view.
#[derive(Debug)]
pub struct EngineState<C> {
    technology: String,
    config: Option<Arc<Configuration>>,
    resolver: LayerResolver,
    machine: ShortcutStateMachine,
    catalog: C,
}

impl<C: LayerCatalog> EngineState<C> {
    /// Creates a state with no active configuration.
    pub fn new(technology: impl Into<String>, catalog: C) -> Self {
        Self {
            technology: technology.into(),
            config: None,
            resolver: LayerResolver::new(),
            machine: ShortcutStateMachine::new(),
            catalog,
        }
    }

    /// Technology of the view.
    #[must_use]
    pub fn technology(&self) -> &str {
        &self.technology
    }

    /// The active configuration.
    #[must_use]
    pub fn configuration(&self) -> Option<&Configuration> {
        self.config.as_deref()
    }

    /// Current focus state.
    #[must_use]
    pub const fn focus_state(&self) -> &FocusState {
        self.machine.state()
    }

    /// The view's catalog.
    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Mutable access to the view's catalog, e.g. to reload its layers.
    pub fn catalog_mut(&mut self) -> &mut C {
        &mut self.catalog
    }

    /// Cache statistics of the view's resolver.
    #[must_use]
    pub const fn resolver_stats(&self) -> (usize, usize) {
        self.resolver.cache_stats()
    }

    /// Swaps in a new configuration for a (possibly new) technology.
    ///
    /// Focus state and the resolver cache are reset. The returned report lists
    /// the references this view's layers cannot satisfy.
    pub fn set_configuration(
        &mut self,
        technology: impl Into<String>,
        config: Option<Arc<Configuration>>,
    ) -> LoadReport {
        self.technology = technology.into();
        self.config = config;
        self.machine.reset();
        self.resolver.invalidate();

        let Some(config) = self.config.as_deref() else {
            info!(
                "No layer shortcuts for technology '{}'; shortcuts inactive",
                self.technology
            );
            return LoadReport {
                technology: self.technology.clone(),
                active: false,
                shortcuts: 0,
                warnings: Vec::new(),
            };
        };

        let warnings = self.resolver.unresolved(config, &self.catalog);
        for warning in &warnings {
            debug!("{warning}");
        }
        info!(
            "Activated {} layer shortcut(s) for technology '{}' ({} unresolved reference(s))",
            config.shortcuts().len(),
            self.technology,
            warnings.len()
        );

        LoadReport {
            technology: self.technology.clone(),
            active: true,
            shortcuts: config.shortcuts().len(),
            warnings,
        }
    }

    /// Returns to `Idle` without touching any layer.
    pub fn reset(&mut self) {
        self.machine.reset();
    }

    /// Runs the shortcut bound to `binding`.
    pub fn press(&mut self, binding: &KeyBinding) -> Result<ExecutionResult, EngineError> {
        let config = self
            .config
            .clone()
            .ok_or_else(|| EngineError::NoConfiguration {
                technology: self.technology.clone(),
            })?;
        let shortcut = config
            .shortcut(binding)
            .ok_or_else(|| EngineError::UnboundKey(binding.to_string()))?;

        let plan = self
            .machine
            .plan(shortcut, &config, &mut self.resolver, &self.catalog);
        let result = executor::apply(plan, &mut self.catalog);

        info!("{} [{}]: {}", shortcut.title, shortcut.key, result.summary());
        Ok(result)
    }

    /// Warnings for every reference the current layers cannot satisfy.
    pub fn unresolved(&mut self) -> Vec<Warning> {
        match self.config.as_deref() {
            Some(config) => self.resolver.unresolved(config, &self.catalog),
            None => Vec::new(),
        }
    }
}

/// All open views and the configuration library they draw from.
#[derive(Debug)]
pub struct Engine<C> {
    library: ConfigLibrary,
    views: HashMap<ViewId, EngineState<C>>,
}

impl<C: LayerCatalog> Engine<C> {
    /// Creates an engine over an already loaded library.
    #[must_use]
    pub fn new(library: ConfigLibrary) -> Self {
        Self {
            library,
            views: HashMap::new(),
        }
    }

    /// The configuration library.
    #[must_use]
    pub const fn library(&self) -> &ConfigLibrary {
        &self.library
    }

    /// Registers a view, replacing any previous state under the same id.
    pub fn open_view(&mut self, view: ViewId, technology: &str, catalog: C) -> LoadReport {
        let mut state = EngineState::new(technology, catalog);
        let report = state.set_configuration(technology, self.library.get(technology));
        if self.views.insert(view, state).is_some() {
            debug!("Replaced engine state of {view}");
        }
        report
    }

    /// Forgets a view and hands its catalog back.
    pub fn close_view(&mut self, view: ViewId) -> Option<C> {
        self.views.remove(&view).map(|state| state.catalog)
    }

    /// Reselects the configuration after the view's technology changed.
    pub fn technology_changed(
        &mut self,
        view: ViewId,
        technology: &str,
    ) -> Result<LoadReport, EngineError> {
        let config = self.library.get(technology);
        let state = self.view_mut(view)?;
        info!(
            "Technology of {view} changed from '{}' to '{technology}'",
            state.technology()
        );
        Ok(state.set_configuration(technology, config))
    }

    /// Rescans the library's search path and reapplies it to every view.
    pub fn reload_library(&mut self) -> Vec<(ViewId, LoadReport)> {
        self.library.reload();
        self.refresh_views()
    }

    /// Swaps in another library and reapplies it to every view.
    pub fn replace_library(&mut self, library: ConfigLibrary) -> Vec<(ViewId, LoadReport)> {
        self.library = library;
        self.refresh_views()
    }

    fn refresh_views(&mut self) -> Vec<(ViewId, LoadReport)> {
        let mut reports: Vec<(ViewId, LoadReport)> = self
            .views
            .iter_mut()
            .map(|(&view, state)| {
                let technology = state.technology().to_string();
                let config = self.library.get(&technology);
                (view, state.set_configuration(technology, config))
            })
            .collect();
        reports.sort_by_key(|(view, _)| *view);
        reports
    }

    /// Handles a keystroke given as a key identifier such as `"1"` or `"Ctrl+M"`.
    pub fn handle_key(&mut self, view: ViewId, key: &str) -> Result<ExecutionResult, EngineError> {
        let binding = KeyBinding::parse(key)?;
        self.handle_key_binding(view, &binding)
    }

    /// Handles a keystroke delivered as a binding.
    pub fn handle_key_binding(
        &mut self,
        view: ViewId,
        binding: &KeyBinding,
    ) -> Result<ExecutionResult, EngineError> {
        let result = self.view_mut(view)?.press(binding);
        if let Err(e) = &result {
            match e {
                EngineError::UnboundKey(_) => debug!("{view}: {e}"),
                _ => warn!("{view}: {e}"),
            }
        }
        result
    }

    /// State of one view.
    pub fn view(&self, view: ViewId) -> Result<&EngineState<C>, EngineError> {
        self.views.get(&view).ok_or(EngineError::UnknownView(view))
    }

    /// Mutable state of one view.
    pub fn view_mut(&mut self, view: ViewId) -> Result<&mut EngineState<C>, EngineError> {
        self.views
            .get_mut(&view)
            .ok_or(EngineError::UnknownView(view))
    }

    /// Ids of all open views, sorted.
    #[must_use]
    pub fn views(&self) -> Vec<ViewId> {
        let mut views: Vec<ViewId> = self.views.keys().copied().collect();
        views.sort();
        views
    }
}
