//! Per-view focus state and visibility planning.
//!
//! # States
//!
//! - `Idle`: no group is isolated.
//! - `Focused(group)`: one group is isolated and the visibility from before
//!   the first focus is kept in a snapshot.
//!
//! Pressing the focused group's shortcut again, or `restore`, puts the
//! snapshot back verbatim. Focusing another group while focused keeps the
//! original snapshot, so a restore always returns to the pre-focus baseline.
//!
//! Planning does not write anything. The actions of one binding run in order
//! against a working copy of the flags and produce a [`VisibilityPlan`] that
//! the executor applies.

use crate::catalog::{CatalogLayer, LayerCatalog, LayerHandle, LayerIdentity};
use crate::config::{Configuration, ShortcutBinding, Target, Verb};
use crate::resolver::LayerResolver;
use crate::warning::Warning;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Focus state of one view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FocusState {
    /// No group is isolated
    #[default]
    Idle,
    /// The named group is isolated
    Focused(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SnapshotEntry {
    handle: LayerHandle,
    identity: LayerIdentity,
    visible: bool,
}

/// Visibility of every layer at the moment of the first focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilitySnapshot {
    generation: u64,
    entries: Vec<SnapshotEntry>,
}

impl VisibilitySnapshot {
    /// Catalog generation the snapshot was taken in.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of layers remembered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot remembers no layer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remembered flag of a layer, by handle.
    #[must_use]
    pub fn visible(&self, handle: LayerHandle) -> Option<bool> {
        self.entries
            .iter()
            .find(|e| e.handle == handle)
            .map(|e| e.visible)
    }
}

/// One planned visibility write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWrite {
    /// Target layer
    pub handle: LayerHandle,
    /// Label for logging
    pub label: String,
    /// Flag to write
    pub visible: bool,
}

/// A planned change of the host's current layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSelection {
    /// Layer to select
    pub handle: LayerHandle,
    /// Label for logging
    pub label: String,
}

/// Everything one key press will change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityPlan {
    /// Writes in application order; only layers whose flag changes
    pub writes: Vec<PlannedWrite>,
    /// New current layer, if a `select` action found one
    pub selection: Option<PlannedSelection>,
    /// Warnings collected while planning
    pub warnings: Vec<Warning>,
}

/// Working copy of the flags while a binding's actions run.
struct WorkingSet<'a> {
    layers: &'a [CatalogLayer],
    index: HashMap<LayerHandle, usize>,
    desired: Vec<bool>,
    /// Last-touch stamp per layer; writes are ordered by it
    touched: Vec<Option<usize>>,
    clock: usize,
}

impl<'a> WorkingSet<'a> {
    fn new(layers: &'a [CatalogLayer]) -> Self {
        Self {
            layers,
            index: layers
                .iter()
                .enumerate()
                .map(|(i, l)| (l.handle, i))
                .collect(),
            desired: layers.iter().map(|l| l.visible).collect(),
            touched: vec![None; layers.len()],
            clock: 0,
        }
    }

    fn set(&mut self, idx: usize, visible: bool) {
        self.desired[idx] = visible;
        self.touched[idx] = Some(self.clock);
        self.clock += 1;
    }

    fn set_handle(&mut self, handle: LayerHandle, visible: bool) {
        if let Some(&idx) = self.index.get(&handle) {
            self.set(idx, visible);
        }
    }

    fn set_all(&mut self, visible: bool) {
        for idx in 0..self.layers.len() {
            self.set(idx, visible);
        }
    }

    fn into_writes(self) -> Vec<PlannedWrite> {
        let mut order: Vec<(usize, usize)> = self
            .touched
            .iter()
            .enumerate()
            .filter_map(|(idx, stamp)| stamp.map(|s| (s, idx)))
            .collect();
        order.sort_unstable();

        order
            .into_iter()
            .map(|(_, idx)| idx)
            .filter(|&idx| self.desired[idx] != self.layers[idx].visible)
            .map(|idx| PlannedWrite {
                handle: self.layers[idx].handle,
                label: self.layers[idx].label(),
                visible: self.desired[idx],
            })
            .collect()
    }
}

/// Focus state and snapshot of one view.
#[derive(Debug, Clone, Default)]
pub struct ShortcutStateMachine {
    state: FocusState,
    snapshot: Option<VisibilitySnapshot>,
}

impl ShortcutStateMachine {
    /// Creates an idle state machine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current focus state.
    #[must_use]
    pub const fn state(&self) -> &FocusState {
        &self.state
    }

    /// The pre-focus snapshot, present exactly while focused.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&VisibilitySnapshot> {
        self.snapshot.as_ref()
    }

    /// Returns to `Idle` and discards the snapshot.
    pub fn reset(&mut self) {
        self.state = FocusState::Idle;
        self.snapshot = None;
    }

    /// Computes the visibility changes for one press of `shortcut`.
    ///
    /// Transitions the focus state as a side effect; the catalog is only read.
    pub fn plan<C>(
        &mut self,
        shortcut: &ShortcutBinding,
        config: &Configuration,
        resolver: &mut LayerResolver,
        catalog: &C,
    ) -> VisibilityPlan
    where
        C: LayerCatalog + ?Sized,
    {
        let generation = catalog.generation();
        let layers = catalog.layers();
        let mut working = WorkingSet::new(&layers);
        let mut plan = VisibilityPlan::default();

        for action in &shortcut.actions {
            match (action.verb, &action.target) {
                (Verb::Show | Verb::Hide, Target::Group(name)) => {
                    let Some(group) = config.group(name) else {
                        continue;
                    };
                    let resolution = resolver.resolve_group(group, catalog);
                    plan.warnings.extend(resolution.warnings);
                    for handle in resolution.handles {
                        working.set_handle(handle, action.verb == Verb::Show);
                    }
                }
                (Verb::Show, Target::All) => working.set_all(true),
                (Verb::Hide, Target::All | Target::Defaults) => working.set_all(false),
                (Verb::Show | Verb::Restore, Target::Defaults) => {
                    self.restore(&mut working, generation, &mut plan.warnings);
                }
                (Verb::Focus, Target::Group(name)) => {
                    if self.state == FocusState::Focused(name.clone()) {
                        self.restore(&mut working, generation, &mut plan.warnings);
                        continue;
                    }
                    let Some(group) = config.group(name) else {
                        continue;
                    };

                    if self.state == FocusState::Idle {
                        self.snapshot = Some(VisibilitySnapshot {
                            generation,
                            entries: layers
                                .iter()
                                .zip(&working.desired)
                                .map(|(layer, &visible)| SnapshotEntry {
                                    handle: layer.handle,
                                    identity: layer.identity(),
                                    visible,
                                })
                                .collect(),
                        });
                    }

                    let resolution = resolver.resolve_group(group, catalog);
                    plan.warnings.extend(resolution.warnings);
                    working.set_all(false);
                    for handle in resolution.handles {
                        working.set_handle(handle, true);
                    }

                    debug!("Focus {:?} -> {name}", self.state);
                    self.state = FocusState::Focused(name.clone());
                }
                (Verb::Select, Target::Group(name)) => {
                    let Some(group) = config.group(name) else {
                        continue;
                    };
                    let resolution = resolver.resolve_group(group, catalog);
                    plan.warnings.extend(resolution.warnings);
                    plan.selection = resolution.handles.first().and_then(|&handle| {
                        working.index.get(&handle).map(|&idx| PlannedSelection {
                            handle,
                            label: layers[idx].label(),
                        })
                    });
                }
                // Rejected by validation
                (Verb::Focus | Verb::Select, Target::All | Target::Defaults)
                | (Verb::Restore, Target::All | Target::Group(_)) => {}
            }
        }

        plan.writes = working.into_writes();
        plan
    }

    /// Puts the snapshot back into the working set and returns to `Idle`.
    fn restore(&mut self, working: &mut WorkingSet<'_>, generation: u64, warnings: &mut Vec<Warning>) {
        let Some(snapshot) = self.snapshot.take() else {
            debug!("Restore requested without a snapshot");
            warnings.push(Warning::NothingToRestore);
            return;
        };

        if snapshot.generation == generation {
            for entry in &snapshot.entries {
                working.set_handle(entry.handle, entry.visible);
            }
        } else {
            // Handles are stale after a reload; map by identity instead.
            // Layers sharing an identity pair up in catalog order.
            let mut by_identity: HashMap<&LayerIdentity, VecDeque<bool>> = HashMap::new();
            for entry in &snapshot.entries {
                by_identity
                    .entry(&entry.identity)
                    .or_default()
                    .push_back(entry.visible);
            }
            for idx in 0..working.layers.len() {
                let identity = working.layers[idx].identity();
                if let Some(visible) = by_identity
                    .get_mut(&identity)
                    .and_then(VecDeque::pop_front)
                {
                    working.set(idx, visible);
                }
            }
        }

        self.state = FocusState::Idle;
    }
}
