//! Validated configuration data structures.
//!
//! Values in this module only exist after a configuration passed validation,
//! so lookups on them never fail for structural reasons.

use crate::shortcuts::KeyBinding;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Special target restoring the visibility remembered before the first focus.
pub const TARGET_DEFAULTS: &str = "defaults";

/// Special target addressing every layer in the catalog.
pub const TARGET_ALL: &str = "all";

/// A logical identifier for one or more physical layers.
///
/// # Matching
///
/// - `Named` matches catalog entries whose name is equal (case-sensitive).
///   When `purposes` is non-empty, the entry's purpose must also match one of
///   them (see [`crate::resolver::purpose_matches`]).
/// - `Numbered` matches entries with the same layer and datatype numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LayerReference {
    /// Layer name with optional purpose qualifiers
    Named {
        /// Layer name, e.g. "Metal1"
        name: String,
        /// Purpose qualifiers, e.g. ["drawing", "pin"]; empty means any purpose
        purposes: Vec<String>,
    },
    /// Explicit GDS layer/datatype pair
    Numbered {
        /// GDS layer number
        layer: u32,
        /// GDS datatype number
        datatype: u32,
    },
}

impl LayerReference {
    /// Creates a named reference with the given purposes.
    pub fn named<I, S>(name: impl Into<String>, purposes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Named {
            name: name.into(),
            purposes: purposes.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a reference for an explicit layer/datatype pair.
    #[must_use]
    pub const fn numbered(layer: u32, datatype: u32) -> Self {
        Self::Numbered { layer, datatype }
    }

    /// Parses the `"Name.purpose"` shorthand.
    ///
    /// The string is split at the last `.`; without a `.` the whole string is
    /// the layer name and no purpose is required.
    ///
    /// # Examples
    /// ```
    /// use layer_shortcuts::config::LayerReference;
    ///
    /// assert_eq!(
    ///     LayerReference::parse_shorthand("Metal1.pin"),
    ///     LayerReference::named("Metal1", ["pin"])
    /// );
    /// assert_eq!(
    ///     LayerReference::parse_shorthand("Cont"),
    ///     LayerReference::named("Cont", Vec::<String>::new())
    /// );
    /// ```
    #[must_use]
    pub fn parse_shorthand(s: &str) -> Self {
        match s.rsplit_once('.') {
            Some((name, purpose)) => Self::named(name, [purpose]),
            None => Self::named(s, Vec::<String>::new()),
        }
    }
}

impl fmt::Display for LayerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { name, purposes } => match purposes.as_slice() {
                [] => write!(f, "{name}"),
                [purpose] => write!(f, "{name}.{purpose}"),
                many => write!(f, "{name}.{{{}}}", many.join(",")),
            },
            Self::Numbered { layer, datatype } => write!(f, "{layer}/{datatype}"),
        }
    }
}

/// A named, ordered set of layer references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerGroup {
    /// Group name, unique within one configuration
    pub name: String,
    /// References in declaration order
    pub references: Vec<LayerReference>,
}

/// Action verbs understood by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    /// Make the target layers visible
    Show,
    /// Make the target layers invisible
    Hide,
    /// Isolate a group, remembering the previous visibility
    Focus,
    /// Return to the visibility remembered by the first focus
    Restore,
    /// Make the first layer of a group the host's current layer
    Select,
}

impl Verb {
    /// Whether this verb needs a layer group as its target.
    #[must_use]
    pub const fn requires_group(self) -> bool {
        matches!(self, Self::Focus | Self::Select)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Show => write!(f, "show"),
            Self::Hide => write!(f, "hide"),
            Self::Focus => write!(f, "focus"),
            Self::Restore => write!(f, "restore"),
            Self::Select => write!(f, "select"),
        }
    }
}

/// Target of an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// A declared layer group
    Group(String),
    /// The special `"defaults"` token
    Defaults,
    /// The special `"all"` token
    All,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(name) => write!(f, "{name}"),
            Self::Defaults => write!(f, "{TARGET_DEFAULTS}"),
            Self::All => write!(f, "{TARGET_ALL}"),
        }
    }
}

/// A verb applied to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// What to do
    pub verb: Verb,
    /// What to do it to
    pub target: Target,
}

impl Action {
    /// Creates a new action.
    #[must_use]
    pub const fn new(verb: Verb, target: Target) -> Self {
        Self { verb, target }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.target)
    }
}

/// A key bound to an ordered list of actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutBinding {
    /// Key identifier as written in the configuration file
    pub key: String,
    /// Normalized binding used for lookups
    pub binding: KeyBinding,
    /// Menu title
    pub title: String,
    /// Actions, executed in order on each press
    pub actions: Vec<Action>,
}

/// A key already bound by the host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostBinding {
    /// Title of the host action
    pub title: String,
    /// Key identifier as reported by the host
    pub key: String,
}

/// A configured shortcut whose key the host already uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutConflict {
    /// Configured key identifier
    pub key: String,
    /// Title of the configured shortcut
    pub shortcut_title: String,
    /// Title of the host action bound to the same key
    pub host_title: String,
}

/// A validated, technology-specific shortcut configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub(crate) technology: String,
    pub(crate) groups: Vec<LayerGroup>,
    pub(crate) shortcuts: Vec<ShortcutBinding>,
}

impl Configuration {
    /// Parses and validates a configuration from JSON text.
    pub fn load(raw: &str) -> Result<Self, super::ConfigError> {
        super::load(raw)
    }

    /// Technology identifier this configuration applies to.
    #[must_use]
    pub fn technology(&self) -> &str {
        &self.technology
    }

    /// Layer groups in declaration order.
    #[must_use]
    pub fn groups(&self) -> &[LayerGroup] {
        &self.groups
    }

    /// Looks up a group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&LayerGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Shortcut bindings in declaration order.
    #[must_use]
    pub fn shortcuts(&self) -> &[ShortcutBinding] {
        &self.shortcuts
    }

    /// Looks up the shortcut bound to a key.
    #[must_use]
    pub fn shortcut(&self, binding: &KeyBinding) -> Option<&ShortcutBinding> {
        self.shortcuts.iter().find(|s| &s.binding == binding)
    }

    /// Reports configured keys that the host application already binds.
    ///
    /// Host keys that cannot be parsed are ignored; they cannot collide with a
    /// configured key, which always parses.
    #[must_use]
    pub fn conflicts(&self, host_bindings: &[HostBinding]) -> Vec<ShortcutConflict> {
        let mut conflicts = Vec::new();
        for host in host_bindings {
            let Ok(host_binding) = KeyBinding::parse(&host.key) else {
                continue;
            };
            if let Some(shortcut) = self.shortcut(&host_binding) {
                conflicts.push(ShortcutConflict {
                    key: shortcut.key.clone(),
                    shortcut_title: shortcut.title.clone(),
                    host_title: host.title.clone(),
                });
            }
        }
        conflicts
    }
}
