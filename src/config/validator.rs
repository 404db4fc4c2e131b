//! Configuration validation.
//!
//! All checks run eagerly at load time. A configuration either passes every
//! check and becomes a [`Configuration`], or is rejected as a whole.

use super::model::{
    Action, Configuration, LayerGroup, LayerReference, ShortcutBinding, Target, Verb,
    TARGET_ALL, TARGET_DEFAULTS,
};
use super::raw::{RawAction, RawConfiguration, RawLayerReference, RawShortcut};
use crate::shortcuts::KeyBinding;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Types of configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigErrorKind {
    /// JSON does not have the expected shape
    MalformedStructure,
    /// Two shortcuts resolve to the same key binding
    DuplicateShortcut,
    /// An action names a group that is not declared
    UnknownGroupTarget,
    /// A layer group has no references
    EmptyGroup,
    /// The technology field is missing or blank
    MissingTechnologyName,
    /// A group name is declared twice
    DuplicateGroup,
    /// A named layer reference has an empty name
    EmptyLayerName,
    /// A special target is used with a verb that needs a group
    UnsupportedTarget,
}

impl fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedStructure => write!(f, "Malformed Structure"),
            Self::DuplicateShortcut => write!(f, "Duplicate Shortcut"),
            Self::UnknownGroupTarget => write!(f, "Unknown Group Target"),
            Self::EmptyGroup => write!(f, "Empty Group"),
            Self::MissingTechnologyName => write!(f, "Missing Technology Name"),
            Self::DuplicateGroup => write!(f, "Duplicate Group"),
            Self::EmptyLayerName => write!(f, "Empty Layer Name"),
            Self::UnsupportedTarget => write!(f, "Unsupported Target"),
        }
    }
}

/// Configuration error with the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Type of error
    pub kind: ConfigErrorKind,
    /// Path of the offending field, e.g. `shortcuts."1"[0].target`
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl ConfigError {
    /// Creates a new configuration error.
    pub fn new(
        kind: ConfigErrorKind,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Parses and validates a configuration, failing with the first error.
pub fn load(raw: &str) -> Result<Configuration, ConfigError> {
    let (config, mut errors) = Validator::run(raw);
    match config {
        Some(config) if errors.is_empty() => Ok(config),
        _ => Err(errors.remove(0)),
    }
}

/// Validates a configuration and returns every error found.
///
/// An empty result means [`load`] succeeds on the same input.
#[must_use]
pub fn validate(raw: &str) -> Vec<ConfigError> {
    Validator::run(raw).1
}

/// Walks a raw configuration, collecting errors as it builds the result.
struct Validator {
    errors: Vec<ConfigError>,
}

impl Validator {
    fn run(raw: &str) -> (Option<Configuration>, Vec<ConfigError>) {
        let mut validator = Self { errors: Vec::new() };

        let parsed: RawConfiguration = match serde_json::from_str(raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                validator.error(ConfigErrorKind::MalformedStructure, "$", e.to_string());
                return (None, validator.errors);
            }
        };

        let technology = validator.technology(parsed.technology);
        let groups = validator.groups(parsed.layer_groups.0);
        let declared: HashSet<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        let shortcuts = validator.shortcuts(parsed.shortcuts.0, &declared);

        if validator.errors.is_empty() {
            let config = Configuration {
                technology,
                groups,
                shortcuts,
            };
            (Some(config), validator.errors)
        } else {
            (None, validator.errors)
        }
    }

    fn error(&mut self, kind: ConfigErrorKind, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigError::new(kind, field, message));
    }

    fn technology(&mut self, value: Option<serde_json::Value>) -> String {
        match value {
            Some(serde_json::Value::String(name)) if !name.trim().is_empty() => name,
            Some(serde_json::Value::String(_)) | None => {
                self.error(
                    ConfigErrorKind::MissingTechnologyName,
                    "technology",
                    "technology name must be present and non-empty",
                );
                String::new()
            }
            Some(other) => {
                self.error(
                    ConfigErrorKind::MalformedStructure,
                    "technology",
                    format!("expected a string, found {other}"),
                );
                String::new()
            }
        }
    }

    fn groups(&mut self, entries: Vec<(String, serde_json::Value)>) -> Vec<LayerGroup> {
        let mut groups: Vec<LayerGroup> = Vec::with_capacity(entries.len());

        for (name, value) in entries {
            let field = format!("layer_groups.\"{name}\"");

            if name.is_empty() {
                self.error(
                    ConfigErrorKind::MalformedStructure,
                    &field,
                    "group name must not be empty",
                );
                continue;
            }
            if name == TARGET_DEFAULTS || name == TARGET_ALL {
                self.error(
                    ConfigErrorKind::MalformedStructure,
                    &field,
                    format!("'{name}' is a reserved target and cannot name a group"),
                );
                continue;
            }
            if groups.iter().any(|g| g.name == name) {
                self.error(
                    ConfigErrorKind::DuplicateGroup,
                    &field,
                    format!("group '{name}' is declared more than once"),
                );
                continue;
            }

            let raw_references: Vec<RawLayerReference> = match serde_json::from_value(value) {
                Ok(references) => references,
                Err(e) => {
                    self.error(
                        ConfigErrorKind::MalformedStructure,
                        &field,
                        format!("expected a list of layer references: {e}"),
                    );
                    continue;
                }
            };

            if raw_references.is_empty() {
                self.error(
                    ConfigErrorKind::EmptyGroup,
                    &field,
                    format!("group '{name}' has no layer references"),
                );
                continue;
            }

            let mut references = Vec::with_capacity(raw_references.len());
            for (idx, raw) in raw_references.into_iter().enumerate() {
                if let Some(reference) = self.reference(raw, &format!("{field}[{idx}]")) {
                    references.push(reference);
                }
            }

            groups.push(LayerGroup { name, references });
        }

        groups
    }

    fn reference(&mut self, raw: RawLayerReference, field: &str) -> Option<LayerReference> {
        let reference = match raw {
            RawLayerReference::Shorthand(s) => LayerReference::parse_shorthand(&s),
            RawLayerReference::Named { name, purpose } => LayerReference::Named {
                name,
                purposes: purpose.map(|p| p.into_vec()).unwrap_or_default(),
            },
            RawLayerReference::Numbered { layer, datatype } => {
                return Some(LayerReference::numbered(layer, datatype));
            }
        };

        if let LayerReference::Named { name, .. } = &reference {
            if name.trim().is_empty() {
                self.error(
                    ConfigErrorKind::EmptyLayerName,
                    format!("{field}.name"),
                    "layer reference must have a non-empty name",
                );
                return None;
            }
        }

        Some(reference)
    }

    fn shortcuts(
        &mut self,
        entries: Vec<(String, serde_json::Value)>,
        declared: &HashSet<&str>,
    ) -> Vec<ShortcutBinding> {
        let mut shortcuts = Vec::with_capacity(entries.len());
        let mut seen: HashMap<KeyBinding, String> = HashMap::new();

        for (key, value) in entries {
            let field = format!("shortcuts.\"{key}\"");

            let binding = match KeyBinding::parse(&key) {
                Ok(binding) => binding,
                Err(e) => {
                    self.error(ConfigErrorKind::MalformedStructure, &field, e.to_string());
                    continue;
                }
            };

            if let Some(previous) = seen.get(&binding) {
                let message = if previous == &key {
                    format!("key '{key}' is bound more than once")
                } else {
                    format!("key '{key}' is the same binding as '{previous}'")
                };
                self.error(ConfigErrorKind::DuplicateShortcut, &field, message);
                continue;
            }
            seen.insert(binding, key.clone());

            let (title, raw_actions) = match serde_json::from_value::<RawShortcut>(value) {
                Ok(RawShortcut::Actions(actions)) => (None, actions),
                Ok(RawShortcut::Titled { title, actions }) => (title, actions),
                Err(_) => {
                    self.error(
                        ConfigErrorKind::MalformedStructure,
                        &field,
                        "expected a list of actions or an object with an \"actions\" list",
                    );
                    continue;
                }
            };

            if raw_actions.is_empty() {
                self.error(
                    ConfigErrorKind::MalformedStructure,
                    &field,
                    "shortcut must have at least one action",
                );
                continue;
            }

            let mut actions = Vec::with_capacity(raw_actions.len());
            for (idx, raw) in raw_actions.into_iter().enumerate() {
                let action_field = format!("{field}[{idx}]");
                if let Some(action) = self.action(raw, &action_field, declared) {
                    actions.push(action);
                }
            }

            let title = title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| default_title(&actions));

            shortcuts.push(ShortcutBinding {
                key,
                binding,
                title,
                actions,
            });
        }

        shortcuts
    }

    fn action(
        &mut self,
        value: serde_json::Value,
        field: &str,
        declared: &HashSet<&str>,
    ) -> Option<Action> {
        let raw: RawAction = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                self.error(ConfigErrorKind::MalformedStructure, field, e.to_string());
                return None;
            }
        };

        let target_field = format!("{field}.target");
        let target = match raw.target.as_deref() {
            None if raw.verb == Verb::Restore => Target::Defaults,
            None => {
                self.error(
                    ConfigErrorKind::MalformedStructure,
                    target_field,
                    format!("'{}' needs a target", raw.verb),
                );
                return None;
            }
            Some(TARGET_DEFAULTS) => Target::Defaults,
            Some(TARGET_ALL) => Target::All,
            Some(name) if declared.contains(name) => Target::Group(name.to_string()),
            Some(name) => {
                self.error(
                    ConfigErrorKind::UnknownGroupTarget,
                    target_field,
                    format!("layer group '{name}' is not declared"),
                );
                return None;
            }
        };

        if raw.verb.requires_group() && !matches!(target, Target::Group(_)) {
            self.error(
                ConfigErrorKind::UnsupportedTarget,
                target_field,
                format!("'{}' needs a layer group, not '{target}'", raw.verb),
            );
            return None;
        }
        if raw.verb == Verb::Restore && target != Target::Defaults {
            self.error(
                ConfigErrorKind::UnsupportedTarget,
                target_field,
                format!("'restore' takes no target or '{TARGET_DEFAULTS}', not '{target}'"),
            );
            return None;
        }

        Some(Action::new(raw.verb, target))
    }
}

/// Builds a menu title for shortcuts that do not declare one.
fn default_title(actions: &[Action]) -> String {
    let focus = actions
        .iter()
        .find(|a| a.verb == Verb::Focus)
        .map(|a| format!("Focus on {}", a.target));

    focus.unwrap_or_else(|| match actions {
        [Action {
            verb: Verb::Show | Verb::Restore,
            target: Target::Defaults,
        }] => "Show default layers".to_string(),
        [Action {
            verb: Verb::Hide,
            target: Target::Defaults | Target::All,
        }] => "Hide all layers".to_string(),
        _ => actions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const METAL1: &str = r#"{
        "technology": "sg13g2",
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

    fn kinds(raw: &str) -> Vec<ConfigErrorKind> {
        validate(raw).into_iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_load_valid_configuration() {
        let config = load(METAL1).unwrap();
        assert_eq!(config.technology(), "sg13g2");
        assert_eq!(config.groups().len(), 1);
        assert_eq!(config.groups()[0].references.len(), 2);
        assert_eq!(config.shortcuts().len(), 1);
        assert_eq!(config.shortcuts()[0].title, "Focus on metal1");
        assert_eq!(
            config.shortcuts()[0].actions,
            vec![Action::new(Verb::Focus, Target::Group("metal1".to_string()))]
        );
    }

    #[test]
    fn test_duplicate_shortcut_key() {
        let raw = r#"{
            "technology": "sg13g2",
            "layer_groups": {"m1": ["Metal1.drawing"]},
            "shortcuts": {
                "1": [{"verb": "focus", "target": "m1"}],
                "1": [{"verb": "hide", "target": "all"}]
            }
        }"#;
        let err = load(raw).unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::DuplicateShortcut);
        assert_eq!(err.field, "shortcuts.\"1\"");
    }

    #[test]
    fn test_duplicate_shortcut_different_spelling() {
        let raw = r#"{
            "technology": "t",
            "shortcuts": {
                "Ctrl+H": [{"verb": "hide", "target": "all"}],
                "ctrl+h": [{"verb": "show", "target": "all"}]
            }
        }"#;
        assert_eq!(kinds(raw), vec![ConfigErrorKind::DuplicateShortcut]);
    }

    #[test]
    fn test_unknown_group_target() {
        let raw = r#"{
            "technology": "t",
            "layer_groups": {"m1": ["Metal1"]},
            "shortcuts": {"1": [{"verb": "show", "target": "m2"}]}
        }"#;
        let err = load(raw).unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::UnknownGroupTarget);
        assert_eq!(err.field, "shortcuts.\"1\"[0].target");
    }

    #[test]
    fn test_missing_and_blank_technology() {
        let missing = r#"{"shortcuts": {"0": [{"verb": "restore"}]}}"#;
        assert_eq!(kinds(missing), vec![ConfigErrorKind::MissingTechnologyName]);

        let blank = r#"{"technology": "  ", "shortcuts": {"0": [{"verb": "restore"}]}}"#;
        assert_eq!(kinds(blank), vec![ConfigErrorKind::MissingTechnologyName]);
    }

    #[test]
    fn test_empty_group_and_empty_name() {
        let raw = r#"{
            "technology": "t",
            "layer_groups": {
                "empty": [],
                "nameless": [{"name": "", "purpose": "drawing"}]
            },
            "shortcuts": {}
        }"#;
        assert_eq!(
            kinds(raw),
            vec![ConfigErrorKind::EmptyGroup, ConfigErrorKind::EmptyLayerName]
        );
    }

    #[test]
    fn test_duplicate_group() {
        let raw = r#"{
            "technology": "t",
            "layer_groups": {"m1": ["Metal1"], "m1": ["Metal2"]},
            "shortcuts": {}
        }"#;
        assert_eq!(kinds(raw), vec![ConfigErrorKind::DuplicateGroup]);
    }

    #[test]
    fn test_focus_on_special_target_is_rejected() {
        let raw = r#"{
            "technology": "t",
            "shortcuts": {"1": [{"verb": "focus", "target": "all"}]}
        }"#;
        assert_eq!(kinds(raw), vec![ConfigErrorKind::UnsupportedTarget]);
    }

    #[test]
    fn test_malformed_structure() {
        assert_eq!(kinds("not json"), vec![ConfigErrorKind::MalformedStructure]);
        assert_eq!(
            kinds(r#"{"technology": "t"}"#),
            vec![ConfigErrorKind::MalformedStructure]
        );

        let bad_verb = r#"{
            "technology": "t",
            "shortcuts": {"1": [{"verb": "explode", "target": "all"}]}
        }"#;
        let errors = validate(bad_verb);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ConfigErrorKind::MalformedStructure);
        assert_eq!(errors[0].field, "shortcuts.\"1\"[0]");
    }

    #[test]
    fn test_validate_collects_every_error() {
        let raw = r#"{
            "layer_groups": {"m1": []},
            "shortcuts": {
                "1": [{"verb": "show", "target": "nope"}],
                "1": [{"verb": "hide", "target": "all"}]
            }
        }"#;
        assert_eq!(
            kinds(raw),
            vec![
                ConfigErrorKind::MissingTechnologyName,
                ConfigErrorKind::EmptyGroup,
                ConfigErrorKind::UnknownGroupTarget,
                ConfigErrorKind::DuplicateShortcut,
            ]
        );
    }

    #[test]
    fn test_reference_forms() {
        let raw = r#"{
            "technology": "t",
            "layer_groups": {
                "mixed": [
                    "Metal1.drawing",
                    {"name": "Metal1", "purpose": ["pin", "label"]},
                    {"name": "Via1"},
                    {"layer": 8, "datatype": 0}
                ]
            },
            "shortcuts": {"1": {"title": "Mixed", "actions": [{"verb": "show", "target": "mixed"}]}}
        }"#;
        let config = load(raw).unwrap();
        let references = &config.group("mixed").unwrap().references;
        assert_eq!(
            references,
            &vec![
                LayerReference::named("Metal1", ["drawing"]),
                LayerReference::named("Metal1", ["pin", "label"]),
                LayerReference::named("Via1", Vec::<String>::new()),
                LayerReference::numbered(8, 0),
            ]
        );
        assert_eq!(config.shortcuts()[0].title, "Mixed");
    }

    #[test]
    fn test_restore_without_target_and_default_titles() {
        let raw = r#"{
            "technology": "t",
            "shortcuts": {
                "0": [{"verb": "restore"}],
                ",": [{"verb": "hide", "target": "defaults"}]
            }
        }"#;
        let config = load(raw).unwrap();
        assert_eq!(config.technology(), "t");
        assert_eq!(
            config.shortcuts()[0].actions,
            vec![Action::new(Verb::Restore, Target::Defaults)]
        );
        assert_eq!(config.shortcuts()[0].title, "Show default layers");
        assert_eq!(config.shortcuts()[1].title, "Hide all layers");
    }

    #[test]
    fn test_restore_rejects_group_and_all_targets() {
        let raw = r#"{
            "technology": "t",
            "layer_groups": {"m1": ["Metal1.drawing"]},
            "shortcuts": {
                "0": [{"verb": "restore", "target": "m1"}],
                "9": [{"verb": "restore", "target": "all"}],
                "8": [{"verb": "restore", "target": "defaults"}]
            }
        }"#;
        let errors = validate(raw);
        assert_eq!(
            errors.iter().map(|e| e.kind).collect::<Vec<_>>(),
            vec![
                ConfigErrorKind::UnsupportedTarget,
                ConfigErrorKind::UnsupportedTarget,
            ]
        );
        assert_eq!(errors[0].field, "shortcuts.\"0\"[0].target");
        assert_eq!(errors[1].field, "shortcuts.\"9\"[0].target");
    }

    #[test]
    fn test_tech_name_is_not_a_technology_field() {
        let raw = r#"{"tech_name": "t", "shortcuts": {"0": [{"verb": "restore"}]}}"#;
        assert_eq!(kinds(raw), vec![ConfigErrorKind::MissingTechnologyName]);
    }

    #[test]
    fn test_shift_letter_spellings_collide() {
        let raw = r#"{
            "technology": "t",
            "shortcuts": {
                "Shift+m": [{"verb": "hide", "target": "all"}],
                "Shift+M": [{"verb": "show", "target": "all"}],
                "M": [{"verb": "restore"}]
            }
        }"#;
        assert_eq!(
            kinds(raw),
            vec![
                ConfigErrorKind::DuplicateShortcut,
                ConfigErrorKind::DuplicateShortcut,
            ]
        );
    }

    #[test]
    fn test_reserved_group_name() {
        let raw = r#"{
            "technology": "t",
            "layer_groups": {"all": ["Metal1"]},
            "shortcuts": {}
        }"#;
        assert_eq!(kinds(raw), vec![ConfigErrorKind::MalformedStructure]);
    }
}
