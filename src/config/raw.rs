//! Serde shapes of the JSON configuration file.
//!
//! These types only describe the outer structure. Group and shortcut bodies
//! stay as `serde_json::Value` so the validator can report each problem with
//! the path of the offending field instead of aborting on the first one.

use super::model::Verb;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::marker::PhantomData;

/// Top-level configuration object.
#[derive(Debug, Deserialize)]
pub(crate) struct RawConfiguration {
    /// Technology identifier
    #[serde(default)]
    pub technology: Option<serde_json::Value>,
    #[serde(default)]
    pub layer_groups: Entries<serde_json::Value>,
    pub shortcuts: Entries<serde_json::Value>,
}

/// A JSON object kept as ordered key/value pairs.
///
/// Unlike a `HashMap`, this keeps declaration order and duplicate keys, both
/// of which the validator needs.
#[derive(Debug)]
pub(crate) struct Entries<T>(pub Vec<(String, T)>);

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Entries<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = Entries<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, T>()? {
                    entries.push((key, value));
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// One layer reference as written in a group.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawLayerReference {
    /// `"Metal1.drawing"`
    Shorthand(String),
    /// `{"name": "Metal1", "purpose": "drawing"}`
    Named {
        name: String,
        #[serde(default)]
        purpose: Option<RawPurpose>,
    },
    /// `{"layer": 8, "datatype": 0}`
    Numbered { layer: u32, datatype: u32 },
}

/// Purpose qualifier: a single string or a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawPurpose {
    One(String),
    Many(Vec<String>),
}

impl RawPurpose {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(purpose) => vec![purpose],
            Self::Many(purposes) => purposes,
        }
    }
}

/// A shortcut body: a bare action list or a titled object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawShortcut {
    Actions(Vec<serde_json::Value>),
    Titled {
        #[serde(default)]
        title: Option<String>,
        actions: Vec<serde_json::Value>,
    },
}

/// One action object.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawAction {
    pub verb: Verb,
    #[serde(default)]
    pub target: Option<String>,
}
