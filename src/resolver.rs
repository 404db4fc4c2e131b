//! Resolution of configured layer references against the live catalog.
//!
//! A configuration is written once and shared by similar technologies, so a
//! reference that matches nothing is normal: it resolves to an empty result
//! and a [`Warning::LayerNotFound`], never an error.
//!
//! Results are cached per reference together with the catalog generation they
//! were computed for. A cache hit does not touch the catalog's layer list.

use crate::catalog::{CatalogLayer, LayerCatalog, LayerHandle};
use crate::config::{Configuration, LayerGroup, LayerReference};
use crate::warning::Warning;
use std::collections::HashMap;
use tracing::debug;

/// Purpose synonyms. An empty string stands for an unqualified layer.
const PURPOSE_SYNONYMS: &[(&str, &[&str])] = &[
    ("drawing", &["drawing", "drw", ""]),
    ("pin", &["pin"]),
    ("label", &["label", "lbl"]),
    ("text", &["text", "txt"]),
    ("fill", &["fill", "filler"]),
];

/// Checks whether a catalog purpose satisfies a configured purpose.
///
/// # Examples
/// ```
/// use layer_shortcuts::resolver::purpose_matches;
///
/// assert!(purpose_matches("drawing", Some("drawing")));
/// assert!(purpose_matches("drawing", None));
/// assert!(purpose_matches("label", Some("lbl")));
/// assert!(!purpose_matches("pin", Some("drawing")));
/// assert!(purpose_matches("blockage", Some("blockage")));
/// ```
#[must_use]
pub fn purpose_matches(wanted: &str, actual: Option<&str>) -> bool {
    let actual = actual.unwrap_or("");
    if wanted == actual {
        return true;
    }
    PURPOSE_SYNONYMS
        .iter()
        .find(|(canonical, _)| *canonical == wanted)
        .is_some_and(|(_, synonyms)| synonyms.contains(&actual))
}

/// Checks whether a reference matches one catalog entry.
#[must_use]
pub fn reference_matches(reference: &LayerReference, layer: &CatalogLayer) -> bool {
    match reference {
        LayerReference::Named { name, purposes } => {
            layer.name == *name
                && (purposes.is_empty()
                    || purposes
                        .iter()
                        .any(|p| purpose_matches(p, layer.purpose.as_deref())))
        }
        LayerReference::Numbered { layer: number, datatype } => {
            layer.layer_number == Some(*number) && layer.datatype == Some(*datatype)
        }
    }
}

/// The catalog entries a reference matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLayer {
    /// The reference that was resolved
    pub reference: LayerReference,
    /// Matching entries in catalog order, with flags as of resolution time
    pub layers: Vec<CatalogLayer>,
}

impl ResolvedLayer {
    /// True when the technology has no matching layer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Handles of the matched layers.
    pub fn handles(&self) -> impl Iterator<Item = LayerHandle> + '_ {
        self.layers.iter().map(|l| l.handle)
    }

    /// The `LayerNotFound` warning for an empty result.
    #[must_use]
    pub fn warning(&self, group: Option<&str>) -> Option<Warning> {
        self.is_empty().then(|| Warning::LayerNotFound {
            group: group.map(str::to_string),
            reference: self.reference.clone(),
        })
    }
}

/// All layers of one group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupResolution {
    /// Handles in reference order, without duplicates
    pub handles: Vec<LayerHandle>,
    /// One warning per reference that matched nothing
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    generation: u64,
    resolved: ResolvedLayer,
}

/// Resolves references and caches the results per catalog generation.
#[derive(Debug, Clone, Default)]
pub struct LayerResolver {
    cache: HashMap<LayerReference, CacheEntry>,
    hits: usize,
    misses: usize,
}

impl LayerResolver {
    /// Creates a resolver with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves one reference.
    pub fn resolve<C>(&mut self, reference: &LayerReference, catalog: &C) -> ResolvedLayer
    where
        C: LayerCatalog + ?Sized,
    {
        let mut listing = None;
        self.resolve_with(reference, catalog, &mut listing)
    }

    /// Resolves one reference, reading the catalog listing at most once per
    /// call chain sharing `listing`.
    fn resolve_with<C>(
        &mut self,
        reference: &LayerReference,
        catalog: &C,
        listing: &mut Option<Vec<CatalogLayer>>,
    ) -> ResolvedLayer
    where
        C: LayerCatalog + ?Sized,
    {
        let generation = catalog.generation();
        if let Some(entry) = self.cache.get(reference) {
            if entry.generation == generation {
                self.hits += 1;
                return entry.resolved.clone();
            }
        }

        self.misses += 1;
        let layers = listing.get_or_insert_with(|| catalog.layers());
        let resolved = ResolvedLayer {
            reference: reference.clone(),
            layers: layers
                .iter()
                .filter(|layer| reference_matches(reference, layer))
                .cloned()
                .collect(),
        };

        debug!(
            "Resolved {reference} to {} layer(s) at generation {generation}",
            resolved.layers.len()
        );

        self.cache.insert(
            reference.clone(),
            CacheEntry {
                generation,
                resolved: resolved.clone(),
            },
        );
        resolved
    }

    /// Resolves every reference of a group.
    pub fn resolve_group<C>(&mut self, group: &LayerGroup, catalog: &C) -> GroupResolution
    where
        C: LayerCatalog + ?Sized,
    {
        let mut listing = None;
        let mut resolution = GroupResolution::default();

        for reference in &group.references {
            let resolved = self.resolve_with(reference, catalog, &mut listing);
            if let Some(warning) = resolved.warning(Some(&group.name)) {
                resolution.warnings.push(warning);
            }
            for handle in resolved.handles() {
                if !resolution.handles.contains(&handle) {
                    resolution.handles.push(handle);
                }
            }
        }

        resolution
    }

    /// Resolves every group of a configuration and returns the warnings.
    ///
    /// Used once after a configuration is activated to summarize which layers
    /// this technology lacks.
    pub fn unresolved<C>(&mut self, config: &Configuration, catalog: &C) -> Vec<Warning>
    where
        C: LayerCatalog + ?Sized,
    {
        config
            .groups()
            .iter()
            .flat_map(|group| self.resolve_group(group, catalog).warnings)
            .collect()
    }

    /// Drops every cached result.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    /// `(hits, misses)` since creation.
    #[must_use]
    pub const fn cache_stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}
