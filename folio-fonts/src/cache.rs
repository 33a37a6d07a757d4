//! Family/variant index and the swappable cache that holds it.
//!
//! An index is built once per pipeline run and never mutated afterwards;
//! readers take a snapshot `Arc` and keep a consistent view even while a
//! reload replaces the current index.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::font_service::{FontFamily, FontVariant};
use crate::normalize::normalize_variant_id;

/// Immutable lookup structure over one set of families.
#[derive(Debug, Default)]
pub struct FontIndex {
    families: Vec<Arc<FontFamily>>,
    by_name: HashMap<String, usize>,
    variants: HashMap<String, FontVariant>,
}

impl FontIndex {
    /// Build an index, enforcing key uniqueness and admissibility.
    ///
    /// - Duplicate family keys: the last occurrence wins.
    /// - Duplicate variant ids: the last occurrence wins and the earlier
    ///   variant is removed from its family.
    /// - System families lose any variants; other families without variants
    ///   are dropped.
    pub fn build(families: Vec<FontFamily>) -> Self {
        let families = dedup_families(families);
        let families = dedup_variants(families);

        let mut index = FontIndex::default();
        for mut family in families {
            if family.is_system {
                family.variants.clear();
            } else if family.variants.is_empty() {
                log::warn!(
                    "Font family '{}' has no variants left, dropping it",
                    family.name
                );
                continue;
            }
            for variant in &family.variants {
                index
                    .variants
                    .insert(variant.variant_id.clone(), variant.clone());
            }
            index
                .by_name
                .insert(family.name.clone(), index.families.len());
            index.families.push(Arc::new(family));
        }
        log::debug!(
            "Built font index: {} families, {} variants",
            index.families.len(),
            index.variants.len()
        );
        index
    }

    pub fn families(&self) -> impl Iterator<Item = &Arc<FontFamily>> {
        self.families.iter()
    }

    /// Family by its exact key.
    pub fn family(&self, name: &str) -> Option<&Arc<FontFamily>> {
        self.by_name.get(name).map(|&i| &self.families[i])
    }

    /// Variant by identifier; the identifier is normalized first.
    pub fn variant(&self, id: &str) -> Option<&FontVariant> {
        let id = normalize_variant_id(id);
        if id.is_empty() {
            return None;
        }
        self.variants.get(&id)
    }

    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

fn dedup_families(families: Vec<FontFamily>) -> Vec<FontFamily> {
    let mut slots: Vec<Option<FontFamily>> = Vec::with_capacity(families.len());
    let mut positions: HashMap<String, usize> = HashMap::new();
    for family in families {
        if let Some(previous) = positions.insert(family.name.clone(), slots.len()) {
            log::warn!(
                "Duplicate font family key '{}', keeping the later definition",
                family.name
            );
            slots[previous] = None;
        }
        slots.push(Some(family));
    }
    slots.into_iter().flatten().collect()
}

/// Canonicalize variant ids and drop the losers of id collisions.
fn dedup_variants(mut families: Vec<FontFamily>) -> Vec<FontFamily> {
    let mut owner: HashMap<String, (usize, usize)> = HashMap::new();
    let mut losers: HashSet<(usize, usize)> = HashSet::new();

    for (fi, family) in families.iter_mut().enumerate() {
        if family.is_system {
            continue;
        }
        for (vi, variant) in family.variants.iter_mut().enumerate() {
            let id = normalize_variant_id(&variant.variant_id);
            if id.is_empty() {
                log::warn!(
                    "Variant of '{}' has an empty identifier, skipping",
                    family.name
                );
                losers.insert((fi, vi));
                continue;
            }
            if id != variant.variant_id {
                log::debug!("Canonicalized variant id '{}' to '{id}'", variant.variant_id);
                variant.variant_id = id.clone();
            }
            if let Some(previous) = owner.insert(id.clone(), (fi, vi)) {
                log::warn!(
                    "Duplicate font variant id '{id}', keeping the one from family '{}'",
                    family.name
                );
                losers.insert(previous);
            }
        }
    }

    if losers.is_empty() {
        return families;
    }
    for (fi, family) in families.iter_mut().enumerate() {
        let mut vi = 0;
        family.variants.retain(|_| {
            let keep = !losers.contains(&(fi, vi));
            vi += 1;
            keep
        });
    }
    families
}

/// Holder of the current index, replaced atomically.
#[derive(Debug, Default)]
pub struct FontCache {
    current: ArcSwapOption<FontIndex>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current index, if one has been published.
    pub fn snapshot(&self) -> Option<Arc<FontIndex>> {
        self.current.load_full()
    }

    pub fn publish(&self, index: FontIndex) {
        self.current.store(Some(Arc::new(index)));
    }

    pub fn clear(&self) {
        self.current.store(None);
    }

    pub fn is_populated(&self) -> bool {
        self.current.load().is_some()
    }
}
