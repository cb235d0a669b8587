//! Per-facet predicates.
//!
//! A strategy answers one question: does this product satisfy this facet's
//! value? Every strategy returns `true` for an empty value, so an unset facet
//! never excludes anything, and none of them panics on incomplete product
//! data; a missing field is simply a non-match.

use crate::filters::FacetKey;
use crate::filters::FilterValue;
use crate::index_cache::SearchIndexCache;
use crate::model::Product;
use crate::text::blank_to_none;
use crate::text::normalize;
use crate::text::parse_leading_float;
use crate::text::query_terms;
use std::collections::HashSet;
use std::sync::Arc;

pub const DEFAULT_DIMENSION_TOLERANCE_MM: f64 = 2.0;

/// Absorbs float noise in decimal measurements such as `100.1` vs `98.1`.
const DIMENSION_EPSILON: f64 = 1e-9;

pub type Strategy = fn(&Arc<Product>, FilterValue<'_>, &FilterContext<'_>) -> bool;

/// Read-only inputs a strategy may consult besides the product itself.
pub struct FilterContext<'a> {
    pub favorites: &'a HashSet<String>,
    pub index: &'a SearchIndexCache,
    pub dimension_tolerance: f64,
}

impl<'a> FilterContext<'a> {
    pub fn new(favorites: &'a HashSet<String>, index: &'a SearchIndexCache) -> Self {
        Self {
            favorites,
            index,
            dimension_tolerance: DEFAULT_DIMENSION_TOLERANCE_MM,
        }
    }

    pub fn with_dimension_tolerance(mut self, tolerance: f64) -> Self {
        self.dimension_tolerance = tolerance;
        self
    }
}

#[derive(Clone)]
pub struct StrategyRegistry {
    entries: Vec<(FacetKey, Strategy)>,
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// All catalog facets, cheapest checks first so the evaluator can bail
    /// out before building a searchable index.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(FacetKey::ShowFavoritesOnly, favorites_only);
        registry.register(FacetKey::SelectedPositions, selected_positions);
        registry.register(FacetKey::Width, width);
        registry.register(FacetKey::Height, height);
        registry.register(FacetKey::SelectedBrand, selected_brand);
        registry.register(FacetKey::SelectedModel, selected_model);
        registry.register(FacetKey::SelectedYear, selected_year);
        registry.register(FacetKey::OemReference, oem_reference);
        registry.register(FacetKey::FmsiReference, fmsi_reference);
        registry.register(FacetKey::SearchQuery, search_query);
        registry
    }

    /// Adds a strategy, replacing any existing one for the same facet.
    pub fn register(&mut self, key: FacetKey, strategy: Strategy) {
        if let Some(slot) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            slot.1 = strategy;
        } else {
            self.entries.push((key, strategy));
        }
    }

    pub fn get(&self, key: FacetKey) -> Option<Strategy> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, strategy)| *strategy)
    }

    pub fn keys(&self) -> impl Iterator<Item = FacetKey> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    pub(crate) fn entries(&self) -> &[(FacetKey, Strategy)] {
        &self.entries
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn text_value(value: FilterValue<'_>) -> Option<&str> {
    match value {
        FilterValue::Text(text) => blank_to_none(text),
        FilterValue::Positions(_) | FilterValue::Flag(_) => None,
    }
}

pub fn search_query(item: &Arc<Product>, value: FilterValue<'_>, ctx: &FilterContext<'_>) -> bool {
    let Some(query) = text_value(value) else {
        return true;
    };
    let terms = query_terms(query);
    if terms.is_empty() {
        return true;
    }
    let haystack = ctx.index.searchable_text(item);
    terms.iter().all(|term| haystack.contains(term.as_str()))
}

pub fn selected_brand(
    item: &Arc<Product>,
    value: FilterValue<'_>,
    _ctx: &FilterContext<'_>,
) -> bool {
    let Some(brand) = text_value(value) else {
        return true;
    };
    let needle = normalize(brand);
    item.applications
        .iter()
        .any(|fitment| contains_normalized(fitment.brand.as_deref(), &needle))
}

/// Matches against both `modelo` and `serie`.
pub fn selected_model(
    item: &Arc<Product>,
    value: FilterValue<'_>,
    _ctx: &FilterContext<'_>,
) -> bool {
    let Some(model) = text_value(value) else {
        return true;
    };
    let needle = normalize(model);
    item.applications.iter().any(|fitment| {
        contains_normalized(fitment.model.as_deref(), &needle)
            || contains_normalized(fitment.series.as_deref(), &needle)
    })
}

/// Substring match on the raw year so `"201"` finds 2010 through 2019.
pub fn selected_year(
    item: &Arc<Product>,
    value: FilterValue<'_>,
    _ctx: &FilterContext<'_>,
) -> bool {
    let Some(year) = text_value(value) else {
        return true;
    };
    item.applications.iter().any(|fitment| {
        fitment
            .year
            .as_deref()
            .is_some_and(|candidate| candidate.contains(year))
    })
}

pub fn oem_reference(
    item: &Arc<Product>,
    value: FilterValue<'_>,
    _ctx: &FilterContext<'_>,
) -> bool {
    list_contains(&item.oem, value)
}

pub fn fmsi_reference(
    item: &Arc<Product>,
    value: FilterValue<'_>,
    _ctx: &FilterContext<'_>,
) -> bool {
    list_contains(&item.fmsi, value)
}

pub fn width(item: &Arc<Product>, value: FilterValue<'_>, ctx: &FilterContext<'_>) -> bool {
    within_tolerance(item.dimensions.width, value, ctx.dimension_tolerance)
}

pub fn height(item: &Arc<Product>, value: FilterValue<'_>, ctx: &FilterContext<'_>) -> bool {
    within_tolerance(item.dimensions.height, value, ctx.dimension_tolerance)
}

/// The product must support every requested position; selecting both front
/// and rear keeps only products valid for both.
pub fn selected_positions(
    item: &Arc<Product>,
    value: FilterValue<'_>,
    _ctx: &FilterContext<'_>,
) -> bool {
    let FilterValue::Positions(required) = value else {
        return true;
    };
    if required.is_empty() {
        return true;
    }
    let available = item.position_set();
    required.iter().all(|position| available.contains(*position))
}

pub fn favorites_only(
    item: &Arc<Product>,
    value: FilterValue<'_>,
    ctx: &FilterContext<'_>,
) -> bool {
    match value {
        FilterValue::Flag(true) => ctx.favorites.contains(&item.id),
        FilterValue::Flag(false) | FilterValue::Text(_) | FilterValue::Positions(_) => true,
    }
}

fn contains_normalized(candidate: Option<&str>, needle: &str) -> bool {
    candidate.is_some_and(|text| normalize(text).contains(needle))
}

fn list_contains(entries: &[String], value: FilterValue<'_>) -> bool {
    let Some(reference) = text_value(value) else {
        return true;
    };
    let needle = normalize(reference);
    entries
        .iter()
        .any(|entry| normalize(entry).contains(&needle))
}

/// Unparsable input places no constraint; an item without a usable
/// measurement never matches a parsed one.
fn within_tolerance(measured: Option<f64>, value: FilterValue<'_>, tolerance: f64) -> bool {
    let Some(target) = text_value(value).and_then(parse_leading_float) else {
        return true;
    };
    measured.is_some_and(|actual| (actual - target).abs() <= tolerance + DIMENSION_EPSILON)
}
