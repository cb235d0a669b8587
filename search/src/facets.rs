use crate::filters::FilterState;
use crate::model::Fitment;
use crate::model::Product;
use crate::text::blank_to_none;
use crate::text::normalize;
use crate::text::parse_leading_float;
use serde::Deserialize;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetBucket {
    pub value: String,
    pub count: usize,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetOptions {
    pub brands: Vec<FacetBucket>,
    pub models: Vec<FacetBucket>,
    pub years: Vec<FacetBucket>,
}

/// Upstream selections the brand → model → year cascade depends on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FacetSelection {
    brand: Option<String>,
    model: Option<String>,
}

impl FacetSelection {
    pub fn new(brand: Option<&str>, model: Option<&str>) -> Self {
        Self {
            brand: brand.and_then(blank_to_none).map(normalize),
            model: model.and_then(blank_to_none).map(normalize),
        }
    }

    pub fn from_state(state: &FilterState) -> Self {
        Self::new(
            Some(state.selected_brand.as_str()),
            Some(state.selected_model.as_str()),
        )
    }

    fn brand_matches(&self, fitment: &Fitment) -> bool {
        matches_selected(self.brand.as_deref(), fitment.brand.as_deref())
    }

    fn model_matches(&self, fitment: &Fitment) -> bool {
        matches_selected(self.model.as_deref(), fitment.model.as_deref())
    }
}

/// Brand, model and year options from the live catalog. Counts are fitment
/// occurrences.
pub fn derive_facets(products: &[Arc<Product>], selection: &FacetSelection) -> FacetOptions {
    let mut brands = BucketAccumulator::default();
    let mut models = BucketAccumulator::default();
    let mut years = BucketAccumulator::default();

    for fitment in products.iter().flat_map(|product| product.applications.iter()) {
        if let Some(brand) = fitment.brand.as_deref() {
            brands.add(brand);
        }
        if !selection.brand_matches(fitment) {
            continue;
        }
        if let Some(model) = fitment.model.as_deref() {
            models.add(model);
        }
        if !selection.model_matches(fitment) {
            continue;
        }
        if let Some(year) = fitment.year.as_deref() {
            years.add(year);
        }
    }

    let mut years = years.into_buckets();
    years.sort_by(compare_years_descending);
    FacetOptions {
        brands: brands.into_buckets(),
        models: models.into_buckets(),
        years,
    }
}

fn matches_selected(selected: Option<&str>, candidate: Option<&str>) -> bool {
    match selected {
        None => true,
        Some(selected) => candidate.is_some_and(|value| normalize(value) == selected),
    }
}

fn compare_years_descending(a: &FacetBucket, b: &FacetBucket) -> Ordering {
    let a_key = parse_leading_float(&a.value).unwrap_or(f64::MIN);
    let b_key = parse_leading_float(&b.value).unwrap_or(f64::MIN);
    b_key
        .total_cmp(&a_key)
        .then_with(|| b.value.cmp(&a.value))
}

/// Dedupes by normalized form and keeps the first spelling seen for display.
#[derive(Default)]
struct BucketAccumulator {
    buckets: BTreeMap<String, FacetBucket>,
}

impl BucketAccumulator {
    fn add(&mut self, raw: &str) {
        let Some(display) = blank_to_none(raw) else {
            return;
        };
        self.buckets
            .entry(normalize(display))
            .or_insert_with(|| FacetBucket {
                value: display.to_string(),
                count: 0,
            })
            .count += 1;
    }

    fn into_buckets(self) -> Vec<FacetBucket> {
        self.buckets.into_values().collect()
    }
}
