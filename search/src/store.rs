//! Canonical filter state plus the result list derived from it.
//!
//! Every mutator recomputes the filtered list before returning and reports
//! whether anything changed. Calling a setter with the value already held is a
//! no-op. Structured facets (brand, model, year, OEM, FMSI) take over from the
//! free-text query: committing a non-empty value for one of them clears the
//! query. Committing a query never clears them.

use crate::config::EngineConfig;
use crate::config::SortOrder;
use crate::facets::FacetOptions;
use crate::facets::FacetSelection;
use crate::facets::derive_facets;
use crate::filters::FilterState;
use crate::filters::TextFacet;
use crate::index_cache::SearchIndexCache;
use crate::model::Position;
use crate::model::Product;
use crate::strategy::FilterContext;
use crate::strategy::StrategyRegistry;
use std::collections::BTreeSet;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

pub struct FilterStore {
    config: EngineConfig,
    registry: StrategyRegistry,
    index: SearchIndexCache,
    products: Vec<Arc<Product>>,
    favorites: HashSet<String>,
    comparisons: BTreeSet<String>,
    filters: FilterState,
    filtered: Vec<Arc<Product>>,
}

impl FilterStore {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_registry(config, StrategyRegistry::standard())
    }

    pub fn with_registry(config: EngineConfig, registry: StrategyRegistry) -> Self {
        let index = SearchIndexCache::new(config.index_cache_capacity);
        Self {
            config,
            registry,
            index,
            products: Vec::new(),
            favorites: HashSet::new(),
            comparisons: BTreeSet::new(),
            filters: FilterState::default(),
            filtered: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn products(&self) -> &[Arc<Product>] {
        &self.products
    }

    pub fn filtered(&self) -> &[Arc<Product>] {
        &self.filtered
    }

    pub fn result_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn index(&self) -> &SearchIndexCache {
        &self.index
    }

    /// Replaces the catalog. Index entries for the previous products are
    /// released once nothing else holds them.
    pub fn set_products<I>(&mut self, products: I)
    where
        I: IntoIterator,
        I::Item: Into<Arc<Product>>,
    {
        let mut products: Vec<Arc<Product>> = products.into_iter().map(Into::into).collect();
        if self.config.sort_order == SortOrder::ReferenceNumber {
            products.sort_by_key(|product| product.sortable_reference_number());
        }
        self.products = products;
        self.filtered.clear();
        self.index.prune();
        self.recompute();
    }

    pub fn set_search_query(&mut self, value: &str) -> bool {
        if self.filters.search_query == value {
            return false;
        }
        self.filters.search_query = value.to_string();
        self.recompute();
        true
    }

    pub fn set_selected_brand(&mut self, value: &str) -> bool {
        self.set_structured(TextFacet::Brand, value)
    }

    pub fn set_selected_model(&mut self, value: &str) -> bool {
        self.set_structured(TextFacet::Model, value)
    }

    pub fn set_selected_year(&mut self, value: &str) -> bool {
        self.set_structured(TextFacet::Year, value)
    }

    pub fn set_oem_reference(&mut self, value: &str) -> bool {
        self.set_structured(TextFacet::Oem, value)
    }

    pub fn set_fmsi_reference(&mut self, value: &str) -> bool {
        self.set_structured(TextFacet::Fmsi, value)
    }

    pub fn set_width(&mut self, value: &str) -> bool {
        self.set_dimension(TextFacet::Width, value)
    }

    pub fn set_height(&mut self, value: &str) -> bool {
        self.set_dimension(TextFacet::Height, value)
    }

    /// Dispatches to the setter for `facet`.
    pub fn set_text(&mut self, facet: TextFacet, value: &str) -> bool {
        match facet {
            TextFacet::Query => self.set_search_query(value),
            TextFacet::Brand => self.set_selected_brand(value),
            TextFacet::Model => self.set_selected_model(value),
            TextFacet::Year => self.set_selected_year(value),
            TextFacet::Oem => self.set_oem_reference(value),
            TextFacet::Fmsi => self.set_fmsi_reference(value),
            TextFacet::Width => self.set_width(value),
            TextFacet::Height => self.set_height(value),
        }
    }

    /// Adds the position when absent, removes it when present.
    pub fn toggle_position(&mut self, position: Position) -> bool {
        let positions = &mut self.filters.selected_positions;
        if let Some(existing) = positions.iter().position(|selected| *selected == position) {
            positions.remove(existing);
        } else {
            positions.push(position);
        }
        self.recompute();
        true
    }

    pub fn toggle_show_favorites_only(&mut self) -> bool {
        let enabled = !self.filters.show_favorites_only;
        self.set_show_favorites_only(enabled)
    }

    pub fn set_show_favorites_only(&mut self, enabled: bool) -> bool {
        if self.filters.show_favorites_only == enabled {
            return false;
        }
        self.filters.show_favorites_only = enabled;
        self.recompute();
        true
    }

    pub fn clear_filters(&mut self) -> bool {
        if self.filters.is_cleared() {
            return false;
        }
        self.filters = FilterState::default();
        self.recompute();
        true
    }

    pub fn set_favorites<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.favorites = ids.into_iter().collect();
        self.recompute_if_favorites_only();
    }

    /// Returns whether `id` is a favorite afterwards.
    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        let now_favorite = if self.favorites.remove(id) {
            false
        } else {
            self.favorites.insert(id.to_string());
            true
        };
        self.recompute_if_favorites_only();
        now_favorite
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    /// Returns whether `id` is marked for comparison afterwards.
    pub fn toggle_comparison(&mut self, id: &str) -> bool {
        if self.comparisons.remove(id) {
            return false;
        }
        self.comparisons.insert(id.to_string());
        true
    }

    pub fn is_compared(&self, id: &str) -> bool {
        self.comparisons.contains(id)
    }

    pub fn comparisons(&self) -> impl Iterator<Item = &str> {
        self.comparisons.iter().map(String::as_str)
    }

    pub fn favorites_count(&self) -> usize {
        self.favorites.len()
    }

    pub fn comparisons_count(&self) -> usize {
        self.comparisons.len()
    }

    /// Fitments across the current results.
    pub fn total_applications(&self) -> usize {
        self.filtered
            .iter()
            .map(|product| product.application_count())
            .sum()
    }

    /// Brand/model/year options over the whole catalog, cascading on the
    /// committed brand and model.
    pub fn facet_options(&self) -> FacetOptions {
        derive_facets(&self.products, &FacetSelection::from_state(&self.filters))
    }

    fn set_structured(&mut self, facet: TextFacet, value: &str) -> bool {
        let slot = self.text_slot(facet);
        if slot == value {
            return false;
        }
        *slot = value.to_string();
        if !value.trim().is_empty() && !self.filters.search_query.is_empty() {
            debug!("{} took over from the free-text query", facet.key());
            self.filters.search_query.clear();
        }
        self.recompute();
        true
    }

    fn set_dimension(&mut self, facet: TextFacet, value: &str) -> bool {
        let slot = self.text_slot(facet);
        if slot == value {
            return false;
        }
        *slot = value.to_string();
        self.recompute();
        true
    }

    fn text_slot(&mut self, facet: TextFacet) -> &mut String {
        let filters = &mut self.filters;
        match facet {
            TextFacet::Query => &mut filters.search_query,
            TextFacet::Brand => &mut filters.selected_brand,
            TextFacet::Model => &mut filters.selected_model,
            TextFacet::Year => &mut filters.selected_year,
            TextFacet::Oem => &mut filters.oem_reference,
            TextFacet::Fmsi => &mut filters.fmsi_reference,
            TextFacet::Width => &mut filters.width,
            TextFacet::Height => &mut filters.height,
        }
    }

    fn recompute_if_favorites_only(&mut self) {
        if self.filters.show_favorites_only {
            self.recompute();
        }
    }

    fn recompute(&mut self) {
        let started = Instant::now();
        let ctx = FilterContext::new(&self.favorites, &self.index)
            .with_dimension_tolerance(self.config.dimension_tolerance_mm);
        self.filtered = self
            .registry
            .filter_products(&self.products, &self.filters, &ctx);
        debug!(
            matched = self.filtered.len(),
            total = self.products.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "recomputed filtered products"
        );
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
