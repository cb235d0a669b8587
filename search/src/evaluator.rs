use crate::filters::FilterState;
use crate::model::Product;
use crate::strategy::FilterContext;
use crate::strategy::StrategyRegistry;
use once_cell::sync::Lazy;
use std::sync::Arc;

static STANDARD_REGISTRY: Lazy<StrategyRegistry> = Lazy::new(StrategyRegistry::standard);

/// AND of every active facet using the standard strategies.
pub fn evaluate(item: &Arc<Product>, state: &FilterState, ctx: &FilterContext<'_>) -> bool {
    STANDARD_REGISTRY.evaluate(item, state, ctx)
}

impl StrategyRegistry {
    /// Runs each registered strategy whose facet is active and stops at the
    /// first one that rejects the item.
    pub fn evaluate(
        &self,
        item: &Arc<Product>,
        state: &FilterState,
        ctx: &FilterContext<'_>,
    ) -> bool {
        self.entries()
            .iter()
            .filter(|(key, _)| state.is_active(*key))
            .all(|(key, strategy)| strategy(item, state.value(*key), ctx))
    }

    /// Items that pass [`StrategyRegistry::evaluate`], in input order.
    pub fn filter_products(
        &self,
        products: &[Arc<Product>],
        state: &FilterState,
        ctx: &FilterContext<'_>,
    ) -> Vec<Arc<Product>> {
        if state.active_facets().is_empty() {
            return products.to_vec();
        }
        products
            .iter()
            .filter(|item| self.evaluate(item, state, ctx))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index_cache::SearchIndexCache;
    use crate::model::Position;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashSet;

    fn catalog() -> Vec<Arc<Product>> {
        [
            json!({
                "id": "1",
                "referencia": "7291",
                "posicion": "DELANTERA",
                "medidas": { "ancho": 100, "alto": 45 },
                "aplicaciones": [ { "marca": "Toyota", "modelo": "Yaris", "año": "2008" } ]
            }),
            json!({
                "id": "2",
                "referencia": "8120",
                "posicion": "AMBAS",
                "medidas": { "ancho": 120, "alto": 50 },
                "aplicaciones": [ { "marca": "Ford", "modelo": "Fiesta", "año": "2010" } ]
            }),
            json!({
                "id": "3",
                "referencia": "9001",
                "aplicaciones": null
            }),
        ]
        .into_iter()
        .map(|value| Arc::new(serde_json::from_value(value).expect("product")))
        .collect()
    }

    fn ids(products: &[Arc<Product>]) -> Vec<&str> {
        products.iter().map(|product| product.id.as_str()).collect()
    }

    #[test]
    fn empty_state_keeps_everything() {
        let favorites = HashSet::new();
        let index = SearchIndexCache::default();
        let ctx = FilterContext::new(&favorites, &index);
        let state = FilterState::default();
        let products = catalog();
        assert!(products.iter().all(|item| evaluate(item, &state, &ctx)));
        assert_eq!(
            ids(&StrategyRegistry::standard().filter_products(&products, &state, &ctx)),
            vec!["1", "2", "3"]
        );
    }

    #[test]
    fn facets_combine_with_and() {
        let favorites = HashSet::new();
        let index = SearchIndexCache::default();
        let ctx = FilterContext::new(&favorites, &index);
        let registry = StrategyRegistry::standard();
        let products = catalog();

        let state = FilterState {
            selected_positions: vec![Position::Front],
            ..Default::default()
        };
        assert_eq!(ids(&registry.filter_products(&products, &state, &ctx)), vec!["1", "2"]);

        let narrowed = FilterState {
            width: "119".to_string(),
            ..state
        };
        assert_eq!(ids(&registry.filter_products(&products, &narrowed, &ctx)), vec!["2"]);
    }

    #[test]
    fn adding_query_terms_only_narrows() {
        let favorites = HashSet::new();
        let index = SearchIndexCache::default();
        let ctx = FilterContext::new(&favorites, &index);
        let registry = StrategyRegistry::standard();
        let products = catalog();

        let mut previous = products.len();
        let mut query = String::new();
        for term in ["20", "ford", "fiesta", "yaris"] {
            query.push(' ');
            query.push_str(term);
            let state = FilterState {
                search_query: query.clone(),
                ..Default::default()
            };
            let matched = registry.filter_products(&products, &state, &ctx).len();
            assert!(matched <= previous, "{query} grew the result set");
            previous = matched;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn malformed_item_does_not_affect_others() {
        let favorites = HashSet::new();
        let index = SearchIndexCache::default();
        let ctx = FilterContext::new(&favorites, &index);
        let state = FilterState {
            selected_brand: "ford".to_string(),
            ..Default::default()
        };
        let products = catalog();
        assert_eq!(
            ids(&StrategyRegistry::standard().filter_products(&products, &state, &ctx)),
            vec!["2"]
        );
    }
}
