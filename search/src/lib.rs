/*!
# Pastillas Search

Faceted filter engine for a brake-pad catalog: free-text query, vehicle
brand/model/year, installation position, OEM/FMSI cross references, physical
dimensions and a favorites-only toggle, all combined with AND semantics.

## Architecture

```text
catalog JSON ──> Product list ──┐
                                ├─> StrategyRegistry (one predicate per facet)
FilterState ────────────────────┤       └─> SearchIndexCache (free-text only)
                                └─> filtered list ──> HistoryTracker (1500 ms)
keystrokes ──> FilterDrafts (300 ms) ──> FilterStore mutators
```

`FilterStore` is the synchronous core. `FilterSession` runs it on a tokio task
and drives the debounced drafts and history from the runtime clock.

## Example

```rust,no_run
use pastillas_search::{EngineConfig, FilterStore, load_products};
use std::path::Path;

fn main() -> pastillas_search::Result<()> {
    let catalog = load_products(Path::new("catalog.json"))?;
    let mut store = FilterStore::new(EngineConfig::default());
    store.set_products(catalog.products);
    store.set_selected_brand("toyota");
    for product in store.filtered() {
        println!("{} {}", product.id, product.application_summary());
    }
    Ok(())
}
```
*/

pub mod catalog;
pub mod config;
pub mod debounce;
pub mod drafts;
pub mod error;
pub mod evaluator;
pub mod facets;
pub mod filters;
pub mod history;
pub mod index_cache;
pub mod model;
pub mod session;
pub mod store;
pub mod strategy;
pub mod text;

pub use catalog::{CatalogLoad, load_products, parse_products};
pub use config::{EngineConfig, SortOrder};
pub use debounce::Debouncer;
pub use drafts::FilterDrafts;
pub use error::{CatalogError, Result};
pub use evaluator::evaluate;
pub use facets::{FacetBucket, FacetOptions, FacetSelection, derive_facets};
pub use filters::{FacetKey, FilterState, FilterValue, TextFacet};
pub use history::{HistoryTracker, SearchHistoryEntry, summarize};
pub use index_cache::{SearchIndexCache, build_searchable_text};
pub use model::{Dimensions, Fitment, Position, PositionSet, Product};
pub use session::{FilterSession, SessionCommand, SessionHandle, SessionSnapshot};
pub use store::FilterStore;
pub use strategy::{FilterContext, Strategy, StrategyRegistry};
pub use text::normalize;
