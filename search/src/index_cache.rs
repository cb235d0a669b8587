use crate::model::Product;
use crate::text::normalize;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::Weak;
use tracing::trace;

pub const DEFAULT_INDEX_CAPACITY: usize = 4096;

/// Flattened, normalized text used for free-text matching, in fixed order:
/// reference, alternate refs, OEM, FMSI, WVA, manufacturer, then brand,
/// model, series and year of every fitment.
pub fn build_searchable_text(product: &Product) -> String {
    let mut parts: Vec<&str> = Vec::new();
    parts.extend(product.reference.as_deref());
    parts.extend(product.references.iter().map(String::as_str));
    parts.extend(product.oem.iter().map(String::as_str));
    parts.extend(product.fmsi.iter().map(String::as_str));
    parts.extend(product.wva.as_deref());
    parts.extend(product.manufacturer.as_deref());
    for fitment in &product.applications {
        parts.extend(fitment.brand.as_deref());
        parts.extend(fitment.model.as_deref());
        parts.extend(fitment.series.as_deref());
        parts.extend(fitment.year.as_deref());
    }
    normalize(&parts.join(" "))
}

/// Side table of searchable text keyed by product identity.
///
/// Each entry holds a `Weak` to its product, which keeps the allocation (and
/// therefore the address used as key) reserved until the entry is evicted or
/// pruned. A reloaded catalog gets fresh allocations and fresh entries.
pub struct SearchIndexCache {
    entries: Mutex<LruCache<usize, CachedIndex>>,
}

struct CachedIndex {
    owner: Weak<Product>,
    text: Arc<str>,
}

impl SearchIndexCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn searchable_text(&self, product: &Arc<Product>) -> Arc<str> {
        let key = identity(product);
        if let Some(entry) = self.lock().get(&key) {
            return Arc::clone(&entry.text);
        }
        let text: Arc<str> = Arc::from(build_searchable_text(product));
        self.lock().put(
            key,
            CachedIndex {
                owner: Arc::downgrade(product),
                text: Arc::clone(&text),
            },
        );
        text
    }

    /// Drops entries whose product is no longer referenced anywhere.
    pub fn prune(&self) -> usize {
        let mut guard = self.lock();
        let dead: Vec<usize> = guard
            .iter()
            .filter(|(_, entry)| entry.owner.strong_count() == 0)
            .map(|(key, _)| *key)
            .collect();
        for key in &dead {
            guard.pop(key);
        }
        if !dead.is_empty() {
            trace!(pruned = dead.len(), "dropped stale searchable index entries");
        }
        dead.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, product: &Arc<Product>) -> bool {
        self.lock().contains(&identity(product))
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<usize, CachedIndex>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for SearchIndexCache {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_CAPACITY)
    }
}

fn identity(product: &Arc<Product>) -> usize {
    Arc::as_ptr(product) as usize
}
