//! Keystroke-level text held outside the store.
//!
//! Each text facet owns an independent debounce channel, so typing in the
//! brand box never delays or cancels a pending width commit.

use crate::debounce::Debouncer;
use crate::filters::FilterState;
use crate::filters::TextFacet;
use crate::store::FilterStore;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

pub struct FilterDrafts {
    delay: Duration,
    text: HashMap<TextFacet, String>,
    channels: HashMap<TextFacet, Debouncer<String>>,
}

impl FilterDrafts {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            text: HashMap::new(),
            channels: HashMap::new(),
        }
    }

    /// Records the latest text for `facet` and restarts its quiet period.
    pub fn input(&mut self, facet: TextFacet, text: &str, now: Instant) {
        self.text.insert(facet, text.to_string());
        let delay = self.delay;
        self.channels
            .entry(facet)
            .or_insert_with(|| Debouncer::new(delay))
            .schedule(text.to_string(), now);
    }

    /// What the user currently sees in the input for `facet`.
    pub fn draft(&self, facet: TextFacet) -> &str {
        self.text.get(&facet).map(String::as_str).unwrap_or_default()
    }

    pub fn is_pending(&self, facet: TextFacet) -> bool {
        self.channels
            .get(&facet)
            .is_some_and(Debouncer::is_pending)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.channels.values().filter_map(Debouncer::deadline).min()
    }

    /// Commits every draft whose quiet period has elapsed. Returns the facets
    /// whose commit changed the store.
    pub fn poll(&mut self, now: Instant, store: &mut FilterStore) -> Vec<TextFacet> {
        let mut changed = Vec::new();
        for facet in TextFacet::ALL {
            let Some(value) = self
                .channels
                .get_mut(&facet)
                .and_then(|channel| channel.poll(now))
            else {
                continue;
            };
            trace!(facet = %facet.key(), "committing draft");
            if store.set_text(facet, &value) {
                changed.push(facet);
            }
        }
        if !changed.is_empty() {
            self.sync_from(store.filters());
        }
        changed
    }

    /// Drops every pending commit. Returns how many were discarded.
    pub fn cancel_all(&mut self) -> usize {
        self.channels
            .values_mut()
            .filter_map(Debouncer::cancel)
            .count()
    }

    /// Mirrors committed values into the drafts of idle facets, e.g. after
    /// a clear or after a structured facet wiped the query.
    pub fn sync_from(&mut self, state: &FilterState) {
        for facet in TextFacet::ALL {
            if self.is_pending(facet) {
                continue;
            }
            self.text.insert(facet, state.text(facet).to_string());
        }
    }
}
