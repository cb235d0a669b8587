//! Async driver for a [`FilterStore`].
//!
//! One task owns the store, the input drafts and the history tracker, so all
//! state changes are serialized without locks. The task sleeps until the
//! earliest pending debounce deadline, a command arrives, or the session is
//! shut down. Shutdown discards every pending commit.

use crate::config::EngineConfig;
use crate::drafts::FilterDrafts;
use crate::facets::FacetOptions;
use crate::filters::FilterState;
use crate::filters::TextFacet;
use crate::history::HistoryTracker;
use crate::history::SearchHistoryEntry;
use crate::model::Position;
use crate::model::Product;
use crate::store::FilterStore;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio::time::sleep_until;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;

#[derive(Debug)]
pub enum SessionCommand {
    Input { facet: TextFacet, text: String },
    TogglePosition(Position),
    ToggleFavoritesOnly,
    ClearFilters,
    SetProducts(Vec<Arc<Product>>),
    SetFavorites(Vec<String>),
    ToggleFavorite(String),
    ToggleComparison(String),
    Snapshot(oneshot::Sender<SessionSnapshot>),
}

/// Point-in-time view of everything a display needs.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub filters: FilterState,
    pub result_ids: Vec<String>,
    pub facets: FacetOptions,
    pub favorites_count: usize,
    pub comparisons_count: usize,
    pub total_applications: usize,
    /// Newest first.
    pub history: Vec<SearchHistoryEntry>,
}

pub struct FilterSession {
    store: FilterStore,
    drafts: FilterDrafts,
    history: HistoryTracker,
}

impl FilterSession {
    pub fn new(store: FilterStore) -> Self {
        let config: &EngineConfig = store.config();
        let drafts = FilterDrafts::new(config.commit_debounce());
        let history = HistoryTracker::new(config.history_debounce());
        Self {
            store,
            drafts,
            history,
        }
    }

    pub fn store(&self) -> &FilterStore {
        &self.store
    }

    pub fn drafts(&self) -> &FilterDrafts {
        &self.drafts
    }

    pub fn history(&self) -> &HistoryTracker {
        &self.history
    }

    /// Moves the session onto its own task.
    pub fn spawn(self) -> SessionHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(self.run(rx, shutdown.clone()));
        SessionHandle {
            tx,
            shutdown,
            task: Some(task),
        }
    }

    async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<SessionCommand>,
        shutdown: CancellationToken,
    ) -> FilterSession {
        loop {
            let deadline = self.next_deadline();
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                command = rx.recv() => match command {
                    Some(command) => self.handle(command, Instant::now()),
                    None => break,
                },
                _ = sleep_until_deadline(deadline) => self.fire(Instant::now()),
            }
        }
        self.teardown();
        self
    }

    pub fn handle(&mut self, command: SessionCommand, now: Instant) {
        let changed = match command {
            SessionCommand::Input { facet, text } => {
                self.drafts.input(facet, &text, now);
                false
            }
            SessionCommand::TogglePosition(position) => self.store.toggle_position(position),
            SessionCommand::ToggleFavoritesOnly => self.store.toggle_show_favorites_only(),
            SessionCommand::ClearFilters => {
                let changed = self.store.clear_filters();
                self.drafts.cancel_all();
                self.drafts.sync_from(self.store.filters());
                changed
            }
            SessionCommand::SetProducts(products) => {
                self.store.set_products(products);
                true
            }
            SessionCommand::SetFavorites(ids) => {
                self.store.set_favorites(ids);
                false
            }
            SessionCommand::ToggleFavorite(id) => {
                self.store.toggle_favorite(&id);
                false
            }
            SessionCommand::ToggleComparison(id) => {
                self.store.toggle_comparison(&id);
                false
            }
            SessionCommand::Snapshot(reply) => {
                if reply.send(self.snapshot()).is_err() {
                    trace!("snapshot requester went away");
                }
                false
            }
        };
        if changed {
            self.observe(now);
        }
    }

    /// Commits every history snapshot and draft that is due at `now`. History
    /// goes first so a late wake-up cannot let a draft re-arm a snapshot that
    /// was already due.
    pub fn fire(&mut self, now: Instant) {
        self.history.poll(now, self.store.result_count());
        if !self.drafts.poll(now, &mut self.store).is_empty() {
            self.observe(now);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.drafts.next_deadline(), self.history.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            filters: self.store.filters().clone(),
            result_ids: self
                .store
                .filtered()
                .iter()
                .map(|product| product.id.clone())
                .collect(),
            facets: self.store.facet_options(),
            favorites_count: self.store.favorites_count(),
            comparisons_count: self.store.comparisons_count(),
            total_applications: self.store.total_applications(),
            history: self.history.entries().cloned().collect(),
        }
    }

    fn observe(&mut self, now: Instant) {
        self.history.observe(self.store.filters(), now);
    }

    fn teardown(&mut self) {
        let drafts = self.drafts.cancel_all();
        let history = usize::from(self.history.cancel());
        debug!(drafts, history, "filter session stopped; discarded pending commits");
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

/// Owner-side end of a running session. Dropping it stops the session.
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionCommand>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<FilterSession>>,
}

impl SessionHandle {
    /// Returns `false` once the session has stopped.
    pub fn send(&self, command: SessionCommand) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn input(&self, facet: TextFacet, text: impl Into<String>) -> bool {
        self.send(SessionCommand::Input {
            facet,
            text: text.into(),
        })
    }

    pub fn toggle_position(&self, position: Position) -> bool {
        self.send(SessionCommand::TogglePosition(position))
    }

    pub fn toggle_favorites_only(&self) -> bool {
        self.send(SessionCommand::ToggleFavoritesOnly)
    }

    pub fn clear_filters(&self) -> bool {
        self.send(SessionCommand::ClearFilters)
    }

    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let (reply, response) = oneshot::channel();
        if !self.send(SessionCommand::Snapshot(reply)) {
            return None;
        }
        response.await.ok()
    }

    /// Stops the session, discarding pending commits, and hands back its
    /// final state.
    pub async fn shutdown(mut self) -> Option<FilterSession> {
        self.shutdown.cancel();
        let task = self.task.take()?;
        task.await.ok()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
