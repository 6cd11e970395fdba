use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc, watch};
use tokio::task::AbortHandle;

use crate::common::{FeedPage, FetchError, Post, PostId};

use super::FeedSource;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FeedPhase {
    #[default]
    Idle,
    Loading {
        page: u32,
    },
    /// The last fetch failed; the next trigger retries the same page.
    Failed(FetchError),
    /// An empty page was returned. No further fetches are issued.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState {
    pub items: Vec<Post>,
    pub next_page: u32,
    pub phase: FeedPhase,
}

impl FeedState {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            next_page: 1,
            phase: FeedPhase::Idle,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, FeedPhase::Loading { .. })
    }

    pub fn is_exhausted(&self) -> bool {
        self.phase == FeedPhase::Exhausted
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        match &self.phase {
            FeedPhase::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// What a load trigger did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Started { page: u32 },
    AlreadyLoading,
    Exhausted,
}

/// Result of applying a finished fetch to the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Merged { page: u32, added: usize },
    EndOfFeed { page: u32 },
    Failed(FetchError),
}

struct Completion {
    generation: u64,
    page: u32,
    result: Result<FeedPage, FetchError>,
}

/// Drives incremental loading of the feed.
///
/// Fetches run on spawned tasks and report back over a channel; the owner
/// applies them with [`PaginationController::next_completion`] or
/// [`PaginationController::poll_completions`]. At most one fetch is in flight
/// per controller: a fetch cancelled by [`PaginationController::reset`] holds
/// the fetch slot until it has unwound, and the next fetch waits for it.
pub struct PaginationController<S: FeedSource> {
    source: Arc<S>,
    page_size: u32,
    state: FeedState,
    seen: HashSet<PostId>,
    generation: u64,
    in_flight: Option<AbortHandle>,
    fetch_slot: Arc<Semaphore>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    updates: watch::Sender<FeedState>,
}

impl<S: FeedSource> PaginationController<S> {
    pub fn new(source: Arc<S>, page_size: u32) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (updates, _) = watch::channel(FeedState::new());
        Self {
            source,
            page_size,
            state: FeedState::new(),
            seen: HashSet::new(),
            generation: 0,
            in_flight: None,
            fetch_slot: Arc::new(Semaphore::new(1)),
            completion_tx,
            completion_rx,
            updates,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn items(&self) -> &[Post] {
        &self.state.items
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.updates.subscribe()
    }

    /// Starts fetching `next_page` unless a fetch is in flight or the feed ended.
    ///
    /// Must be called from within a tokio runtime.
    pub fn load_next(&mut self) -> Trigger {
        match self.state.phase {
            FeedPhase::Loading { .. } => {
                log::debug!("Ignoring load trigger; page fetch already in flight");
                return Trigger::AlreadyLoading;
            }
            FeedPhase::Exhausted => return Trigger::Exhausted,
            FeedPhase::Idle | FeedPhase::Failed(_) => {}
        }

        let page = self.state.next_page;
        let page_size = self.page_size;
        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let fetch_slot = Arc::clone(&self.fetch_slot);
        let completion_tx = self.completion_tx.clone();

        self.state.phase = FeedPhase::Loading { page };
        self.publish();
        log::debug!("Fetching feed page {page}");

        let task = tokio::spawn(async move {
            let Ok(_slot) = fetch_slot.acquire_owned().await else {
                return;
            };
            let result = source.fetch_page(page, page_size).await;
            let _ = completion_tx.send(Completion {
                generation,
                page,
                result,
            });
        });
        self.in_flight = Some(task.abort_handle());

        Trigger::Started { page }
    }

    /// Entry point for the view's "near the end of content" signal.
    pub fn on_proximity_crossed(&mut self) -> Trigger {
        self.load_next()
    }

    /// Waits for the in-flight fetch and applies it. Returns `None` when
    /// nothing is loading.
    pub async fn next_completion(&mut self) -> Option<PageOutcome> {
        while self.state.is_loading() {
            let completion = self.completion_rx.recv().await?;
            if let Some(outcome) = self.apply(completion) {
                return Some(outcome);
            }
        }
        None
    }

    /// Applies every fetch that already finished, without waiting.
    pub fn poll_completions(&mut self) -> Vec<PageOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(completion) = self.completion_rx.try_recv() {
            if let Some(outcome) = self.apply(completion) {
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    /// Empties the feed and starts over from page 1. A fetch in flight is
    /// cancelled; if it already finished, its result is discarded.
    pub fn reset(&mut self) {
        if let Some(task) = self.in_flight.take() {
            log::debug!("Cancelling in-flight page fetch");
            task.abort();
        }
        self.source.invalidate();
        self.generation += 1;
        self.state = FeedState::new();
        self.seen.clear();
        self.publish();
    }

    fn apply(&mut self, completion: Completion) -> Option<PageOutcome> {
        if completion.generation != self.generation {
            log::debug!("Discarding page {} from before reset", completion.page);
            return None;
        }

        self.in_flight = None;
        let page = completion.page;
        if completion.result.is_ok() {
            self.source.forget_page(page, self.page_size);
        }
        let outcome = match completion.result {
            Ok(feed_page) if feed_page.items.is_empty() => {
                log::info!("Feed exhausted at page {page}");
                self.state.phase = FeedPhase::Exhausted;
                PageOutcome::EndOfFeed { page }
            }
            Ok(feed_page) => {
                let added = self.merge(feed_page.items);
                self.state.next_page += 1;
                self.state.phase = FeedPhase::Idle;
                log::debug!("Merged page {page}: {added} new posts");
                PageOutcome::Merged { page, added }
            }
            Err(err) => {
                log::warn!("{err}");
                self.state.phase = FeedPhase::Failed(err.clone());
                PageOutcome::Failed(err)
            }
        };

        self.publish();
        Some(outcome)
    }

    fn merge(&mut self, items: Vec<Post>) -> usize {
        let before = self.state.items.len();
        for post in items {
            if self.seen.insert(post.id) {
                self.state.items.push(post);
            }
        }
        self.state.items.len() - before
    }

    fn publish(&self) {
        self.updates.send_replace(self.state.clone());
    }
}

impl<S: FeedSource> Drop for PaginationController<S> {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}
