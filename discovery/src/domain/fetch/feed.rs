//! Per-view result stream with last-request-wins semantics.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{FetchCoordinator, FetchResult};
use crate::domain::ports::PropertyCollection;
use crate::domain::{FilterState, Property};

/// How the listing page presents results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Pins on a map.
    Map,
    /// Cards in a grid.
    #[default]
    List,
}

impl DisplayMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Map => Self::List,
            Self::List => Self::Map,
        }
    }
}

struct FeedUpdate {
    generation: u64,
    result: Option<FetchResult>,
}

/// Results for whichever filter state a view is currently showing.
///
/// Each [`set_filters`](Self::set_filters) starts a new generation. Updates
/// are tagged with the generation that requested them, and [`next`](Self::next)
/// drops any whose tag is no longer current, so a slow answer for old filters
/// can never overwrite the answer for new ones.
///
/// Map and list presentations read the same shared result; switching between
/// them never triggers a fetch.
pub struct ResultsFeed<C> {
    coordinator: FetchCoordinator<C>,
    generation: u64,
    mode: DisplayMode,
    current: FetchResult,
    forwarder: Option<JoinHandle<()>>,
    sender: mpsc::UnboundedSender<FeedUpdate>,
    receiver: mpsc::UnboundedReceiver<FeedUpdate>,
}

impl<C> ResultsFeed<C>
where
    C: PropertyCollection + 'static,
{
    /// Create an idle feed over a shared coordinator.
    pub fn new(coordinator: FetchCoordinator<C>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            coordinator,
            generation: 0,
            mode: DisplayMode::default(),
            current: FetchResult::Loading,
            forwarder: None,
            sender,
            receiver,
        }
    }

    /// Follow `filters` from now on and return the new generation token.
    ///
    /// Interest in the previous filter state ends immediately. Its remote
    /// call, if still running, is not cancelled.
    pub fn set_filters(&mut self, filters: &FilterState) -> u64 {
        if let Some(previous) = self.forwarder.take() {
            previous.abort();
        }
        self.generation += 1;
        let generation = self.generation;

        let mut subscription = self.coordinator.subscribe(filters);
        self.current = subscription.current();

        let Ok(handle) = Handle::try_current() else {
            warn!(generation, "no async runtime; feed will not observe updates");
            return generation;
        };
        let sender = self.sender.clone();
        self.forwarder = Some(handle.spawn(async move {
            loop {
                let result = subscription.changed().await;
                let closed = result.is_none();
                if sender.send(FeedUpdate { generation, result }).is_err() || closed {
                    break;
                }
            }
        }));
        generation
    }

    /// Wait for the next update belonging to the current generation.
    ///
    /// Returns `None` when no filters have been set or the followed entry
    /// was evicted.
    pub async fn next(&mut self) -> Option<FetchResult> {
        if self.generation == 0 {
            return None;
        }
        loop {
            let update = self.receiver.recv().await?;
            if update.generation != self.generation {
                debug!(
                    stale = update.generation,
                    current = self.generation,
                    "dropping stale feed update"
                );
                continue;
            }
            let result = update.result?;
            self.current = result.clone();
            return Some(result);
        }
    }

    /// Wait until the current generation has settled.
    pub async fn settled(&mut self) -> Option<FetchResult> {
        while !self.current.is_settled() {
            self.next().await?;
        }
        Some(self.current.clone())
    }

    /// Current generation token; zero before any filters are set.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Latest result delivered for the current generation.
    pub fn current(&self) -> &FetchResult {
        &self.current
    }

    /// Active presentation.
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Switch presentation without fetching.
    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
    }

    /// Flip between map and list and return the new mode.
    pub fn toggle_mode(&mut self) -> DisplayMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    /// Listings as the active presentation should show them.
    pub fn visible(&self) -> Option<Arc<Vec<Property>>> {
        self.current.data().cloned()
    }
}

impl<C> Drop for ResultsFeed<C> {
    fn drop(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
    }
}
