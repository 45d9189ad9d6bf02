//! Single-flight query cache.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::FetchResult;
use crate::domain::ports::{PropertyCollection, PropertyCollectionError};
use crate::domain::query::{CompiledQuery, compile, validate_filters};
use crate::domain::{Error, FilterState};

fn map_collection_error(error: PropertyCollectionError) -> Error {
    Error::query_failure(format!("property query failed: {error}"))
}

struct CacheEntry {
    request: u64,
    status: watch::Sender<FetchResult>,
}

struct Shared<C> {
    collection: Arc<C>,
    entries: Mutex<HashMap<CompiledQuery, CacheEntry>>,
    next_request: AtomicU64,
}

impl<C> Shared<C> {
    fn entries(&self) -> MutexGuard<'_, HashMap<CompiledQuery, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn complete(&self, query: &CompiledQuery, request: u64, result: FetchResult) {
        let entries = self.entries();
        match entries.get(query) {
            Some(entry) if entry.request == request => {
                entry.status.send_replace(result);
            }
            Some(_) => {
                warn!(
                    fingerprint = %query.fingerprint(),
                    request,
                    "discarding completion of a superseded request"
                );
            }
            None => {
                debug!(
                    fingerprint = %query.fingerprint(),
                    request,
                    "discarding completion for an evicted entry"
                );
            }
        }
    }
}

/// Deduplicating cache of remote queries keyed by compiled query identity.
///
/// At most one remote call per distinct query is in flight at any time.
/// Settled results stay cached until [`evict`](Self::evict) removes them;
/// failed entries are re-issued on the next explicit request, never retried
/// automatically.
///
/// Remote calls run on the ambient Tokio runtime. Cloning the coordinator
/// shares the same cache.
pub struct FetchCoordinator<C> {
    shared: Arc<Shared<C>>,
}

impl<C> Clone for FetchCoordinator<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C> FetchCoordinator<C> {
    /// Create an empty cache over `collection`.
    pub fn new(collection: Arc<C>) -> Self {
        Self {
            shared: Arc::new(Shared {
                collection,
                entries: Mutex::new(HashMap::new()),
                next_request: AtomicU64::new(1),
            }),
        }
    }

    /// Drop the entry for `filters`, returning whether one existed.
    ///
    /// Subscribers of the dropped entry observe their subscription closing;
    /// an in-flight call is left to finish and its result discarded.
    pub fn evict(&self, filters: &FilterState) -> bool {
        let query = compile(filters);
        let removed = self.shared.entries().remove(&query).is_some();
        if removed {
            debug!(fingerprint = %query.fingerprint(), "evicted cache entry");
        }
        removed
    }

    /// Number of cached entries, in flight or settled.
    pub fn len(&self) -> usize {
        self.shared.entries().len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.shared.entries().is_empty()
    }
}

impl<C> FetchCoordinator<C>
where
    C: PropertyCollection + 'static,
{
    /// Attach to the entry for `filters`, issuing a remote call when needed.
    ///
    /// Loading and successful entries are shared as they are. A missing or
    /// failed entry moves to `Loading` and a new call is issued. Filters with
    /// an inverted range settle immediately as `InvalidRequest` without
    /// touching the collection.
    pub fn subscribe(&self, filters: &FilterState) -> FetchSubscription {
        self.attach(filters, false)
    }

    /// Like [`subscribe`](Self::subscribe), but also re-issues a successful
    /// entry. An in-flight entry is still shared.
    pub fn refresh(&self, filters: &FilterState) -> FetchSubscription {
        self.attach(filters, true)
    }

    /// Fetch the listings for `filters` and wait for the settled result.
    pub async fn fetch(&self, filters: &FilterState) -> FetchResult {
        self.subscribe(filters).settled().await
    }

    fn attach(&self, filters: &FilterState, force: bool) -> FetchSubscription {
        let query = compile(filters);
        let fingerprint = query.fingerprint();
        let mut entries = self.shared.entries();

        if let Some(entry) = entries.get(&query) {
            let reusable = match &*entry.status.borrow() {
                FetchResult::Loading => true,
                FetchResult::Success(_) => !force,
                FetchResult::Error(_) => false,
            };
            if reusable {
                debug!(%fingerprint, "fetch cache hit");
                return FetchSubscription::new(query.clone(), entry.status.subscribe());
            }
        }

        if let Err(invalid) = validate_filters(filters) {
            debug!(%fingerprint, error = %invalid, "rejecting invalid filters");
            let receiver = Self::store(&mut entries, &query, 0, FetchResult::Error(invalid.into()));
            return FetchSubscription::new(query, receiver);
        }

        let request = self.shared.next_request.fetch_add(1, Ordering::Relaxed);
        let receiver = Self::store(&mut entries, &query, request, FetchResult::Loading);
        drop(entries);

        debug!(%fingerprint, request, "fetch cache miss");
        self.issue(query.clone(), request, fingerprint);
        FetchSubscription::new(query, receiver)
    }

    fn store(
        entries: &mut HashMap<CompiledQuery, CacheEntry>,
        query: &CompiledQuery,
        request: u64,
        status: FetchResult,
    ) -> watch::Receiver<FetchResult> {
        match entries.entry(query.clone()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.request = request;
                entry.status.send_replace(status);
                entry.status.subscribe()
            }
            Entry::Vacant(vacant) => {
                let (sender, receiver) = watch::channel(status);
                vacant.insert(CacheEntry {
                    request,
                    status: sender,
                });
                receiver
            }
        }
    }

    fn issue(&self, query: CompiledQuery, request: u64, fingerprint: String) {
        let Ok(handle) = Handle::try_current() else {
            self.shared.complete(
                &query,
                request,
                FetchResult::Error(Error::internal("no async runtime available to run the query")),
            );
            return;
        };

        let shared = Arc::clone(&self.shared);
        handle.spawn(async move {
            info!(%fingerprint, request, "issuing property query");
            let result = match shared.collection.query(&query).await {
                Ok(properties) => FetchResult::Success(Arc::new(properties)),
                Err(error) => {
                    warn!(%fingerprint, request, %error, "property query failed");
                    FetchResult::Error(map_collection_error(error))
                }
            };
            shared.complete(&query, request, result);
        });
    }
}

/// A caller's view of one cache entry.
///
/// Dropping the subscription only ends this caller's interest; the shared
/// remote call keeps running for other subscribers.
#[derive(Debug)]
pub struct FetchSubscription {
    query: CompiledQuery,
    receiver: watch::Receiver<FetchResult>,
}

impl FetchSubscription {
    fn new(query: CompiledQuery, receiver: watch::Receiver<FetchResult>) -> Self {
        Self { query, receiver }
    }

    /// The compiled query this subscription follows.
    pub fn query(&self) -> &CompiledQuery {
        &self.query
    }

    /// Latest status of the entry.
    pub fn current(&self) -> FetchResult {
        self.receiver.borrow().clone()
    }

    /// Wait for the next status transition.
    ///
    /// Returns `None` once the entry has been evicted.
    pub async fn changed(&mut self) -> Option<FetchResult> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Wait until the entry leaves `Loading`.
    ///
    /// An entry evicted before settling yields an `InternalError`.
    pub async fn settled(mut self) -> FetchResult {
        match self.receiver.wait_for(FetchResult::is_settled).await {
            Ok(status) => status.clone(),
            Err(_) => FetchResult::Error(Error::internal(
                "fetch entry was evicted before the query completed",
            )),
        }
    }
}
