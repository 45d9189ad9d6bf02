//! Tests for the fetch coordinator and results feed.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rstest::{fixture, rstest};
use tokio::sync::oneshot;

use super::*;
use crate::domain::ports::{PropertyCollection, PropertyCollectionError};
use crate::domain::query::CompiledQuery;
use crate::domain::{ErrorCode, FilterPatch, FilterState, NewListing, PropertyId};

type Reply = Result<Vec<Property>, PropertyCollectionError>;

/// Collection whose answers are released by the test, one per call.
#[derive(Default)]
struct ScriptedCollection {
    calls: AtomicUsize,
    finished: AtomicUsize,
    replies: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
}

impl ScriptedCollection {
    fn expect_call(&self) -> oneshot::Sender<Reply> {
        let (sender, receiver) = oneshot::channel();
        self.replies
            .lock()
            .expect("replies lock")
            .push_back(receiver);
        sender
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PropertyCollection for ScriptedCollection {
    async fn query(&self, _query: &CompiledQuery) -> Result<Vec<Property>, PropertyCollectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .expect("unexpected query");
        let outcome = reply
            .await
            .unwrap_or_else(|_| Err(PropertyCollectionError::connection("reply dropped")));
        self.finished.fetch_add(1, Ordering::SeqCst);
        outcome
    }

    async fn find_by_id(
        &self,
        _id: &PropertyId,
    ) -> Result<Option<Property>, PropertyCollectionError> {
        Ok(None)
    }

    async fn insert(&self, listing: &NewListing) -> Result<Property, PropertyCollectionError> {
        Ok(listing.clone().into_property(PropertyId::random()))
    }
}

fn listing(title: &str) -> Property {
    Property::new(PropertyId::random(), title, 1_000_000, "Miami")
}

async fn until(mut condition: impl FnMut() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

#[fixture]
fn collection() -> Arc<ScriptedCollection> {
    Arc::new(ScriptedCollection::default())
}

#[fixture]
fn miami() -> FilterState {
    FilterPatch::default().city("Miami").apply_to(&FilterState::default())
}

#[rstest]
#[tokio::test]
async fn concurrent_identical_fetches_issue_one_call(
    collection: Arc<ScriptedCollection>,
    miami: FilterState,
) {
    let reply = collection.expect_call();
    let coordinator = FetchCoordinator::new(Arc::clone(&collection));

    let first = coordinator.subscribe(&miami);
    let second = coordinator.subscribe(&miami);
    assert_eq!(first.current(), FetchResult::Loading);
    reply.send(Ok(vec![listing("Villa")])).expect("reply delivered");

    let (a, b) = tokio::join!(first.settled(), second.settled());
    assert_eq!(collection.calls(), 1);
    let (a, b) = (a.data().cloned(), b.data().cloned());
    let (a, b) = (a.expect("first succeeds"), b.expect("second succeeds"));
    assert!(Arc::ptr_eq(&a, &b));
}

#[rstest]
#[tokio::test]
async fn settled_success_is_served_from_cache(
    collection: Arc<ScriptedCollection>,
    miami: FilterState,
) {
    collection
        .expect_call()
        .send(Ok(vec![listing("Villa")]))
        .expect("reply delivered");
    let coordinator = FetchCoordinator::new(Arc::clone(&collection));

    let first = coordinator.fetch(&miami).await;
    let second = coordinator.fetch(&miami).await;

    assert_eq!(collection.calls(), 1);
    assert_eq!(first, second);
    assert_eq!(coordinator.len(), 1);
}

#[rstest]
#[tokio::test]
async fn distinct_filters_get_distinct_entries(
    collection: Arc<ScriptedCollection>,
    miami: FilterState,
) {
    collection
        .expect_call()
        .send(Ok(Vec::new()))
        .expect("reply delivered");
    collection
        .expect_call()
        .send(Ok(Vec::new()))
        .expect("reply delivered");
    let coordinator = FetchCoordinator::new(Arc::clone(&collection));

    coordinator.fetch(&miami).await;
    coordinator.fetch(&FilterState::default()).await;

    assert_eq!(collection.calls(), 2);
    assert_eq!(coordinator.len(), 2);
}

#[rstest]
#[tokio::test]
async fn failures_surface_as_query_failure_without_retry(
    collection: Arc<ScriptedCollection>,
    miami: FilterState,
) {
    collection
        .expect_call()
        .send(Err(PropertyCollectionError::query("boom")))
        .expect("reply delivered");
    let coordinator = FetchCoordinator::new(Arc::clone(&collection));

    let result = coordinator.fetch(&miami).await;
    assert_eq!(
        result.error().map(crate::domain::Error::code),
        Some(ErrorCode::QueryFailure)
    );
    until(|| collection.finished() == 1).await;
    assert_eq!(collection.calls(), 1);

    collection
        .expect_call()
        .send(Ok(vec![listing("Villa")]))
        .expect("reply delivered");
    let retried = coordinator.fetch(&miami).await;
    assert_eq!(collection.calls(), 2);
    assert!(retried.data().is_some());
}

#[rstest]
#[tokio::test]
async fn invalid_filters_settle_without_remote_call(collection: Arc<ScriptedCollection>) {
    let coordinator = FetchCoordinator::new(Arc::clone(&collection));
    let filters = FilterPatch::default()
        .price(10, 1)
        .apply_to(&FilterState::default());

    let result = coordinator.fetch(&filters).await;

    assert_eq!(
        result.error().map(crate::domain::Error::code),
        Some(ErrorCode::InvalidRequest)
    );
    assert_eq!(collection.calls(), 0);
}

#[rstest]
#[tokio::test]
async fn refresh_reissues_settled_entry_and_shares_in_flight_one(
    collection: Arc<ScriptedCollection>,
    miami: FilterState,
) {
    collection
        .expect_call()
        .send(Ok(vec![listing("Old")]))
        .expect("reply delivered");
    let coordinator = FetchCoordinator::new(Arc::clone(&collection));
    coordinator.fetch(&miami).await;

    let reply = collection.expect_call();
    let refreshed = coordinator.refresh(&miami);
    let again = coordinator.refresh(&miami);
    assert_eq!(refreshed.current(), FetchResult::Loading);
    reply
        .send(Ok(vec![listing("New")]))
        .expect("reply delivered");

    let result = refreshed.settled().await;
    assert_eq!(again.settled().await, result);
    assert_eq!(collection.calls(), 2);
    let titles: Vec<String> = result
        .data()
        .map(|data| data.iter().map(|p| p.title.clone()).collect())
        .unwrap_or_default();
    assert_eq!(titles, vec!["New".to_owned()]);
}

#[rstest]
#[tokio::test]
async fn superseded_completion_is_discarded(
    collection: Arc<ScriptedCollection>,
    miami: FilterState,
) {
    let stale_reply = collection.expect_call();
    let fresh_reply = collection.expect_call();
    let coordinator = FetchCoordinator::new(Arc::clone(&collection));

    let abandoned = coordinator.subscribe(&miami);
    until(|| collection.calls() == 1).await;
    assert!(coordinator.evict(&miami));
    let current = coordinator.subscribe(&miami);
    until(|| collection.calls() == 2).await;

    stale_reply
        .send(Ok(vec![listing("Stale")]))
        .expect("reply delivered");
    until(|| collection.finished() == 1).await;
    assert_eq!(current.current(), FetchResult::Loading);
    assert!(abandoned.settled().await.error().is_some());

    fresh_reply
        .send(Ok(vec![listing("Fresh")]))
        .expect("reply delivered");
    let result = current.settled().await;
    let titles: Vec<String> = result
        .data()
        .map(|data| data.iter().map(|p| p.title.clone()).collect())
        .unwrap_or_default();
    assert_eq!(titles, vec!["Fresh".to_owned()]);
}

#[rstest]
fn evict_and_len_track_entries(miami: FilterState) {
    let coordinator = FetchCoordinator::new(Arc::new(ScriptedCollection::default()));
    assert!(coordinator.is_empty());
    assert!(!coordinator.evict(&miami));
}

#[rstest]
fn subscribing_outside_a_runtime_reports_an_internal_error(
    collection: Arc<ScriptedCollection>,
    miami: FilterState,
) {
    let coordinator = FetchCoordinator::new(Arc::clone(&collection));
    let subscription = coordinator.subscribe(&miami);

    assert_eq!(
        subscription.current().error().map(crate::domain::Error::code),
        Some(ErrorCode::InternalError)
    );
    assert_eq!(collection.calls(), 0);
}

#[rstest]
#[tokio::test]
async fn feed_drops_results_from_previous_generation(
    collection: Arc<ScriptedCollection>,
    miami: FilterState,
) {
    let slow_reply = collection.expect_call();
    let fast_reply = collection.expect_call();
    let coordinator = FetchCoordinator::new(Arc::clone(&collection));
    let mut feed = ResultsFeed::new(coordinator);

    let first = feed.set_filters(&FilterState::default());
    until(|| collection.calls() == 1).await;
    let second = feed.set_filters(&miami);
    assert!(second > first);
    until(|| collection.calls() == 2).await;

    slow_reply
        .send(Ok(vec![listing("Everywhere")]))
        .expect("reply delivered");
    fast_reply
        .send(Ok(vec![listing("Miami")]))
        .expect("reply delivered");

    let result = feed.settled().await.expect("feed settles");
    let titles: Vec<String> = result
        .data()
        .map(|data| data.iter().map(|p| p.title.clone()).collect())
        .unwrap_or_default();
    assert_eq!(titles, vec!["Miami".to_owned()]);
    assert_eq!(feed.generation(), second);
}

#[rstest]
#[tokio::test]
async fn toggling_display_mode_reuses_the_same_result(
    collection: Arc<ScriptedCollection>,
    miami: FilterState,
) {
    collection
        .expect_call()
        .send(Ok(vec![listing("Villa")]))
        .expect("reply delivered");
    let mut feed = ResultsFeed::new(FetchCoordinator::new(Arc::clone(&collection)));
    feed.set_filters(&miami);
    feed.settled().await.expect("feed settles");

    assert_eq!(feed.mode(), DisplayMode::List);
    let list = feed.visible().expect("list data");
    assert_eq!(feed.toggle_mode(), DisplayMode::Map);
    let map = feed.visible().expect("map data");

    assert!(Arc::ptr_eq(&list, &map));
    assert_eq!(collection.calls(), 1);
}

#[rstest]
#[tokio::test]
async fn idle_feed_yields_nothing(collection: Arc<ScriptedCollection>) {
    let mut feed = ResultsFeed::new(FetchCoordinator::new(collection));
    assert_eq!(feed.generation(), 0);
    assert!(feed.next().await.is_none());
}
