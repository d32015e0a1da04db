use super::*;
use crate::state::test_helpers::{GatedSource, ScriptedSource, message, server_error, until};

fn coordinator(ordering: FetchOrdering, source: Arc<dyn RecordSource>) -> (Store, ListFetchCoordinator) {
    let store = Store::new(ordering);
    (store.clone(), ListFetchCoordinator::new(store, source))
}

fn ids(records: &[Message]) -> Vec<i64> {
    records.iter().map(|m| m.message_id.0).collect()
}

// =============================================================
// ListFetchState
// =============================================================

#[test]
fn list_fetch_state_defaults() {
    let s = ListFetchState::default();
    assert!(!s.loading());
    assert!(s.error().is_none());
    assert_eq!(s.ordering(), FetchOrdering::LastResolvedWins);
    assert_eq!(s.latest_ticket(), FetchTicket(0));
}

#[test]
fn loading_tracks_every_outstanding_fetch() {
    let mut s = ListFetchState::default();
    s.start();
    s.start();
    s.settle();
    assert!(s.loading());
    s.settle();
    assert!(!s.loading());
    s.settle();
    assert_eq!(s.pending(), 0);
}

// =============================================================
// fetch_list
// =============================================================

#[tokio::test]
async fn successful_fetch_replaces_records() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(vec![message(1, 7), message(2, 8), message(3, 7)])]));
    let (store, lists) = coordinator(FetchOrdering::default(), source.clone());

    lists.fetch_list(ListQuery::unfiltered()).await;

    let state = store.snapshot();
    assert_eq!(ids(state.records()), vec![1, 2, 3]);
    assert!(!state.loading());
    assert!(state.error().is_none());
}

#[tokio::test]
async fn empty_result_is_zero_records_not_error() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(vec![message(1, 7)]), Ok(Vec::new())]));
    let (store, lists) = coordinator(FetchOrdering::default(), source);

    lists.fetch_list(ListQuery::unfiltered()).await;
    lists.fetch_list(ListQuery::for_physician("99")).await;

    let state = store.snapshot();
    assert!(state.records().is_empty());
    assert!(!state.loading());
    assert!(state.error().is_none());
}

#[tokio::test]
async fn failed_fetch_preserves_prior_records() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(vec![message(1, 7), message(2, 7)]), Err(server_error())]));
    let (store, lists) = coordinator(FetchOrdering::default(), source);

    lists.fetch_list(ListQuery::unfiltered()).await;
    lists.fetch_list(ListQuery::for_physician("7")).await;

    let state = store.snapshot();
    assert_eq!(ids(state.records()), vec![1, 2]);
    assert!(!state.loading());
    let error = state.error().unwrap();
    assert!(error.starts_with("Failed to fetch messages"));
    assert!(error.contains("500"));
}

#[tokio::test]
async fn loading_is_true_while_fetch_outstanding() {
    let source = Arc::new(GatedSource::default());
    let (store, lists) = coordinator(FetchOrdering::default(), source.clone());

    let handle = tokio::spawn(async move { lists.fetch_list(ListQuery::unfiltered()).await });
    until(|| source.call_count() == 1).await;
    assert!(store.snapshot().loading());

    source.resolve(0, Ok(vec![message(1, 7)]));
    handle.await.unwrap();
    assert!(!store.snapshot().loading());
}

#[tokio::test]
async fn last_resolved_wins_by_default() {
    let source = Arc::new(GatedSource::default());
    let (store, lists) = coordinator(FetchOrdering::LastResolvedWins, source.clone());

    let a = {
        let lists = lists.clone();
        tokio::spawn(async move { lists.fetch_list(ListQuery::for_physician("A")).await })
    };
    until(|| source.call_count() == 1).await;
    let b = tokio::spawn(async move { lists.fetch_list(ListQuery::for_physician("B")).await });
    until(|| source.call_count() == 2).await;
    assert_eq!(source.queries()[1], ListQuery::for_physician("B"));

    source.resolve(1, Ok(vec![message(20, 2)]));
    b.await.unwrap();
    let state = store.snapshot();
    assert_eq!(ids(state.records()), vec![20]);
    assert!(state.loading());

    source.resolve(0, Ok(vec![message(10, 1), message(11, 1)]));
    a.await.unwrap();
    let state = store.snapshot();
    assert_eq!(ids(state.records()), vec![10, 11]);
    assert!(!state.loading());
}

#[tokio::test]
async fn latest_request_wins_discards_superseded_result() {
    let source = Arc::new(GatedSource::default());
    let (store, lists) = coordinator(FetchOrdering::LatestRequestWins, source.clone());

    let a = {
        let lists = lists.clone();
        tokio::spawn(async move { lists.fetch_list(ListQuery::for_physician("A")).await })
    };
    until(|| source.call_count() == 1).await;
    let b = tokio::spawn(async move { lists.fetch_list(ListQuery::for_physician("B")).await });
    until(|| source.call_count() == 2).await;

    source.resolve(1, Ok(vec![message(20, 2)]));
    b.await.unwrap();
    source.resolve(0, Err(server_error()));
    a.await.unwrap();

    let state = store.snapshot();
    assert_eq!(ids(state.records()), vec![20]);
    assert!(state.error().is_none());
    assert!(!state.loading());
}

#[tokio::test]
async fn later_success_clears_error_from_earlier_resolution() {
    let source = Arc::new(GatedSource::default());
    let (store, lists) = coordinator(FetchOrdering::LastResolvedWins, source.clone());

    let a = {
        let lists = lists.clone();
        tokio::spawn(async move { lists.fetch_list(ListQuery::unfiltered()).await })
    };
    until(|| source.call_count() == 1).await;
    let b = tokio::spawn(async move { lists.fetch_list(ListQuery::unfiltered()).await });
    until(|| source.call_count() == 2).await;

    source.resolve(1, Err(server_error()));
    b.await.unwrap();
    assert!(store.snapshot().error().is_some());

    source.resolve(0, Ok(vec![message(1, 1)]));
    a.await.unwrap();
    let state = store.snapshot();
    assert!(state.error().is_none());
    assert_eq!(ids(state.records()), vec![1]);
}

#[tokio::test]
async fn aborted_fetch_still_clears_loading() {
    let source = Arc::new(GatedSource::default());
    let (store, lists) = coordinator(FetchOrdering::default(), source.clone());

    let handle = tokio::spawn(async move { lists.fetch_list(ListQuery::unfiltered()).await });
    until(|| source.call_count() == 1).await;
    assert!(store.snapshot().loading());

    handle.abort();
    assert!(handle.await.unwrap_err().is_cancelled());

    let state = store.snapshot();
    assert!(!state.loading());
    assert!(state.error().is_none());
}
