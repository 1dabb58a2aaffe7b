//! Synchronization Flow Tests
//!
//! Runs `TodoSync` against an in-memory server wrapped with call
//! recording and failure injection.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use super::*;
use crate::domain::PrincipalId;
use crate::error::{StoreError, StoreResult};
use crate::repository::MemoryStore;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    List(Filters),
    Insert(Value),
    Update(Filters, Value),
    Delete(Filters),
}

/// Server truth lives in `inner`; calls are recorded and can be failed
struct FlakyStore {
    inner: MemoryStore,
    calls: RefCell<Vec<Call>>,
    scripted_lists: RefCell<VecDeque<StoreResult<Vec<Value>>>>,
    scripted_insert: RefCell<Option<Value>>,
    fail_list: Cell<bool>,
    fail_insert: Cell<bool>,
    fail_update: Cell<bool>,
    fail_delete: Cell<bool>,
}

fn backend_down() -> StoreError {
    StoreError::Backend { status: 503, message: "service unavailable".into() }
}

impl FlakyStore {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            inner: MemoryStore::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()),
            calls: RefCell::new(Vec::new()),
            scripted_lists: RefCell::new(VecDeque::new()),
            scripted_insert: RefCell::new(None),
            fail_list: Cell::new(false),
            fail_insert: Cell::new(false),
            fail_update: Cell::new(false),
            fail_delete: Cell::new(false),
        })
    }

    /// Seed server rows without recording calls
    async fn seed(&self, titles: &[&str]) {
        for title in titles {
            self.inner
                .insert(TODOS_TABLE, json!({ "title": title, "is_done": false }))
                .await
                .unwrap();
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn list_calls(&self) -> usize {
        self.calls.borrow().iter().filter(|c| matches!(c, Call::List(_))).count()
    }

    fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }
}

#[async_trait(?Send)]
impl RemoteStore for FlakyStore {
    async fn list(&self, table: &str, filters: &Filters, order: &OrderBy) -> StoreResult<Vec<Value>> {
        self.calls.borrow_mut().push(Call::List(filters.clone()));
        if let Some(scripted) = self.scripted_lists.borrow_mut().pop_front() {
            return scripted;
        }
        if self.fail_list.get() {
            return Err(backend_down());
        }
        self.inner.list(table, filters, order).await
    }

    async fn insert(&self, table: &str, row: Value) -> StoreResult<Value> {
        self.calls.borrow_mut().push(Call::Insert(row.clone()));
        if self.fail_insert.get() {
            return Err(backend_down());
        }
        if let Some(scripted) = self.scripted_insert.borrow_mut().take() {
            return Ok(scripted);
        }
        self.inner.insert(table, row).await
    }

    async fn update(&self, table: &str, filters: &Filters, patch: Value) -> StoreResult<()> {
        self.calls.borrow_mut().push(Call::Update(filters.clone(), patch.clone()));
        if self.fail_update.get() {
            return Err(backend_down());
        }
        self.inner.update(table, filters, patch).await
    }

    async fn delete(&self, table: &str, filters: &Filters) -> StoreResult<()> {
        self.calls.borrow_mut().push(Call::Delete(filters.clone()));
        if self.fail_delete.get() {
            return Err(backend_down());
        }
        self.inner.delete(table, filters).await
    }
}

fn row(id: i64, title: &str, is_done: bool, created_at: &str) -> Value {
    json!({ "id": id, "title": title, "is_done": is_done, "created_at": created_at })
}

fn ids(sync: &TodoSync) -> Vec<i64> {
    sync.snapshot().todos.iter().map(|t| t.id.0).collect()
}

/// Sync over a server holding `titles`, already listed
async fn loaded(titles: &[&str]) -> (Rc<FlakyStore>, TodoSync) {
    let store = FlakyStore::new();
    store.seed(titles).await;
    let sync = TodoSync::new(store.clone(), Scope::Everyone);
    sync.list().await.unwrap();
    store.clear_calls();
    (store, sync)
}

/// Every published snapshot, in order
fn record_snapshots(sync: &TodoSync) -> Rc<RefCell<Vec<SyncState>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    sync.set_observer(move |state| s.borrow_mut().push(state.clone()));
    seen.borrow_mut().clear();
    seen
}

// ========================
// List
// ========================

#[tokio::test]
async fn test_list_keeps_server_order_exactly() {
    let store = FlakyStore::new();
    // Deliberately not sorted by created_at: the client must not re-sort
    store.scripted_lists.borrow_mut().push_back(Ok(vec![
        row(3, "c", false, "2024-03-01T09:00:00Z"),
        row(1, "a", true, "2024-03-01T11:00:00Z"),
        row(2, "b", false, "2024-03-01T10:00:00Z"),
    ]));
    store.scripted_lists.borrow_mut().push_back(Ok(vec![row(2, "b", false, "2024-03-01T10:00:00Z")]));
    let sync = TodoSync::new(store.clone(), Scope::Everyone);

    sync.list().await.unwrap();
    assert_eq!(ids(&sync), vec![3, 1, 2]);

    sync.list().await.unwrap();
    assert_eq!(ids(&sync), vec![2]);
}

#[tokio::test]
async fn test_list_orders_newest_first_and_requests_descending() {
    let (_store, sync) = loaded(&["a", "b", "c"]).await;
    let titles: Vec<_> = sync.snapshot().todos.iter().map(|t| t.title.clone()).collect();
    assert_eq!(titles, vec!["c", "b", "a"]);
}

#[tokio::test]
async fn test_list_toggles_loading_flag() {
    let (_store, sync) = loaded(&["a"]).await;
    let seen = record_snapshots(&sync);

    sync.list().await.unwrap();

    let seen = seen.borrow();
    assert!(seen.first().unwrap().loading);
    assert!(!seen.last().unwrap().loading);
    assert!(!sync.snapshot().loading);
}

#[tokio::test]
async fn test_list_failure_keeps_collection_and_clears_loading() {
    let (store, sync) = loaded(&["a", "b"]).await;
    let before = sync.snapshot().todos;
    store.fail_list.set(true);

    assert!(sync.list().await.is_err());

    let after = sync.snapshot();
    assert_eq!(after.todos, before);
    assert!(!after.loading);
    assert_eq!(after.error.as_deref(), Some("service unavailable (status 503)"));
}

#[tokio::test]
async fn test_list_malformed_row_is_an_error() {
    let store = FlakyStore::new();
    store.scripted_lists.borrow_mut().push_back(Ok(vec![json!({ "id": 1 })]));
    let sync = TodoSync::new(store, Scope::Everyone);

    let err = sync.list().await.unwrap_err();
    assert!(matches!(err, SyncError::MalformedRow(_)));
    assert!(sync.snapshot().todos.is_empty());
}

// ========================
// Add
// ========================

#[tokio::test]
async fn test_add_blank_title_issues_no_calls() {
    let (store, sync) = loaded(&["a"]).await;
    let before = sync.snapshot();

    assert_eq!(sync.add("").await.unwrap(), None);
    assert_eq!(sync.add("   \t").await.unwrap(), None);

    assert!(store.calls().is_empty());
    assert_eq!(sync.snapshot(), before);
}

#[tokio::test]
async fn test_add_prepends_server_row() {
    let (store, sync) = loaded(&["a"]).await;
    assert_eq!(ids(&sync), vec![1]);

    let added = sync.add("  b ").await.unwrap().unwrap();

    assert_eq!(added.id, TodoId(2));
    assert_eq!(added.title, "b");
    assert!(!added.is_done);
    assert_eq!(ids(&sync), vec![2, 1]);
    assert_eq!(store.calls(), vec![Call::Insert(json!({ "title": "b", "is_done": false }))]);
}

#[tokio::test]
async fn test_add_keeps_relative_order_of_existing_rows() {
    let (_store, sync) = loaded(&["a", "b", "c"]).await;
    let before = sync.snapshot().todos;

    sync.add("d").await.unwrap();

    let after = sync.snapshot().todos;
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(after[0].title, "d");
    assert_eq!(&after[1..], &before[..]);
}

#[tokio::test]
async fn test_add_goes_to_head_even_when_older() {
    let (store, sync) = loaded(&["a"]).await;
    *store.scripted_insert.borrow_mut() = Some(row(9, "old", false, "2000-01-01T00:00:00Z"));

    sync.add("old").await.unwrap();

    assert_eq!(ids(&sync), vec![9, 1]);
}

#[tokio::test]
async fn test_add_failure_is_not_applied() {
    let (store, sync) = loaded(&["a"]).await;
    store.fail_insert.set(true);
    let before = sync.snapshot().todos;

    assert!(sync.add("b").await.is_err());

    let after = sync.snapshot();
    assert_eq!(after.todos, before);
    assert!(after.error.is_some());
    // Add never reloads
    assert_eq!(store.list_calls(), 0);
}

// ========================
// Toggle
// ========================

#[tokio::test]
async fn test_toggle_flips_exactly_one_record() {
    let (store, sync) = loaded(&["a", "b", "c"]).await;
    let before = sync.snapshot().todos;

    sync.toggle(TodoId(2)).await.unwrap();

    let after = sync.snapshot().todos;
    for (old, new) in before.iter().zip(after.iter()) {
        if old.id == TodoId(2) {
            assert_eq!(new.is_done, !old.is_done);
            assert_eq!(new.title, old.title);
            assert_eq!(new.created_at, old.created_at);
        } else {
            assert_eq!(new, old);
        }
    }
    assert_eq!(
        store.calls(),
        vec![Call::Update(Filters::new().eq("id", 2), json!({ "is_done": true }))]
    );
    assert_eq!(store.inner.rows(TODOS_TABLE)[1]["is_done"], json!(true));
}

#[tokio::test]
async fn test_toggle_unknown_id_is_noop() {
    let (store, sync) = loaded(&["a"]).await;
    sync.toggle(TodoId(42)).await.unwrap();
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_toggle_failure_shows_flip_then_reloads_truth() {
    let (store, sync) = loaded(&["a"]).await;
    store.fail_update.set(true);
    let seen = record_snapshots(&sync);

    assert!(sync.toggle(TodoId(1)).await.is_err());

    // Optimistic flip was visible before the reload
    let seen = seen.borrow();
    assert!(seen[0].todos[0].is_done);
    // Reload restored server truth
    let after = sync.snapshot();
    assert!(!after.todos[0].is_done);
    assert!(after.error.is_some());
    assert_eq!(store.list_calls(), 1);
    assert!(matches!(store.calls()[0], Call::Update(..)));
    assert!(matches!(store.calls()[1], Call::List(_)));
}

#[tokio::test]
async fn test_resync_failure_is_recorded_and_not_retried() {
    let (store, sync) = loaded(&["a"]).await;
    store.fail_update.set(true);
    store.scripted_lists.borrow_mut().push_back(Err(StoreError::Network("offline".into())));

    assert!(sync.toggle(TodoId(1)).await.is_err());

    assert_eq!(store.list_calls(), 1);
    let after = sync.snapshot();
    // Reload failed: the optimistic flip stays and the reload error wins
    assert!(after.todos[0].is_done);
    assert_eq!(after.error.as_deref(), Some("network error: offline"));
    assert!(!after.loading);
}

// ========================
// Delete
// ========================

#[tokio::test]
async fn test_delete_removes_one_and_keeps_order() {
    let (_store, sync) = loaded(&["a", "b", "c", "d"]).await;
    assert_eq!(ids(&sync), vec![4, 3, 2, 1]);

    sync.delete(TodoId(3)).await.unwrap();

    assert_eq!(ids(&sync), vec![4, 2, 1]);
}

#[tokio::test]
async fn test_delete_failure_reloads() {
    let (store, sync) = loaded(&["a", "b"]).await;
    store.fail_delete.set(true);

    assert!(sync.delete(TodoId(1)).await.is_err());

    assert_eq!(ids(&sync), vec![2, 1]);
    assert!(sync.snapshot().error.is_some());
    assert_eq!(store.list_calls(), 1);
}

// ========================
// Rename
// ========================

#[tokio::test]
async fn test_rename_blank_is_rejected_locally() {
    let (store, sync) = loaded(&["a"]).await;

    sync.rename(TodoId(1), "").await.unwrap();
    sync.rename(TodoId(1), "  ").await.unwrap();

    assert!(store.calls().is_empty());
    assert_eq!(sync.snapshot().todos[0].title, "a");
}

#[tokio::test]
async fn test_rename_trims_and_patches_title() {
    let (store, sync) = loaded(&["a"]).await;

    sync.rename(TodoId(1), " renamed ").await.unwrap();

    assert_eq!(sync.snapshot().todos[0].title, "renamed");
    assert_eq!(
        store.calls(),
        vec![Call::Update(Filters::new().eq("id", 1), json!({ "title": "renamed" }))]
    );
}

#[tokio::test]
async fn test_rename_failure_reloads_original_title() {
    let (store, sync) = loaded(&["a"]).await;
    store.fail_update.set(true);
    let seen = record_snapshots(&sync);

    assert!(sync.rename(TodoId(1), "b").await.is_err());

    assert_eq!(seen.borrow()[0].todos[0].title, "b");
    assert_eq!(sync.snapshot().todos[0].title, "a");
    assert_eq!(store.list_calls(), 1);
}

// ========================
// Scope, errors, overlap
// ========================

#[tokio::test]
async fn test_owner_scope_is_on_every_call() {
    let store = FlakyStore::new();
    let owner = PrincipalId::new("u-1");
    let sync = TodoSync::new(store.clone(), Scope::Owner(owner.clone()));

    sync.list().await.unwrap();
    let added = sync.add("mine").await.unwrap().unwrap();
    assert_eq!(added.owner, Some(owner.clone()));
    sync.toggle(added.id).await.unwrap();
    sync.rename(added.id, "still mine").await.unwrap();
    sync.delete(added.id).await.unwrap();

    let calls = store.calls();
    assert_eq!(calls.len(), 5);
    for call in calls {
        match call {
            Call::List(f) | Call::Update(f, _) | Call::Delete(f) => {
                assert_eq!(f.get("user_id"), Some("u-1"));
            }
            Call::Insert(row) => assert_eq!(row["user_id"], json!("u-1")),
        }
    }
}

#[tokio::test]
async fn test_owner_scope_hides_other_principals_rows() {
    let store = FlakyStore::new();
    store.inner.insert(TODOS_TABLE, json!({ "title": "theirs", "is_done": false, "user_id": "u-2" })).await.unwrap();
    let sync = TodoSync::new(store.clone(), Scope::Owner(PrincipalId::new("u-1")));

    sync.list().await.unwrap();
    assert!(sync.snapshot().todos.is_empty());

    // Unknown locally, so nothing is sent
    sync.toggle(TodoId(1)).await.unwrap();
    assert_eq!(store.calls().len(), 1);
}

#[tokio::test]
async fn test_latest_error_overwrites_and_can_be_dismissed() {
    let (store, sync) = loaded(&["a"]).await;
    store.fail_insert.set(true);
    sync.add("x").await.unwrap_err();
    store.fail_list.set(true);
    sync.list().await.unwrap_err();

    assert_eq!(sync.snapshot().error.as_deref(), Some("service unavailable (status 503)"));
    store.scripted_lists.borrow_mut().push_back(Err(StoreError::Network("offline".into())));
    sync.list().await.unwrap_err();
    assert_eq!(sync.snapshot().error.as_deref(), Some("network error: offline"));

    sync.dismiss_error();
    assert!(sync.snapshot().error.is_none());
}

#[tokio::test]
async fn test_reset_clears_cache() {
    let (_store, sync) = loaded(&["a"]).await;
    sync.reset();
    let state = sync.snapshot();
    assert!(state.todos.is_empty());
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_overlapping_toggle_and_rename_both_apply() {
    let (store, sync) = loaded(&["a"]).await;

    let (toggled, renamed) = tokio::join!(sync.toggle(TodoId(1)), sync.rename(TodoId(1), "b"));
    toggled.unwrap();
    renamed.unwrap();

    let todo = sync.snapshot().todos[0].clone();
    assert!(todo.is_done);
    assert_eq!(todo.title, "b");
    assert_eq!(store.calls().len(), 2);
}

#[tokio::test]
async fn test_counts() {
    let (_store, sync) = loaded(&["a", "b", "c"]).await;
    sync.toggle(TodoId(1)).await.unwrap();
    let state = sync.snapshot();
    assert_eq!(state.total(), 3);
    assert_eq!(state.remaining(), 2);
}

#[tokio::test]
async fn test_cleared_observer_is_not_called() {
    let (_store, sync) = loaded(&["a"]).await;
    let seen = record_snapshots(&sync);
    sync.clear_observer();

    sync.list().await.unwrap();

    assert!(seen.borrow().is_empty());
    assert_eq!(ids(&sync), vec![1]);
}
