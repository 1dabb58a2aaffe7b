//! Synchronization Flow
//!
//! Keeps a local, newest-first collection of todos consistent with the
//! remote store.
//!
//! - `list` replaces the collection wholesale.
//! - `add` waits for the server row, then prepends it.
//! - `toggle` and `rename` patch the local row as soon as the request is
//!   issued; a failed confirmation triggers one full `list`.
//! - `delete` removes the row once confirmed; a failure triggers one
//!   full `list`.
//!
//! Overlapping operations on one record are not serialized. The reload
//! after a failed mutation is the only corrective path.

mod state;
#[cfg(test)]
mod tests;

pub use state::SyncState;

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::domain::scope::OWNER_COLUMN;
use crate::domain::{NewTodo, Scope, Todo, TodoId, TodoPatch};
use crate::error::SyncError;
use crate::repository::{Filters, OrderBy, RemoteStore};

pub const TODOS_TABLE: &str = "todos";
const ORDER_COLUMN: &str = "created_at";

type Observer = Box<dyn Fn(&SyncState)>;

/// State container and the only entry point for mutating it.
///
/// Clones share the same state and observer.
#[derive(Clone)]
pub struct TodoSync {
    store: Rc<dyn RemoteStore>,
    scope: Scope,
    state: Rc<RefCell<SyncState>>,
    observer: Rc<RefCell<Option<Observer>>>,
}

/// Holds the loading flag up for the duration of a list request.
/// Dropping it clears the flag on every exit path.
struct LoadingGuard<'a> {
    sync: &'a TodoSync,
}

impl<'a> LoadingGuard<'a> {
    fn begin(sync: &'a TodoSync) -> Self {
        sync.mutate(SyncState::begin_list);
        Self { sync }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.sync.mutate(SyncState::end_list);
    }
}

fn decode(row: Value) -> Result<Todo, SyncError> {
    serde_json::from_value(row).map_err(|e| SyncError::MalformedRow(e.to_string()))
}

fn encode(value: &impl serde::Serialize) -> Result<Value, SyncError> {
    serde_json::to_value(value).map_err(|e| SyncError::MalformedRow(e.to_string()))
}

impl TodoSync {
    pub fn new(store: Rc<dyn RemoteStore>, scope: Scope) -> Self {
        Self {
            store,
            scope,
            state: Rc::new(RefCell::new(SyncState::default())),
            observer: Rc::new(RefCell::new(None)),
        }
    }

    /// Register the single observer, replacing any previous one.
    /// It is called with a fresh snapshot right away.
    pub fn set_observer(&self, observer: impl Fn(&SyncState) + 'static) {
        *self.observer.borrow_mut() = Some(Box::new(observer));
        self.publish();
    }

    /// Drop the observer. Requests still in flight keep updating the
    /// state but no longer publish it.
    pub fn clear_observer(&self) {
        self.observer.borrow_mut().take();
    }

    pub fn snapshot(&self) -> SyncState {
        self.state.borrow().clone()
    }

    // ========================
    // Operations
    // ========================

    /// Fetch every row in scope and replace the local collection.
    /// On failure the collection is left as it was.
    pub async fn list(&self) -> Result<(), SyncError> {
        let _loading = LoadingGuard::begin(self);
        match self.fetch().await {
            Ok(todos) => {
                log::debug!("loaded {} todo(s)", todos.len());
                self.mutate(|s| s.todos = todos);
                Ok(())
            }
            Err(e) => {
                self.record_error(&e);
                Err(e)
            }
        }
    }

    /// Insert a todo and prepend the server's row on confirmation.
    ///
    /// Returns `Ok(None)` without contacting the server when the trimmed
    /// title is empty. Callers clear their input only on `Ok(Some(_))`.
    pub async fn add(&self, title: &str) -> Result<Option<Todo>, SyncError> {
        let Some(new_todo) = NewTodo::from_input(title, self.scope.owner().cloned()) else {
            return Ok(None);
        };
        match self.insert(&new_todo).await {
            Ok(todo) => {
                log::debug!("added todo {}", todo.id);
                let added = todo.clone();
                // Head of the list regardless of created_at
                self.mutate(|s| s.todos.insert(0, added));
                Ok(Some(todo))
            }
            Err(e) => {
                self.record_error(&e);
                Err(e)
            }
        }
    }

    /// Flip `is_done`. No-op when the id is not in the collection.
    pub async fn toggle(&self, id: TodoId) -> Result<(), SyncError> {
        let Some(is_done) = self.state.borrow().find(id).map(|t| t.is_done) else {
            return Ok(());
        };
        self.patch_optimistically(id, TodoPatch::done(!is_done)).await
    }

    /// Replace the title. Blank titles and unknown ids are ignored.
    pub async fn rename(&self, id: TodoId, new_title: &str) -> Result<(), SyncError> {
        let title = new_title.trim();
        if title.is_empty() || self.state.borrow().find(id).is_none() {
            return Ok(());
        }
        self.patch_optimistically(id, TodoPatch::title(title)).await
    }

    /// Delete on the server, then drop the row locally.
    pub async fn delete(&self, id: TodoId) -> Result<(), SyncError> {
        let filters = self.record_filters(id);
        match self.store.delete(TODOS_TABLE, &filters).await {
            Ok(()) => {
                log::debug!("deleted todo {id}");
                self.mutate(|s| s.todos.retain(|t| t.id != id));
                Ok(())
            }
            Err(e) => self.recover(e.into()).await,
        }
    }

    /// Clear the error slot
    pub fn dismiss_error(&self) {
        self.mutate(|s| s.error = None);
    }

    /// Forget the cached collection and any error
    pub fn reset(&self) {
        self.mutate(|s| {
            s.todos.clear();
            s.error = None;
        });
    }

    // ========================
    // Internals
    // ========================

    async fn fetch(&self) -> Result<Vec<Todo>, SyncError> {
        let rows = self
            .store
            .list(TODOS_TABLE, &self.scope_filters(), &OrderBy::desc(ORDER_COLUMN))
            .await?;
        rows.into_iter().map(decode).collect()
    }

    async fn insert(&self, new_todo: &NewTodo) -> Result<Todo, SyncError> {
        let row = self.store.insert(TODOS_TABLE, encode(new_todo)?).await?;
        decode(row)
    }

    async fn patch_optimistically(&self, id: TodoId, patch: TodoPatch) -> Result<(), SyncError> {
        let filters = self.record_filters(id);
        let body = encode(&patch)?;
        let confirmation = self.store.update(TODOS_TABLE, &filters, body);
        // Applied in the same step the request is issued, before it resolves
        self.mutate(|s| {
            if let Some(todo) = s.find_mut(id) {
                patch.apply(todo);
            }
        });
        match confirmation.await {
            Ok(()) => Ok(()),
            Err(e) => self.recover(e.into()).await,
        }
    }

    /// Record a mutation failure and reload once. A failing reload is
    /// recorded by `list` itself and not retried.
    async fn recover(&self, error: SyncError) -> Result<(), SyncError> {
        self.record_error(&error);
        if let Err(reload) = self.list().await {
            log::warn!("resynchronization failed: {reload}");
        }
        Err(error)
    }

    fn scope_filters(&self) -> Filters {
        match self.scope.owner() {
            Some(owner) => Filters::new().eq(OWNER_COLUMN, owner),
            None => Filters::new(),
        }
    }

    fn record_filters(&self, id: TodoId) -> Filters {
        let filters = Filters::new().eq("id", id);
        match self.scope.owner() {
            Some(owner) => filters.eq(OWNER_COLUMN, owner),
            None => filters,
        }
    }

    fn record_error(&self, error: &SyncError) {
        log::warn!("todo sync failed: {error}");
        let message = error.to_string();
        self.mutate(|s| s.error = Some(message));
    }

    fn mutate(&self, f: impl FnOnce(&mut SyncState)) {
        f(&mut self.state.borrow_mut());
        self.publish();
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        if let Some(observer) = self.observer.borrow().as_ref() {
            observer(&snapshot);
        }
    }
}
