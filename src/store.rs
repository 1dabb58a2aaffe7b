//! Todo View State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. Written only
//! by the sync observer.

use leptos::prelude::*;
use reactive_stores::Store;
use todo_core::domain::Todo;
use todo_core::SyncState;

/// Mirror of the sync state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct TodoViewState {
    /// Newest first
    pub todos: Vec<Todo>,
    pub loading: bool,
    pub error: Option<String>,
    /// Not done
    pub remaining: usize,
    pub total: usize,
}

/// Type alias for the store
pub type TodoStore = Store<TodoViewState>;

/// Get the todo store from context
pub fn use_todo_store() -> TodoStore {
    expect_context::<TodoStore>()
}

/// Copy a published sync snapshot into the store
pub fn store_apply(store: &TodoStore, state: &SyncState) {
    *store.todos().write() = state.todos.clone();
    *store.loading().write() = state.loading;
    *store.error().write() = state.error.clone();
    *store.remaining().write() = state.remaining();
    *store.total().write() = state.total();
}
