//! Application Context
//!
//! Shared handles provided via Leptos Context API. The backend and sync
//! objects are single-threaded, so they sit in local stored values and
//! only `Copy` handles travel through context.

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use todo_core::domain::TodoId;
use todo_core::repository::{AuthProvider, RemoteStore};
use todo_core::TodoSync;

use crate::backend::Backend;

/// App-wide backend handles
#[derive(Clone, Copy)]
pub struct AppContext {
    backend: StoredValue<Backend, LocalStorage>,
}

impl AppContext {
    pub fn new(backend: Backend) -> Self {
        Self { backend: StoredValue::new_local(backend) }
    }

    pub fn remote_store(&self) -> Rc<dyn RemoteStore> {
        self.backend.with_value(|b| b.store.clone())
    }

    pub fn auth(&self) -> Option<Rc<dyn AuthProvider>> {
        self.backend.with_value(|b| b.auth.clone())
    }

    pub fn requires_sign_in(&self) -> bool {
        self.backend.with_value(|b| b.auth.is_some())
    }
}

pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}

/// User intents on the todo list. Each one runs the matching sync
/// operation in the background; failures land in the sync error slot.
#[derive(Clone, Copy)]
pub struct TodoActions {
    sync: StoredValue<TodoSync, LocalStorage>,
}

impl TodoActions {
    pub fn new(sync: TodoSync) -> Self {
        Self { sync: StoredValue::new_local(sync) }
    }

    fn run<F, Fut>(&self, op: F)
    where
        F: FnOnce(TodoSync) -> Fut,
        Fut: std::future::Future<Output = ()> + 'static,
    {
        if let Some(sync) = self.sync.try_get_value() {
            spawn_local(op(sync));
        }
    }

    pub fn reload(&self) {
        self.run(|sync| async move {
            let _ = sync.list().await;
        });
    }

    /// `on_added` runs only once the server confirmed the insert
    pub fn add(&self, title: String, on_added: impl FnOnce() + 'static) {
        self.run(|sync| async move {
            if let Ok(Some(_)) = sync.add(&title).await {
                on_added();
            }
        });
    }

    pub fn toggle(&self, id: TodoId) {
        self.run(move |sync| async move {
            let _ = sync.toggle(id).await;
        });
    }

    pub fn rename(&self, id: TodoId, title: String) {
        self.run(move |sync| async move {
            let _ = sync.rename(id, &title).await;
        });
    }

    pub fn delete(&self, id: TodoId) {
        self.run(move |sync| async move {
            let _ = sync.delete(id).await;
        });
    }

    pub fn dismiss_error(&self) {
        self.sync.with_value(|sync| sync.dismiss_error());
    }

    /// Detach from the view being torn down
    pub fn detach(&self) {
        self.sync.try_with_value(|sync| {
            sync.clear_observer();
            sync.reset();
        });
    }
}

pub fn use_todo_actions() -> TodoActions {
    expect_context::<TodoActions>()
}
