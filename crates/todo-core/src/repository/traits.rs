//! Repository Layer - Core Traits
//!
//! The remote store and its auth surface are external collaborators.
//! These traits are the only contract the rest of the crate relies on.
//!
//! Futures are not `Send`: everything runs on the browser event loop.

use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;

use super::filters::{Filters, OrderBy};
use crate::domain::{Credentials, Principal, Session, SignUpOutcome};
use crate::error::{AuthResult, StoreResult};

/// Table-scoped CRUD over JSON rows
#[async_trait(?Send)]
pub trait RemoteStore {
    /// All rows matching `filters`, in `order`
    async fn list(&self, table: &str, filters: &Filters, order: &OrderBy) -> StoreResult<Vec<Value>>;

    /// Insert one row and return it with server-generated fields
    async fn insert(&self, table: &str, row: Value) -> StoreResult<Value>;

    /// Apply `patch` to the rows matching `filters`
    async fn update(&self, table: &str, filters: &Filters, patch: Value) -> StoreResult<()>;

    /// Delete the rows matching `filters`
    async fn delete(&self, table: &str, filters: &Filters) -> StoreResult<()>;
}

/// Called with the current principal on every session change
pub type SessionCallback = Rc<dyn Fn(Option<Principal>)>;

/// Backend authentication surface
#[async_trait(?Send)]
pub trait AuthProvider {
    async fn current_session(&self) -> Option<Session>;

    /// Register for session-change notifications until the token is dropped
    fn subscribe(&self, callback: SessionCallback) -> Subscription;

    async fn sign_in(&self, credentials: &Credentials) -> AuthResult<Principal>;

    async fn sign_up(&self, credentials: &Credentials) -> AuthResult<SignUpOutcome>;

    async fn sign_out(&self) -> AuthResult<()>;
}

/// Disposal token for a session subscription.
///
/// The release closure runs exactly once: on `unsubscribe` or on drop,
/// whichever comes first.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
