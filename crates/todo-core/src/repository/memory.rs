//! In-Memory Backend
//!
//! Process-local implementations of the remote store and auth surface.
//! Used by tests and by the offline demo build (no Supabase configured).

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};

use super::filters::{Filters, OrderBy};
use super::session_hub::SessionHub;
use super::traits::{AuthProvider, RemoteStore, SessionCallback, Subscription};
use crate::domain::{Credentials, Principal, PrincipalId, Session, SignUpOutcome};
use crate::error::{AuthError, AuthResult, StoreError, StoreResult};

// ========================
// Data
// ========================

/// Tables of JSON rows with a server-style `id` / `created_at` generator
pub struct MemoryStore {
    tables: RefCell<HashMap<String, Vec<Value>>>,
    next_id: Cell<i64>,
    epoch: DateTime<Utc>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl MemoryStore {
    /// `epoch` is the `created_at` of the first inserted row; each later
    /// row is one second newer.
    pub fn new(epoch: DateTime<Utc>) -> Self {
        Self {
            tables: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
            epoch,
        }
    }

    /// Raw rows of a table in insertion order
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.borrow().get(table).cloned().unwrap_or_default()
    }

    fn generate(&self, object: &mut Map<String, Value>) {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        object.entry("id").or_insert_with(|| Value::from(id));
        let created_at = self.epoch + Duration::seconds(id - 1);
        object
            .entry("created_at")
            .or_insert_with(|| Value::from(created_at.to_rfc3339()));
    }
}

fn compare_field(a: &Value, b: &Value, field: &str) -> Ordering {
    match (a.get(field), b.get(field)) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[async_trait(?Send)]
impl RemoteStore for MemoryStore {
    async fn list(&self, table: &str, filters: &Filters, order: &OrderBy) -> StoreResult<Vec<Value>> {
        let mut rows: Vec<Value> = self
            .tables
            .borrow()
            .get(table)
            .map(|rows| rows.iter().filter(|row| filters.matches(row)).cloned().collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| {
            let ord = compare_field(a, b, &order.field);
            if order.descending { ord.reverse() } else { ord }
        });
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> StoreResult<Value> {
        let Value::Object(mut object) = row else {
            return Err(StoreError::InvalidRequest("insert expects a JSON object".into()));
        };
        self.generate(&mut object);
        let row = Value::Object(object);
        self.tables
            .borrow_mut()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, filters: &Filters, patch: Value) -> StoreResult<()> {
        let Value::Object(patch) = patch else {
            return Err(StoreError::InvalidRequest("update expects a JSON object".into()));
        };
        let mut tables = self.tables.borrow_mut();
        for row in tables.get_mut(table).into_iter().flatten() {
            if !filters.matches(row) {
                continue;
            }
            if let Value::Object(object) = row {
                for (key, value) in &patch {
                    object.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, filters: &Filters) -> StoreResult<()> {
        if let Some(rows) = self.tables.borrow_mut().get_mut(table) {
            rows.retain(|row| !filters.matches(row));
        }
        Ok(())
    }
}

// ========================
// Auth
// ========================

struct Account {
    password: String,
    principal: Principal,
}

/// Email/password accounts kept in memory
pub struct MemoryAuth {
    hub: SessionHub,
    accounts: RefCell<HashMap<String, Account>>,
    require_confirmation: bool,
    next_user: Cell<u32>,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new(false)
    }
}

impl MemoryAuth {
    /// With `require_confirmation`, sign-up never opens a session
    pub fn new(require_confirmation: bool) -> Self {
        Self {
            hub: SessionHub::default(),
            accounts: RefCell::new(HashMap::new()),
            require_confirmation,
            next_user: Cell::new(1),
        }
    }

    fn open_session(&self, principal: &Principal) {
        self.hub.set(Some(Session {
            access_token: format!("memory-token-{}", principal.id),
            refresh_token: None,
            principal: principal.clone(),
            expires_at: None,
        }));
    }
}

#[async_trait(?Send)]
impl AuthProvider for MemoryAuth {
    async fn current_session(&self) -> Option<Session> {
        self.hub.current()
    }

    fn subscribe(&self, callback: SessionCallback) -> Subscription {
        self.hub.subscribe(callback)
    }

    async fn sign_in(&self, credentials: &Credentials) -> AuthResult<Principal> {
        let principal = {
            let accounts = self.accounts.borrow();
            match accounts.get(&credentials.email) {
                Some(account) if account.password == credentials.password => account.principal.clone(),
                _ => {
                    return Err(AuthError::Backend {
                        status: 400,
                        message: "Invalid login credentials".into(),
                    })
                }
            }
        };
        self.open_session(&principal);
        Ok(principal)
    }

    async fn sign_up(&self, credentials: &Credentials) -> AuthResult<SignUpOutcome> {
        if self.accounts.borrow().contains_key(&credentials.email) {
            return Err(AuthError::Backend {
                status: 422,
                message: "User already registered".into(),
            });
        }
        let n = self.next_user.get();
        self.next_user.set(n + 1);
        let principal = Principal {
            id: PrincipalId::new(format!("user-{n}")),
            email: Some(credentials.email.clone()),
        };
        self.accounts.borrow_mut().insert(
            credentials.email.clone(),
            Account { password: credentials.password.clone(), principal: principal.clone() },
        );
        if self.require_confirmation {
            return Ok(SignUpOutcome::PendingConfirmation);
        }
        self.open_session(&principal);
        Ok(SignUpOutcome::SignedIn(principal))
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.hub.set(None);
        Ok(())
    }
}
