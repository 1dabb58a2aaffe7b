//! Session Hub
//!
//! Holds the current session and fans change notifications out to
//! subscribers. Shared by every auth provider implementation.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};

use super::traits::{SessionCallback, Subscription};
use crate::domain::Session;

new_key_type! {
    pub struct ListenerKey;
}

#[derive(Default)]
struct HubInner {
    current: Option<Session>,
    listeners: SlotMap<ListenerKey, SessionCallback>,
}

/// Cheap to clone; clones share the same session
#[derive(Clone, Default)]
pub struct SessionHub {
    inner: Rc<RefCell<HubInner>>,
}

impl SessionHub {
    pub fn new(initial: Option<Session>) -> Self {
        let hub = Self::default();
        hub.inner.borrow_mut().current = initial;
        hub
    }

    pub fn current(&self) -> Option<Session> {
        self.inner.borrow().current.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.borrow().current.as_ref().map(|s| s.access_token.clone())
    }

    /// Replace the session and notify every listener
    pub fn set(&self, session: Option<Session>) {
        let principal = session.as_ref().map(|s| s.principal.clone());
        let listeners: Vec<SessionCallback> = {
            let mut inner = self.inner.borrow_mut();
            inner.current = session;
            inner.listeners.values().cloned().collect()
        };
        log::debug!("session changed, notifying {} listener(s)", listeners.len());
        // Borrow released: listeners may subscribe or unsubscribe re-entrantly
        for listener in listeners {
            listener(principal.clone());
        }
    }

    pub fn subscribe(&self, callback: SessionCallback) -> Subscription {
        let key = self.inner.borrow_mut().listeners.insert(callback);
        let weak: Weak<RefCell<HubInner>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().listeners.remove(key);
            }
        })
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}
