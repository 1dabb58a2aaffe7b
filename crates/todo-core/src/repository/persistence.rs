//! Session Persistence
//!
//! Where an auth provider keeps the session between page loads.

use std::cell::RefCell;

use crate::domain::Session;

pub trait SessionPersistence {
    fn load(&self) -> Option<Session>;
    fn save(&self, session: &Session);
    fn clear(&self);
}

/// Keeps the session for the lifetime of the process only
#[derive(Default)]
pub struct MemoryPersistence {
    slot: RefCell<Option<Session>>,
}

impl MemoryPersistence {
    pub fn new(initial: Option<Session>) -> Self {
        Self { slot: RefCell::new(initial) }
    }
}

impl SessionPersistence for MemoryPersistence {
    fn load(&self) -> Option<Session> {
        self.slot.borrow().clone()
    }

    fn save(&self, session: &Session) {
        *self.slot.borrow_mut() = Some(session.clone());
    }

    fn clear(&self) {
        self.slot.borrow_mut().take();
    }
}
