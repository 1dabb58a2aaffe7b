//! Session Gate
//!
//! Tracks whether someone is signed in so the UI can route between the
//! auth view and the todo view.
//!
//! `Checking` → first of {initial session query, first change
//! notification} → `Authenticated` / `Unauthenticated`. After that every
//! notification transitions. The subscription is held until `teardown`
//! or drop and released exactly once.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use crate::domain::Principal;
use crate::repository::{AuthProvider, Subscription};

#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    Checking,
    Authenticated(Principal),
    Unauthenticated,
}

impl GateState {
    fn from_principal(principal: Option<Principal>) -> Self {
        match principal {
            Some(p) => GateState::Authenticated(p),
            None => GateState::Unauthenticated,
        }
    }
}

struct GateInner {
    state: GateState,
    notified: bool,
    on_change: Rc<dyn Fn(&GateState)>,
}

impl GateInner {
    fn transition(cell: &RefCell<GateInner>, next: GateState) {
        let on_change = {
            let mut inner = cell.borrow_mut();
            if inner.state == next {
                return;
            }
            inner.state = next.clone();
            inner.on_change.clone()
        };
        log::debug!("session gate -> {next:?}");
        on_change(&next);
    }
}

pub struct SessionGate {
    auth: Rc<dyn AuthProvider>,
    inner: Rc<RefCell<GateInner>>,
    subscription: RefCell<Option<Subscription>>,
}

impl SessionGate {
    /// Subscribe to session changes. The gate starts in `Checking`;
    /// drive `check_session()` to resolve the initial state.
    pub fn start(auth: Rc<dyn AuthProvider>, on_change: impl Fn(&GateState) + 'static) -> Self {
        let inner = Rc::new(RefCell::new(GateInner {
            state: GateState::Checking,
            notified: false,
            on_change: Rc::new(on_change),
        }));
        let weak = Rc::downgrade(&inner);
        let subscription = auth.subscribe(Rc::new(move |principal: Option<Principal>| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().notified = true;
                GateInner::transition(&inner, GateState::from_principal(principal));
            }
        }));
        Self {
            auth,
            inner,
            subscription: RefCell::new(Some(subscription)),
        }
    }

    /// Query the current session once. Ignored if a change notification
    /// already arrived, since that is newer.
    pub fn check_session(&self) -> impl Future<Output = ()> + 'static {
        let auth = self.auth.clone();
        let inner = self.inner.clone();
        async move {
            let principal = auth.current_session().await.map(|s| s.principal);
            if inner.borrow().notified {
                return;
            }
            GateInner::transition(&inner, GateState::from_principal(principal));
        }
    }

    pub fn state(&self) -> GateState {
        self.inner.borrow().state.clone()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.borrow().is_some()
    }

    /// Release the subscription. Later calls do nothing.
    pub fn teardown(&self) {
        if let Some(subscription) = self.subscription.borrow_mut().take() {
            log::debug!("session gate released its subscription");
            subscription.unsubscribe();
        }
    }
}

impl Drop for SessionGate {
    fn drop(&mut self) {
        self.teardown();
    }
}
