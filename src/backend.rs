//! Backend Wiring
//!
//! Picks the remote store and auth provider for the configured
//! deployment: Supabase when an endpoint is configured, in-memory otherwise.

use std::rc::Rc;

use todo_core::repository::{
    AuthProvider, MemoryAuth, MemoryStore, RemoteStore, SessionHub, SupabaseAuth, SupabaseStore,
};
use todo_core::{AppConfig, AuthMode};

use crate::persistence::LocalStoragePersistence;

pub struct Backend {
    pub store: Rc<dyn RemoteStore>,
    /// `None` in the anonymous deployment
    pub auth: Option<Rc<dyn AuthProvider>>,
    demo: bool,
}

impl Backend {
    pub fn connect(config: &AppConfig) -> Self {
        let require_auth = config.auth_mode == AuthMode::Required;
        match &config.supabase {
            Some(endpoint) if require_auth => {
                log::info!("using Supabase at {} with sign-in", endpoint.url());
                let auth = Rc::new(SupabaseAuth::new(endpoint.clone(), Rc::new(LocalStoragePersistence)));
                let store = SupabaseStore::new(endpoint.clone(), auth.clone());
                Self {
                    store: Rc::new(store),
                    auth: Some(auth as Rc<dyn AuthProvider>),
                    demo: false,
                }
            }
            Some(endpoint) => {
                log::info!("using Supabase at {} anonymously", endpoint.url());
                // No auth client: a session left in storage must not leak
                // into the shared list
                let store = SupabaseStore::new(endpoint.clone(), Rc::new(SessionHub::default()));
                Self {
                    store: Rc::new(store),
                    auth: None,
                    demo: false,
                }
            }
            None => {
                log::warn!("SUPABASE_URL not set, using the in-memory demo backend");
                Self {
                    store: Rc::new(MemoryStore::default()),
                    auth: require_auth.then(|| Rc::new(MemoryAuth::default()) as Rc<dyn AuthProvider>),
                    demo: true,
                }
            }
        }
    }

    pub fn is_demo(&self) -> bool {
        self.demo
    }
}
