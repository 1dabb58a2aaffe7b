//! Browser Session Persistence
//!
//! Keeps the auth session in `localStorage` so a reload stays signed in.

use todo_core::domain::Session;
use todo_core::repository::SessionPersistence;

const SESSION_KEY: &str = "todo.auth.session";

pub struct LocalStoragePersistence;

impl LocalStoragePersistence {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

impl SessionPersistence for LocalStoragePersistence {
    fn load(&self) -> Option<Session> {
        let raw = Self::storage()?.get_item(SESSION_KEY).ok().flatten()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                log::warn!("discarding unreadable stored session: {e}");
                self.clear();
                None
            }
        }
    }

    fn save(&self, session: &Session) {
        let Some(storage) = Self::storage() else {
            return;
        };
        match serde_json::to_string(session) {
            Ok(raw) => {
                if let Err(e) = storage.set_item(SESSION_KEY, &raw) {
                    log::warn!("failed to store session: {e:?}");
                }
            }
            Err(e) => log::warn!("failed to serialize session: {e}"),
        }
    }

    fn clear(&self) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(SESSION_KEY);
        }
    }
}
