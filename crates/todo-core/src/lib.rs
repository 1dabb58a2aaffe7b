//! Todo Core
//!
//! Layered architecture:
//! - domain: Todo records, principals, access scope
//! - repository: Remote store and auth capabilities (Supabase, in-memory)
//! - sync: Local collection kept consistent with the remote store
//! - gate: Session routing state
//! - edit: Inline rename drafts
//! - config: Build-time configuration

pub mod config;
pub mod domain;
pub mod edit;
pub mod error;
pub mod gate;
pub mod repository;
pub mod sync;

pub use config::{AppConfig, AuthMode};
pub use edit::EditDraft;
pub use error::{AuthError, ConfigError, StoreError, SyncError};
pub use gate::{GateState, SessionGate};
pub use sync::{SyncState, TodoSync};
