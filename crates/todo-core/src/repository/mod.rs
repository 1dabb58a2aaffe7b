//! Repository Layer
//!
//! Capability traits over the remote backend plus their implementations:
//! - `supabase`: PostgREST data and GoTrue auth over HTTP
//! - `memory`: in-process store and auth for tests and the offline demo

mod traits;
mod filters;
mod session_hub;
mod persistence;
pub mod memory;
pub mod supabase;

pub use traits::{AuthProvider, RemoteStore, SessionCallback, Subscription};
pub use filters::{Filters, OrderBy};
pub use session_hub::SessionHub;
pub use persistence::{MemoryPersistence, SessionPersistence};
pub use memory::{MemoryAuth, MemoryStore};
pub use supabase::{AccessTokenSource, SupabaseAuth, SupabaseEndpoint, SupabaseStore};
