//! Access Scope
//!
//! Filters attached to every remote call so it only touches authorized rows.

use super::principal::PrincipalId;

/// Column holding the owning principal
pub const OWNER_COLUMN: &str = "user_id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Anonymous deployment: one shared list, no owner filter
    Everyone,
    /// Per-principal deployment: every read and write carries the owner
    Owner(PrincipalId),
}

impl Scope {
    pub fn owner(&self) -> Option<&PrincipalId> {
        match self {
            Scope::Everyone => None,
            Scope::Owner(id) => Some(id),
        }
    }
}
