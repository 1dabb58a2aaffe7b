//! Domain Layer
//!
//! Core entities for the todo client. Pure data, no I/O.

pub mod todo;
pub mod principal;
pub mod scope;

pub use todo::{NewTodo, Todo, TodoId, TodoPatch};
pub use principal::{Credentials, Principal, PrincipalId, Session, SignUpOutcome};
pub use scope::Scope;
