//! Sync State
//!
//! The state container published to the UI after every transition.

use crate::domain::{Todo, TodoId};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncState {
    /// Cache of server rows, newest first
    pub todos: Vec<Todo>,
    /// True while at least one list request is in flight
    pub loading: bool,
    /// Latest unresolved failure; a new failure overwrites it
    pub error: Option<String>,
    lists_in_flight: u32,
}

impl SyncState {
    pub fn find(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub(crate) fn find_mut(&mut self, id: TodoId) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|t| t.id == id)
    }

    pub fn total(&self) -> usize {
        self.todos.len()
    }

    pub fn remaining(&self) -> usize {
        self.todos.iter().filter(|t| !t.is_done).count()
    }

    pub(crate) fn begin_list(&mut self) {
        self.lists_in_flight += 1;
        self.loading = true;
    }

    pub(crate) fn end_list(&mut self) {
        self.lists_in_flight = self.lists_in_flight.saturating_sub(1);
        self.loading = self.lists_in_flight > 0;
    }
}
