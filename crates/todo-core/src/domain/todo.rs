//! Todo Entity
//!
//! A single row of the `todos` table.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::principal::PrincipalId;

/// Server-assigned todo identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub i64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A todo record as returned by the remote store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier, immutable
    pub id: TodoId,
    /// Never empty once persisted
    pub title: String,
    pub is_done: bool,
    pub created_at: DateTime<Utc>,
    /// Owning principal, absent in the anonymous deployment
    #[serde(rename = "user_id", default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<PrincipalId>,
}

/// Insert payload. `id` and `created_at` are assigned by the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTodo {
    pub title: String,
    pub is_done: bool,
    #[serde(rename = "user_id", skip_serializing_if = "Option::is_none")]
    pub owner: Option<PrincipalId>,
}

impl NewTodo {
    /// Builds an insert payload from raw user input.
    ///
    /// Returns `None` when the trimmed title is empty.
    pub fn from_input(title: &str, owner: Option<PrincipalId>) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            is_done: false,
            owner,
        })
    }
}

/// Partial update sent with an `update` call
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_done: Option<bool>,
}

impl TodoPatch {
    pub fn done(is_done: bool) -> Self {
        Self { is_done: Some(is_done), ..Default::default() }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self { title: Some(title.into()), ..Default::default() }
    }

    /// Apply this patch to a local record
    pub fn apply(&self, todo: &mut Todo) {
        if let Some(title) = &self.title {
            todo.title = title.clone();
        }
        if let Some(is_done) = self.is_done {
            todo.is_done = is_done;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_todo_trims_title() {
        let todo = NewTodo::from_input("  buy milk \n", None).unwrap();
        assert_eq!(todo.title, "buy milk");
        assert!(!todo.is_done);
    }

    #[test]
    fn test_new_todo_rejects_blank() {
        assert!(NewTodo::from_input("", None).is_none());
        assert!(NewTodo::from_input(" \t ", None).is_none());
    }

    #[test]
    fn test_new_todo_owner_serialized_as_user_id() {
        let owned = NewTodo::from_input("a", Some(PrincipalId::new("u-1"))).unwrap();
        assert_eq!(
            serde_json::to_value(&owned).unwrap(),
            json!({ "title": "a", "is_done": false, "user_id": "u-1" })
        );

        let anonymous = NewTodo::from_input("a", None).unwrap();
        assert_eq!(
            serde_json::to_value(&anonymous).unwrap(),
            json!({ "title": "a", "is_done": false })
        );
    }

    #[test]
    fn test_todo_from_row() {
        let row = json!({
            "id": 7,
            "title": "write tests",
            "is_done": true,
            "created_at": "2024-03-01T10:00:00+00:00",
            "user_id": null
        });
        let todo: Todo = serde_json::from_value(row).unwrap();
        assert_eq!(todo.id, TodoId(7));
        assert!(todo.is_done);
        assert!(todo.owner.is_none());
    }

    #[test]
    fn test_patch_only_touches_set_fields() {
        let mut todo: Todo = serde_json::from_value(json!({
            "id": 1, "title": "a", "is_done": false, "created_at": "2024-03-01T10:00:00Z"
        }))
        .unwrap();

        TodoPatch::done(true).apply(&mut todo);
        assert!(todo.is_done);
        assert_eq!(todo.title, "a");

        TodoPatch::title("b").apply(&mut todo);
        assert_eq!(todo.title, "b");
        assert!(todo.is_done);

        assert_eq!(serde_json::to_value(TodoPatch::done(false)).unwrap(), json!({ "is_done": false }));
    }
}
