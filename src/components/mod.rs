//! UI Components
//!
//! Reusable Leptos components.

mod auth_form;
mod delete_confirm_button;
mod error_banner;
mod new_todo_form;
mod session_gate;
mod todo_item;
mod todo_list;
mod todo_view;

pub use auth_form::AuthForm;
pub use delete_confirm_button::DeleteConfirmButton;
pub use error_banner::ErrorBanner;
pub use new_todo_form::NewTodoForm;
pub use session_gate::SessionGateView;
pub use todo_item::TodoItem;
pub use todo_list::TodoList;
pub use todo_view::TodoView;
