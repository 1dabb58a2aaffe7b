//! Todo List Component
//!
//! Pure render of the collection; intents go up through callbacks.

use leptos::prelude::*;
use todo_core::domain::{Todo, TodoId};

use crate::components::TodoItem;

#[component]
pub fn TodoList(
    #[prop(into)] todos: Signal<Vec<Todo>>,
    #[prop(into)] on_toggle: Callback<TodoId>,
    #[prop(into)] on_delete: Callback<TodoId>,
    #[prop(into)] on_rename: Callback<(TodoId, String)>,
) -> impl IntoView {
    view! {
        <Show
            when=move || !todos.with(|t| t.is_empty())
            fallback=|| view! { <p class="empty-list">"No todos yet."</p> }
        >
            <ul class="todo-list">
                // Keyed on content so a confirmed patch re-renders the row
                <For
                    each=move || todos.get()
                    key=|todo| (todo.id, todo.is_done, todo.title.clone())
                    children=move |todo| view! {
                        <TodoItem
                            todo=todo
                            on_toggle=on_toggle
                            on_delete=on_delete
                            on_rename=on_rename
                        />
                    }
                />
            </ul>
        </Show>
    }
}
