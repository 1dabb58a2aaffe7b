//! New Todo Form Component
//!
//! The input is cleared only after the server confirmed the insert.

use leptos::prelude::*;

use crate::context::use_todo_actions;

#[component]
pub fn NewTodoForm() -> impl IntoView {
    let actions = use_todo_actions();
    let (new_text, set_new_text) = signal(String::new());

    let create_todo = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let text = new_text.get_untracked();
        if text.trim().is_empty() {
            return;
        }
        actions.add(text, move || set_new_text.set(String::new()));
    };

    view! {
        <form class="new-todo-form" on:submit=create_todo>
            <input
                type="text"
                placeholder="What needs doing?"
                prop:value=move || new_text.get()
                on:input=move |ev| set_new_text.set(event_target_value(&ev))
            />
            <button type="submit">"Add"</button>
        </form>
    }
}
