//! Delete Confirm Button Component
//!
//! Two-step delete for a todo row. Nothing is sent until the user confirms.

use leptos::prelude::*;

#[component]
pub fn DeleteConfirmButton(
    /// Title of the todo, shown in the prompt
    #[prop(into)]
    todo_title: String,
    #[prop(into)] on_confirm: Callback<()>,
) -> impl IntoView {
    let (asking, set_asking) = signal(false);
    let label = format!("Delete \"{todo_title}\"");

    view! {
        <Show
            when=move || asking.get()
            fallback=move || view! {
                <button
                    class="delete-btn"
                    title=label.clone()
                    on:click=move |_| set_asking.set(true)
                >
                    "Delete"
                </button>
            }
        >
            <span class="delete-confirm">
                <span class="delete-confirm-text">"Delete this todo?"</span>
                <button
                    class="confirm-btn"
                    on:click=move |_| {
                        set_asking.set(false);
                        on_confirm.run(());
                    }
                >
                    "Yes"
                </button>
                <button class="keep-btn" on:click=move |_| set_asking.set(false)>
                    "Keep"
                </button>
            </span>
        </Show>
    }
}
