//! Error Banner Component
//!
//! Shows the latest sync failure with a dismiss button.

use leptos::prelude::*;

use crate::context::use_todo_actions;
use crate::store::{use_todo_store, TodoViewStateStoreFields};

#[component]
pub fn ErrorBanner() -> impl IntoView {
    let store = use_todo_store();
    let actions = use_todo_actions();

    move || {
        store.error().get().map(|message| {
            view! {
                <div class="error-banner" role="alert">
                    <span>{message}</span>
                    <button class="dismiss-btn" on:click=move |_| actions.dismiss_error()>"×"</button>
                </div>
            }
        })
    }
}
