//! Todo View
//!
//! Owns the synchronization flow for one scope and wires it to the
//! reactive store. Torn down on sign-out.

use leptos::prelude::*;
use reactive_stores::Store;
use todo_core::domain::{Scope, TodoId};
use todo_core::TodoSync;

use crate::components::{ErrorBanner, NewTodoForm, TodoList};
use crate::context::{use_app_context, TodoActions};
use crate::store::{store_apply, TodoViewState, TodoViewStateStoreFields};

#[component]
pub fn TodoView(scope: Scope) -> impl IntoView {
    let ctx = use_app_context();

    let view_state = Store::new(TodoViewState::default());
    provide_context(view_state);

    let sync = TodoSync::new(ctx.remote_store(), scope);
    sync.set_observer(move |state| store_apply(&view_state, state));
    let actions = TodoActions::new(sync);
    provide_context(actions);

    // Initial load
    actions.reload();
    on_cleanup(move || actions.detach());

    let on_toggle = move |id: TodoId| actions.toggle(id);
    let on_delete = move |id: TodoId| actions.delete(id);
    let on_rename = move |(id, title): (TodoId, String)| actions.rename(id, title);

    let todos = Signal::derive(move || view_state.todos().get());
    let summary = move || {
        format!("{} of {} remaining", view_state.remaining().get(), view_state.total().get())
    };

    view! {
        <section class="todo-view">
            <ErrorBanner />
            <NewTodoForm />
            <Show when=move || view_state.loading().get()>
                <p class="loading">"Loading…"</p>
            </Show>
            <TodoList
                todos=todos
                on_toggle=on_toggle
                on_delete=on_delete
                on_rename=on_rename
            />
            <p class="todo-count">{summary}</p>
        </section>
    }
}
