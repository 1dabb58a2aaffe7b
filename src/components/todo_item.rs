//! Todo Item Component
//!
//! One row: checkbox, title with inline rename, delete.

use leptos::prelude::*;
use todo_core::domain::{Todo, TodoId};
use todo_core::EditDraft;

use crate::components::DeleteConfirmButton;

#[component]
pub fn TodoItem(
    todo: Todo,
    on_toggle: Callback<TodoId>,
    on_delete: Callback<TodoId>,
    on_rename: Callback<(TodoId, String)>,
) -> impl IntoView {
    let id = todo.id;
    let is_done = todo.is_done;
    let title = todo.title.clone();
    let created = todo.created_at.format("%b %e, %H:%M").to_string();
    let row_class = if is_done { "todo-row done" } else { "todo-row" };

    // Transient edit state, local to this row
    let (draft, set_draft) = signal::<Option<EditDraft>>(None);

    let begin_edit = {
        let title = title.clone();
        move || set_draft.set(Some(EditDraft::begin(&title)))
    };
    let cancel_edit = move || {
        if let Some(d) = draft.get_untracked() {
            log::debug!("rename of {id} cancelled, keeping {:?}", d.cancel());
        }
        set_draft.set(None);
    };
    let commit_edit = move || {
        let Some(d) = draft.get_untracked() else { return };
        set_draft.set(None);
        if let Some(new_title) = d.commit() {
            on_rename.run((id, new_title));
        }
    };

    view! {
        <li class=row_class>
            <Show
                when=move || draft.with(|d| d.is_some())
                fallback={
                    let title = title.clone();
                    let created = created.clone();
                    let begin_edit = begin_edit.clone();
                    move || {
                        let begin_dbl = begin_edit.clone();
                        let begin_btn = begin_edit.clone();
                        view! {
                            <input
                                type="checkbox"
                                prop:checked=is_done
                                on:change=move |_| on_toggle.run(id)
                            />
                            <span class="todo-title" on:dblclick=move |_| begin_dbl()>{title.clone()}</span>
                            <span class="todo-created">{created.clone()}</span>
                            <button class="edit-btn" on:click=move |_| begin_btn()>"Edit"</button>
                            <DeleteConfirmButton
                                todo_title=title.clone()
                                on_confirm=move |_: ()| on_delete.run(id)
                            />
                        }
                    }
                }
            >
                <input
                    class="todo-edit"
                    type="text"
                    prop:value=move || draft.with(|d| d.as_ref().map(|d| d.text().to_string()).unwrap_or_default())
                    on:input=move |ev| {
                        let text = event_target_value(&ev);
                        set_draft.update(|d| {
                            if let Some(d) = d {
                                d.set_text(text);
                            }
                        });
                    }
                    on:keydown=move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
                        "Enter" => commit_edit(),
                        "Escape" => cancel_edit(),
                        _ => {}
                    }
                />
                <button class="save-btn" on:click=move |_| commit_edit()>"Save"</button>
                <button class="cancel-btn" on:click=move |_| cancel_edit()>"Cancel"</button>
            </Show>
        </li>
    }
}
