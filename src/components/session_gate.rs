//! Session Gate View
//!
//! Routes between the auth form and the signed-in todo view.

use leptos::prelude::*;
use leptos::task::spawn_local;
use todo_core::domain::{Principal, Scope};
use todo_core::{GateState, SessionGate};

use crate::components::{AuthForm, TodoView};
use crate::context::use_app_context;

#[component]
pub fn SessionGateView() -> impl IntoView {
    let ctx = use_app_context();
    let (gate_state, set_gate_state) = signal(GateState::Checking);

    // Only mounted when an auth provider is configured
    if let Some(auth) = ctx.auth() {
        let gate = SessionGate::start(auth, move |state| set_gate_state.set(state.clone()));
        spawn_local(gate.check_session());
        let gate = StoredValue::new_local(gate);
        on_cleanup(move || {
            gate.try_with_value(|g| g.teardown());
        });
    }

    move || match gate_state.get() {
        GateState::Checking => view! { <p class="gate-checking">"Checking session…"</p> }.into_any(),
        GateState::Unauthenticated => view! { <AuthForm /> }.into_any(),
        GateState::Authenticated(principal) => {
            let scope = Scope::Owner(principal.id.clone());
            view! {
                <SignedInHeader principal=principal />
                <TodoView scope=scope />
            }
            .into_any()
        }
    }
}

/// Current principal and sign-out button
#[component]
fn SignedInHeader(principal: Principal) -> impl IntoView {
    let ctx = use_app_context();
    let (signing_out, set_signing_out) = signal(false);

    let sign_out = move |_| {
        let Some(auth) = ctx.auth() else { return };
        set_signing_out.set(true);
        spawn_local(async move {
            if let Err(e) = auth.sign_out().await {
                log::warn!("sign-out failed: {e}");
            }
            set_signing_out.set(false);
        });
    };

    view! {
        <header class="session-header">
            <span class="session-user">{principal.display_name().to_string()}</span>
            <button class="sign-out-btn" on:click=sign_out disabled=move || signing_out.get()>
                "Sign out"
            </button>
        </header>
    }
}
