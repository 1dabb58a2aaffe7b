//! Auth Form Component
//!
//! Email/password sign-in and sign-up. A successful sign-in is picked up
//! by the session gate through its subscription; this form only reports
//! failures and the pending-confirmation notice.

use leptos::prelude::*;
use leptos::task::spawn_local;
use todo_core::domain::{Credentials, SignUpOutcome};

use crate::context::use_app_context;

#[derive(Clone, Copy, PartialEq)]
enum AuthMode {
    SignIn,
    SignUp,
}

#[component]
pub fn AuthForm() -> impl IntoView {
    let ctx = use_app_context();

    let (mode, set_mode) = signal(AuthMode::SignIn);
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (error, set_error) = signal::<Option<String>>(None);
    let (notice, set_notice) = signal::<Option<String>>(None);
    let (busy, set_busy) = signal(false);

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        set_error.set(None);
        set_notice.set(None);

        let credentials = match Credentials::new(&email.get_untracked(), &password.get_untracked()) {
            Ok(c) => c,
            Err(e) => {
                set_error.set(Some(e.to_string()));
                return;
            }
        };
        let Some(auth) = ctx.auth() else { return };
        let current_mode = mode.get_untracked();
        set_busy.set(true);

        spawn_local(async move {
            match current_mode {
                AuthMode::SignIn => {
                    if let Err(e) = auth.sign_in(&credentials).await {
                        set_error.set(Some(e.to_string()));
                    }
                }
                AuthMode::SignUp => match auth.sign_up(&credentials).await {
                    Ok(SignUpOutcome::SignedIn(_)) => {}
                    Ok(SignUpOutcome::PendingConfirmation) => {
                        set_notice.set(Some(
                            "Check your email to confirm your account, then sign in.".to_string(),
                        ));
                        set_mode.set(AuthMode::SignIn);
                    }
                    Err(e) => set_error.set(Some(e.to_string())),
                },
            }
            set_password.set(String::new());
            set_busy.set(false);
        });
    };

    let toggle_mode = move |_| {
        set_error.set(None);
        set_mode.update(|m| {
            *m = if *m == AuthMode::SignIn { AuthMode::SignUp } else { AuthMode::SignIn }
        });
    };

    view! {
        <form class="auth-form" on:submit=submit>
            <h2>{move || if mode.get() == AuthMode::SignIn { "Sign in" } else { "Create account" }}</h2>
            <input
                type="email"
                placeholder="Email"
                autocomplete="email"
                prop:value=move || email.get()
                on:input=move |ev| set_email.set(event_target_value(&ev))
            />
            <input
                type="password"
                placeholder="Password"
                prop:value=move || password.get()
                on:input=move |ev| set_password.set(event_target_value(&ev))
            />
            <button type="submit" disabled=move || busy.get()>
                {move || if mode.get() == AuthMode::SignIn { "Sign in" } else { "Sign up" }}
            </button>
            <button type="button" class="link-btn" on:click=toggle_mode>
                {move || if mode.get() == AuthMode::SignIn {
                    "No account? Sign up"
                } else {
                    "Have an account? Sign in"
                }}
            </button>
            {move || error.get().map(|e| view! { <p class="auth-error">{e}</p> })}
            {move || notice.get().map(|n| view! { <p class="auth-notice">{n}</p> })}
        </form>
    }
}
