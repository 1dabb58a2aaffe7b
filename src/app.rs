//! Todo Frontend App
//!
//! Reads the build-time configuration, connects the backend and routes to
//! either the session gate or the anonymous todo view.

use leptos::prelude::*;
use todo_core::domain::Scope;
use todo_core::AppConfig;

use crate::backend::Backend;
use crate::context::AppContext;
use crate::components::{SessionGateView, TodoView};

#[component]
pub fn App() -> impl IntoView {
    let config = match AppConfig::from_build_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("invalid configuration: {e}");
            return view! {
                <main class="app-layout">
                    <h1>"Todos"</h1>
                    <p class="config-error">{format!("Configuration error: {e}")}</p>
                </main>
            }
            .into_any();
        }
    };

    let backend = Backend::connect(&config);
    let demo = backend.is_demo();
    let ctx = AppContext::new(backend);
    provide_context(ctx);

    view! {
        <main class="app-layout">
            <h1>"Todos"</h1>
            {demo.then(|| view! {
                <p class="demo-notice">"Demo mode: todos live in this tab only."</p>
            })}
            {if ctx.requires_sign_in() {
                view! { <SessionGateView /> }.into_any()
            } else {
                view! { <TodoView scope=Scope::Everyone /> }.into_any()
            }}
        </main>
    }
    .into_any()
}
