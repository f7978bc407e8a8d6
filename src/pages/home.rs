//! Role home page.
//!
//! SYSTEM CONTEXT
//! ==============
//! Mounted under every role group; the route guard has already checked the
//! role, so this page only renders the identity it was admitted with. Staff
//! also get an account lookup leading to the transaction list.

#[cfg(test)]
#[path = "home_test.rs"]
mod home_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::components::user_bar::UserBar;
use crate::pages::transactions::transactions_path;
use crate::state::auth::{AuthState, Role};
use crate::util::auth::EMPLOYEE_ROLES;

/// Greeting line for the home header.
pub fn greeting(username: &str, role: Role) -> String {
    let area = match role {
        Role::Customer => "your accounts",
        Role::Teller => "the teller desk",
        Role::Manager => "branch management",
        Role::Admin => "administration",
    };
    format!("Welcome back, {username}. You are signed in to {area}.")
}

#[component]
pub fn HomePage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let navigate = use_navigate();
    let account_id = RwSignal::new(String::new());

    let message = move || {
        auth.with(|s| s.identity.as_ref().map(|i| greeting(&i.username, i.role)).unwrap_or_default())
    };
    let lookup_display = move || if auth.with(|s| s.has_role(EMPLOYEE_ROLES)) { "" } else { "none" };

    let on_lookup = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if let Some(path) = transactions_path(&account_id.get()) {
            navigate(&path, leptos_router::NavigateOptions::default());
        }
    };

    view! {
        <div class="home-page">
            <UserBar/>
            <main class="home-page__body">
                <p class="home-page__greeting">{message}</p>
                <form class="home-page__lookup" style:display=lookup_display on:submit=on_lookup>
                    <input
                        class="profile-input"
                        type="text"
                        placeholder="Account number"
                        prop:value=move || account_id.get()
                        on:input=move |ev| account_id.set(event_target_value(&ev))
                    />
                    <button class="btn" type="submit">"View transactions"</button>
                </form>
            </main>
        </div>
    }
}
