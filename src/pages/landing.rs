//! Public landing page.

use leptos::prelude::*;

use crate::state::auth::AuthState;

#[component]
pub fn LandingPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let home = move || auth.with(|s| s.identity.as_ref().map(|i| i.role.home_path()));

    view! {
        <div class="landing-page">
            <h1>"Bank"</h1>
            <p class="landing-page__subtitle">"Accounts, transfers and statements in one place."</p>
            {move || match home() {
                Some(path) => view! { <a class="btn" href=path>"Continue to your dashboard"</a> }.into_any(),
                None => view! { <a class="btn" href="/login">"Sign in"</a> }.into_any(),
            }}
        </div>
    }
}
