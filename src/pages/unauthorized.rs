//! Shown when a signed-in user opens a route outside their role.

use leptos::prelude::*;

use crate::state::auth::AuthState;

#[component]
pub fn UnauthorizedPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let back = move || auth.with(|s| s.identity.as_ref().map_or("/", |i| i.role.home_path()));

    view! {
        <div class="unauthorized-page">
            <h1>"Access denied"</h1>
            <p>"Your account does not have permission to view that page."</p>
            <a class="btn" href=back>"Back to safety"</a>
        </div>
    }
}
