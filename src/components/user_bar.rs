//! Header strip showing the signed-in identity with navigation and logout.

use leptos::prelude::*;
#[cfg(feature = "hydrate")]
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::app::use_session;
use crate::state::auth::AuthState;
#[cfg(feature = "hydrate")]
use crate::state::session::LogoutOptions;
#[cfg(feature = "hydrate")]
use crate::util::auth::LOGIN_PATH;

/// Profile route for the signed-in role; staff share the employee area.
pub fn profile_path(state: &AuthState) -> &'static str {
    match state.identity.as_ref().map(|identity| identity.role) {
        Some(crate::state::auth::Role::Customer) => "/customer/profile",
        Some(_) => "/employee/profile",
        None => "/login",
    }
}

#[component]
pub fn UserBar() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let session = use_session();
    let navigate = use_navigate();

    let username = move || auth.with(|s| s.identity.as_ref().map(|i| i.username.clone()).unwrap_or_default());
    let role = move || auth.with(|s| s.identity.as_ref().map(|i| i.role.to_string()).unwrap_or_default());
    let home = move || auth.with(|s| s.identity.as_ref().map_or("/", |i| i.role.home_path()));
    let profile = move || auth.with(profile_path);

    let on_logout = move |_| {
        #[cfg(feature = "hydrate")]
        {
            let session = session.get_value();
            let navigate = navigate.clone();
            leptos::task::spawn_local(async move {
                session.logout(LogoutOptions::default()).await;
                navigate(LOGIN_PATH, NavigateOptions { replace: true, ..NavigateOptions::default() });
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = (&session, &navigate);
    };

    view! {
        <header class="user-bar">
            <a class="user-bar__home" href=home>"Bank"</a>
            <span class="user-bar__spacer"></span>
            <span class="user-bar__self">
                {username}
                " ("
                <span class="user-bar__role">{role}</span>
                ")"
            </span>
            <a class="user-bar__profile" href=profile>"Profile"</a>
            <button class="btn user-bar__logout" on:click=on_logout title="Logout">
                "Logout"
            </button>
        </header>
    }
}
