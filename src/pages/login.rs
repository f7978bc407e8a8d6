//! Login page: username + password sign-in and the forgot-password request.
//!
//! SYSTEM CONTEXT
//! ==============
//! A successful login hands the returned token and identity to the session as
//! a known identity (no validation round-trip), then navigates to the location
//! preserved in `?from=` by the route guard, or the role's home route.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_navigate, use_query_map};

use crate::app::{use_api, use_session};
use crate::net::error::ApiError;
use crate::state::auth::AuthState;
use crate::util::auth::post_login_destination;

/// Trim and require both login fields.
pub fn validate_login_input(username: &str, password: &str) -> Result<(String, String), &'static str> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err("Please enter your username and password.");
    }
    Ok((username.to_owned(), password.to_owned()))
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.char_indices().any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Trim and check an email address for the reset request.
pub fn validate_email(email: &str) -> Result<String, &'static str> {
    let email = email.trim();
    if is_valid_email(email) { Ok(email.to_owned()) } else { Err("Please enter a valid email address.") }
}

/// User-facing message for a failed login call.
pub fn login_error_message(err: &ApiError) -> String {
    if err.is_network() {
        "Unable to reach the server. Please try again.".to_owned()
    } else if err.is_unauthorized() {
        "Invalid username or password.".to_owned()
    } else {
        err.message.clone()
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let session = use_session();
    let api = use_api();
    let navigate = use_navigate();
    let query = use_query_map();
    let from = move || query.with(|q| q.get("from"));

    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let error = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);
    let forgot_mode = RwSignal::new(false);

    // Already signed in (e.g. back button after login): skip the form.
    let navigate_signed_in = navigate.clone();
    Effect::new(move || {
        let state = auth.get();
        if let Some(identity) = state.identity.as_ref().filter(|_| state.is_authenticated()) {
            let target = post_login_destination(from().as_deref(), identity.role);
            navigate_signed_in(&target, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });

    let on_login = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (username_value, password_value) = match validate_login_input(&username.get(), &password.get()) {
            Ok(values) => values,
            Err(msg) => {
                error.set(msg.to_owned());
                return;
            }
        };
        busy.set(true);
        error.set(String::new());

        #[cfg(feature = "hydrate")]
        {
            let navigate = navigate.clone();
            let from = from();
            leptos::task::spawn_local(async move {
                let api = api.get_value();
                match crate::net::api::login_with_password(&api, &username_value, &password_value).await {
                    Ok(login) => {
                        let identity = login.identity();
                        let target = post_login_destination(from.as_deref(), identity.role);
                        session
                            .get_value()
                            .login(crate::state::auth::LoginInput::KnownIdentity(login.credential(), identity))
                            .await;
                        password.set(String::new());
                        busy.set(false);
                        navigate(&target, NavigateOptions { replace: true, ..NavigateOptions::default() });
                    }
                    Err(e) => {
                        error.set(login_error_message(&e));
                        busy.set(false);
                    }
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = (username_value, password_value, &navigate, session, api);
    };

    let on_forgot = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let email_value = match validate_email(&email.get()) {
            Ok(value) => value,
            Err(msg) => {
                error.set(msg.to_owned());
                return;
            }
        };
        busy.set(true);
        error.set(String::new());
        info.set("Sending reset link...".to_owned());

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match crate::net::api::forgot_password(&api.get_value(), &email_value).await {
                Ok(()) => info.set("If an account exists for that email, a reset link is on its way.".to_owned()),
                Err(e) => {
                    info.set(String::new());
                    error.set(e.message);
                }
            }
            busy.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = email_value;
    };

    let toggle_mode = move |_| {
        forgot_mode.update(|m| *m = !*m);
        error.set(String::new());
        info.set(String::new());
    };

    let hidden_when = move |forgot: bool| move || if forgot_mode.get() == forgot { "" } else { "none" };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Bank"</h1>
                <div class="login-section" style:display=hidden_when(false)>
                    <p class="login-card__subtitle">"Sign in to your account"</p>
                    <form class="login-form" on:submit=on_login>
                        <input
                            class="login-input"
                            type="text"
                            autocomplete="username"
                            placeholder="Username"
                            prop:value=move || username.get()
                            on:input=move |ev| username.set(event_target_value(&ev))
                        />
                        <input
                            class="login-input"
                            type="password"
                            autocomplete="current-password"
                            placeholder="Password"
                            prop:value=move || password.get()
                            on:input=move |ev| password.set(event_target_value(&ev))
                        />
                        <button class="login-button" type="submit" disabled=move || busy.get()>
                            {move || if busy.get() { "Signing in..." } else { "Sign In" }}
                        </button>
                    </form>
                </div>
                <div class="login-section" style:display=hidden_when(true)>
                    <p class="login-card__subtitle">"Reset your password"</p>
                    <form class="login-form" on:submit=on_forgot>
                        <input
                            class="login-input"
                            type="email"
                            placeholder="you@bank.test"
                            prop:value=move || email.get()
                            on:input=move |ev| email.set(event_target_value(&ev))
                        />
                        <button class="login-button" type="submit" disabled=move || busy.get()>
                            "Send Reset Link"
                        </button>
                    </form>
                </div>
                <Show when=move || !error.get().is_empty()>
                    <p class="login-message login-message--error">{move || error.get()}</p>
                </Show>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <button class="login-link" type="button" on:click=toggle_mode>
                    {move || if forgot_mode.get() { "Back to sign in" } else { "Forgot password?" }}
                </button>
            </div>
        </div>
    }
}
