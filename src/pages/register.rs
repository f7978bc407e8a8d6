//! Self-service registration for new customers.
//!
//! The username field carries a debounced availability hint; the backend
//! stays the authority and its 409 message is shown if the name was taken in
//! the meantime. A successful sign-up goes to the login page.

#[cfg(test)]
#[path = "register_test.rs"]
mod register_test;

use leptos::prelude::*;
#[cfg(feature = "hydrate")]
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::app::use_api;
use crate::components::username_check::{UsernameCheck, UsernameHint, use_username_check};
use crate::net::types::RegisterRequest;
use crate::pages::login::is_valid_email;
use crate::pages::profile::validate_password_pair;

pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
    confirm: &str,
    check: UsernameCheck,
) -> Result<RegisterRequest, &'static str> {
    let username = username.trim();
    let email = email.trim();
    if username.is_empty() || email.is_empty() {
        return Err("Please fill in every field.");
    }
    if check.blocks_submit() {
        return Err(match check {
            UsernameCheck::Checking => "Still checking that username, please wait.",
            _ => "Username is not available or too short.",
        });
    }
    if !is_valid_email(email) {
        return Err("Please enter a valid email address.");
    }
    let password = validate_password_pair(password, confirm)?;
    Ok(RegisterRequest { username: username.to_owned(), email: email.to_owned(), password })
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let api = use_api();
    let navigate = use_navigate();

    let username = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let error = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let check = use_username_check(username, || None);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let request =
            match validate_registration(&username.get(), &email.get(), &password.get(), &confirm.get(), check.get()) {
                Ok(request) => request,
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
            leptos::task::spawn_local(async move {
                match crate::net::api::register(&api.get_value(), &request).await {
                    Ok(confirmation) => {
                        log::info!("registered {}: {confirmation}", request.username);
                        busy.set(false);
                        navigate(crate::util::auth::LOGIN_PATH, NavigateOptions::default());
                    }
                    Err(e) => {
                        error.set(if e.is_network() {
                            "Network error, please try again later.".to_owned()
                        } else {
                            crate::pages::profile::field_message(&e, "username")
                        });
                        busy.set(false);
                    }
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = (request, &navigate, api);
    };

    let text_input = |kind: &'static str,
                      placeholder: &'static str,
                      autocomplete: &'static str,
                      value: RwSignal<String>| {
        view! {
            <input
                class="login-input"
                type=kind
                autocomplete=autocomplete
                placeholder=placeholder
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Open an account"</h1>
                <form class="login-form" on:submit=on_submit>
                    {text_input("text", "Username", "username", username)}
                    <UsernameHint check=check/>
                    {text_input("email", "you@bank.test", "email", email)}
                    {text_input("password", "Password", "new-password", password)}
                    {text_input("password", "Confirm password", "new-password", confirm)}
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Creating account..." } else { "Register" }}
                    </button>
                </form>
                <Show when=move || !error.get().is_empty()>
                    <p class="login-message login-message--error">{move || error.get()}</p>
                </Show>
                <a class="login-link" href="/login">"Already have an account? Sign in"</a>
            </div>
        </div>
    }
}
