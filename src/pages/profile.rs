//! Profile page: the `users/me` details, change username and change password.
//!
//! SYSTEM CONTEXT
//! ==============
//! Details are loaded once on mount and reloaded after a username change.
//! A username change invalidates the current token (it names the old user),
//! so `net::api::change_username` logs in again and replaces the session.
//! A password change keeps the token; the current password is verified first
//! so a typo is reported before the backend checks the new password rules.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use leptos::prelude::*;

use crate::app::{use_api, use_session};
use crate::components::user_bar::UserBar;
use crate::components::username_check::{UsernameHint, use_username_check};
use crate::net::error::ApiError;
use crate::net::types::{ChangePasswordRequest, UserProfile};
use crate::state::auth::AuthState;

pub fn validate_username_change(
    new_username: &str,
    current_username: Option<&str>,
    password: &str,
) -> Result<(String, String), &'static str> {
    let new_username = new_username.trim();
    if new_username.is_empty() {
        return Err("Please enter a new username.");
    }
    if current_username == Some(new_username) {
        return Err("That is already your username.");
    }
    if password.is_empty() {
        return Err("Please enter your password to confirm.");
    }
    Ok((new_username.to_owned(), password.to_owned()))
}

/// Both new-password fields filled in and equal.
pub fn validate_password_pair(new_password: &str, confirm: &str) -> Result<String, &'static str> {
    if new_password.is_empty() || confirm.is_empty() {
        return Err("Please fill in both password fields.");
    }
    if new_password != confirm {
        return Err("Passwords do not match.");
    }
    Ok(new_password.to_owned())
}

pub fn validate_password_change(
    current: &str,
    new_password: &str,
    confirm: &str,
) -> Result<ChangePasswordRequest, &'static str> {
    if current.is_empty() {
        return Err("Please enter your current password.");
    }
    let new_password = validate_password_pair(new_password, confirm)?;
    if new_password == current {
        return Err("New password must differ from the current one.");
    }
    Ok(ChangePasswordRequest {
        current_password: current.to_owned(),
        confirm_new_password: new_password.clone(),
        new_password,
    })
}

/// Label/value pairs for the details card; absent fields read "Not provided".
pub fn profile_rows(profile: &UserProfile) -> Vec<(&'static str, String)> {
    let name = [profile.first_name.as_deref(), profile.last_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let fields = [
        ("Username", Some(profile.username.as_str())),
        ("Name", Some(name.as_str())),
        ("Email", profile.email.as_deref()),
        ("Role", profile.role_name.as_deref()),
        ("Address", profile.address.as_deref()),
        ("City", profile.city.as_deref()),
        ("State", profile.state.as_deref()),
        ("Country", profile.country.as_deref()),
        ("Postal code", profile.postal_code.as_deref()),
        ("Mobile", profile.mobile_number.as_deref()),
        ("Home phone", profile.home_number.as_deref()),
        ("Work phone", profile.work_number.as_deref()),
        ("Office phone", profile.office_number.as_deref()),
    ];
    fields
        .into_iter()
        .map(|(label, value)| {
            let value = value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or("Not provided");
            (label, value.to_owned())
        })
        .collect()
}

/// Prefer the backend's message for `field` over the generic one.
pub fn field_message(err: &ApiError, field: &str) -> String {
    err.violation(field).map_or_else(|| err.message.clone(), str::to_owned)
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let session = use_session();
    let api = use_api();

    let new_username = RwSignal::new(String::new());
    let username_password = RwSignal::new(String::new());
    let username_status = RwSignal::new(String::new());

    let current_password = RwSignal::new(String::new());
    let new_password = RwSignal::new(String::new());
    let confirm_password = RwSignal::new(String::new());
    let password_status = RwSignal::new(String::new());

    let busy = RwSignal::new(false);

    let details = RwSignal::new(None::<Result<UserProfile, String>>);
    let reload = RwSignal::new(0_u32);
    let check = use_username_check(new_username, move || {
        auth.with(|s| s.identity.as_ref().map(|i| i.username.clone()))
    });

    Effect::new(move || {
        reload.track();
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let loaded = crate::net::api::fetch_profile(&api.get_value()).await.map_err(|e| {
                log::warn!("profile load failed: {e}");
                "Failed to load profile.".to_owned()
            });
            details.set(Some(loaded));
        });
    });

    let on_change_username = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let current = auth.with(|s| s.identity.as_ref().map(|i| i.username.clone()));
        let (username_value, password_value) =
            match validate_username_change(&new_username.get(), current.as_deref(), &username_password.get()) {
                Ok(values) => values,
                Err(msg) => {
                    username_status.set(msg.to_owned());
                    return;
                }
            };
        if check.get().blocks_submit() {
            username_status.set("Username is not available or too short.".to_owned());
            return;
        }
        busy.set(true);
        username_status.set("Updating username...".to_owned());

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let api = api.get_value();
            let session = session.get_value();
            match crate::net::api::change_username(&api, &session, &username_value, &password_value).await {
                Ok(identity) => {
                    username_status.set(format!("Username changed to {}.", identity.username));
                    new_username.set(String::new());
                    username_password.set(String::new());
                    reload.update(|n| *n += 1);
                }
                Err(e) => username_status.set(field_message(&e, "username")),
            }
            busy.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = (username_value, password_value, session, api);
    };

    let on_change_password = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let request =
            match validate_password_change(&current_password.get(), &new_password.get(), &confirm_password.get()) {
                Ok(request) => request,
                Err(msg) => {
                    password_status.set(msg.to_owned());
                    return;
                }
            };
        busy.set(true);
        password_status.set("Updating password...".to_owned());

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let api = api.get_value();
            let outcome = match crate::net::api::verify_password(&api, &request.current_password).await {
                Ok(()) => crate::net::api::change_password(&api, &request).await,
                Err(e) if e.status == 400 || e.is_unauthorized() => {
                    password_status.set("Current password is incorrect.".to_owned());
                    busy.set(false);
                    return;
                }
                Err(e) => Err(e),
            };
            match outcome {
                Ok(()) => {
                    password_status.set("Password changed.".to_owned());
                    current_password.set(String::new());
                    new_password.set(String::new());
                    confirm_password.set(String::new());
                }
                Err(e) => password_status.set(field_message(&e, "newPassword")),
            }
            busy.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = request;
    };

    let password_input = move |placeholder: &'static str, autocomplete: &'static str, value: RwSignal<String>| {
        view! {
            <input
                class="profile-input"
                type="password"
                autocomplete=autocomplete
                placeholder=placeholder
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
        }
    };

    view! {
        <div class="profile-page">
            <UserBar/>
            <main class="profile-page__body">
                <section class="profile-section">
                    <h2>"Your details"</h2>
                    {move || match details.get() {
                        None => view! { <p class="profile-message">"Loading profile..."</p> }.into_any(),
                        Some(Err(reason)) => view! { <p class="profile-message">{reason}</p> }.into_any(),
                        Some(Ok(profile)) => {
                            view! {
                                <dl class="profile-details">
                                    {profile_rows(&profile)
                                        .into_iter()
                                        .map(|(label, value)| view! { <dt>{label}</dt><dd>{value}</dd> })
                                        .collect_view()}
                                </dl>
                            }
                                .into_any()
                        }
                    }}
                </section>
                <section class="profile-section">
                    <h2>"Change username"</h2>
                    <form class="profile-form" on:submit=on_change_username>
                        <input
                            class="profile-input"
                            type="text"
                            placeholder="New username"
                            prop:value=move || new_username.get()
                            on:input=move |ev| new_username.set(event_target_value(&ev))
                        />
                        <UsernameHint check=check/>
                        {password_input("Password", "current-password", username_password)}
                        <button class="btn" type="submit" disabled=move || busy.get()>"Save username"</button>
                    </form>
                    <p class="profile-message">{move || username_status.get()}</p>
                </section>
                <section class="profile-section">
                    <h2>"Change password"</h2>
                    <form class="profile-form" on:submit=on_change_password>
                        {password_input("Current password", "current-password", current_password)}
                        {password_input("New password", "new-password", new_password)}
                        {password_input("Confirm new password", "new-password", confirm_password)}
                        <button class="btn" type="submit" disabled=move || busy.get()>"Save password"</button>
                    </form>
                    <p class="profile-message">{move || password_status.get()}</p>
                </section>
            </main>
        </div>
    }
}
