//! Reset-password page reached from the emailed `?token=` link.

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::app::use_api;
use crate::pages::profile::validate_password_pair;

#[derive(Clone, Debug, PartialEq, Eq)]
enum TokenCheck {
    Checking,
    Valid,
    Invalid(String),
    Done,
}

#[component]
pub fn ResetPasswordPage() -> impl IntoView {
    let api = use_api();
    let query = use_query_map();
    let token = move || query.with_untracked(|q| q.get("token")).filter(|t| !t.is_empty());

    let check = RwSignal::new(TokenCheck::Checking);
    let new_password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let message = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    match token() {
        None => check.set(TokenCheck::Invalid("This reset link is missing its token.".to_owned())),
        Some(token_value) => {
            #[cfg(feature = "hydrate")]
            leptos::task::spawn_local(async move {
                match crate::net::api::check_reset_token(&api.get_value(), &token_value).await {
                    Ok(()) => check.set(TokenCheck::Valid),
                    Err(e) => check.set(TokenCheck::Invalid(e.message)),
                }
            });
            #[cfg(not(feature = "hydrate"))]
            let _ = token_value;
        }
    }

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let Some(token_value) = token() else {
            return;
        };
        let password = match validate_password_pair(&new_password.get(), &confirm.get()) {
            Ok(password) => password,
            Err(msg) => {
                message.set(msg.to_owned());
                return;
            }
        };
        busy.set(true);
        message.set(String::new());

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match crate::net::api::reset_password(&api.get_value(), &token_value, &password).await {
                Ok(()) => check.set(TokenCheck::Done),
                Err(e) => message.set(crate::pages::profile::field_message(&e, "newPassword")),
            }
            busy.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = (token_value, password, api);
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Reset password"</h1>
                {move || match check.get() {
                    TokenCheck::Checking => view! { <p class="login-message">"Checking reset link..."</p> }.into_any(),
                    TokenCheck::Invalid(reason) => {
                        view! {
                            <p class="login-message login-message--error">{reason}</p>
                            <a class="login-link" href="/login">"Request a new link"</a>
                        }
                            .into_any()
                    }
                    TokenCheck::Done => {
                        view! {
                            <p class="login-message">"Your password has been reset."</p>
                            <a class="login-button" href="/login">"Sign in"</a>
                        }
                            .into_any()
                    }
                    TokenCheck::Valid => {
                        view! {
                            <form class="login-form" on:submit=on_submit>
                                <input
                                    class="login-input"
                                    type="password"
                                    autocomplete="new-password"
                                    placeholder="New password"
                                    prop:value=move || new_password.get()
                                    on:input=move |ev| new_password.set(event_target_value(&ev))
                                />
                                <input
                                    class="login-input"
                                    type="password"
                                    autocomplete="new-password"
                                    placeholder="Confirm new password"
                                    prop:value=move || confirm.get()
                                    on:input=move |ev| confirm.set(event_target_value(&ev))
                                />
                                <button class="login-button" type="submit" disabled=move || busy.get()>
                                    "Reset Password"
                                </button>
                            </form>
                            <p class="login-message">{move || message.get()}</p>
                        }
                            .into_any()
                    }
                }}
            </div>
        </div>
    }
}
