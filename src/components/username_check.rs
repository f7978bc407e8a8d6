//! Debounced username availability hint shared by registration and profile.
//!
//! Every keystroke bumps a generation counter; a check only lands if no newer
//! keystroke arrived while it was waiting or in flight.

#[cfg(test)]
#[path = "username_check_test.rs"]
mod username_check_test;

use std::time::Duration;

use leptos::prelude::*;

use crate::app::use_api;
use crate::net::api::MIN_USERNAME_LEN;
use crate::net::error::ApiError;

pub const USERNAME_CHECK_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UsernameCheck {
    Idle,
    TooShort,
    Checking,
    Available,
    Taken,
    /// The backend could not answer; the submit itself will tell.
    Unknown,
}

impl UsernameCheck {
    /// State for a freshly typed value, before any request is made.
    pub fn for_input(candidate: &str, current: Option<&str>) -> Self {
        let candidate = candidate.trim();
        if candidate.is_empty() || current == Some(candidate) {
            Self::Idle
        } else if candidate.chars().count() < MIN_USERNAME_LEN {
            Self::TooShort
        } else {
            Self::Checking
        }
    }

    pub fn from_reply(reply: Result<bool, ApiError>) -> Self {
        match reply {
            Ok(true) => Self::Available,
            Ok(false) => Self::Taken,
            Err(e) => {
                log::debug!("username availability unknown: {e}");
                Self::Unknown
            }
        }
    }

    pub fn blocks_submit(self) -> bool {
        matches!(self, Self::TooShort | Self::Checking | Self::Taken)
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::TooShort => "Username must be at least 3 characters.",
            Self::Checking => "Checking availability...",
            Self::Available => "Username is available.",
            Self::Taken => "Username is already taken.",
            Self::Unknown => "Could not check availability right now.",
        }
    }
}

/// Track availability of `candidate`, skipping the signed-in user's own name.
pub fn use_username_check(
    candidate: RwSignal<String>,
    current: impl Fn() -> Option<String> + 'static,
) -> ReadSignal<UsernameCheck> {
    let api = use_api();
    let (check, set_check) = signal(UsernameCheck::Idle);
    let generation = StoredValue::new(0_u64);

    Effect::new(move || {
        let value = candidate.get();
        generation.update_value(|g| *g += 1);
        let state = UsernameCheck::for_input(&value, current().as_deref());
        set_check.set(state);
        if state != UsernameCheck::Checking {
            return;
        }
        let ticket = generation.get_value();

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            crate::util::timer::sleep(USERNAME_CHECK_DEBOUNCE).await;
            if generation.get_value() != ticket {
                return;
            }
            let reply = crate::net::api::check_username_available(&api.get_value(), &value).await;
            if generation.get_value() == ticket {
                set_check.set(UsernameCheck::from_reply(reply));
            }
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = (ticket, api);
    });

    check
}

#[component]
pub fn UsernameHint(check: ReadSignal<UsernameCheck>) -> impl IntoView {
    let class = move || match check.get() {
        UsernameCheck::Available => "field-hint field-hint--ok",
        UsernameCheck::TooShort | UsernameCheck::Taken => "field-hint field-hint--error",
        _ => "field-hint",
    };
    view! { <p class=class>{move || check.get().message()}</p> }
}
