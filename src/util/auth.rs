//! Route authorization helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every gated route group runs the same decision: wait while the session is
//! still bootstrapping, send anonymous visitors to `/login` with the requested
//! location preserved, send the wrong role to `/unauthorized`, otherwise
//! render. The decision is a pure function of the `AuthState` snapshot so the
//! guard component only wires it to the router.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::state::auth::{AuthState, Role};
use crate::util::url::encode_component;

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Staff roles allowed into the shared employee area.
pub const EMPLOYEE_ROLES: &[Role] = &[Role::Admin, Role::Manager, Role::Teller];

const PUBLIC_PATHS: &[&str] = &["/", LOGIN_PATH, "/register", "/reset-password", UNAUTHORIZED_PATH];

/// Who may render a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    /// Any signed-in identity.
    Authenticated,
    /// Signed in with one of these roles.
    Roles(&'static [Role]),
}

/// Outcome of one navigation attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still bootstrapping; render a placeholder and decide later.
    Pending,
    /// Not signed in; `from` is the location to return to after login.
    DeniedUnauthenticated { from: String },
    DeniedForbidden,
    Allowed,
}

impl GuardDecision {
    /// Where the router should go instead, if anywhere.
    pub fn redirect_target(&self) -> Option<String> {
        match self {
            Self::DeniedUnauthenticated { from } => Some(login_redirect_path(from)),
            Self::DeniedForbidden => Some(UNAUTHORIZED_PATH.to_owned()),
            Self::Pending | Self::Allowed => None,
        }
    }
}

/// Decide whether `requested` may render under `access` for this snapshot.
///
/// Role membership is never looked at while the session is loading, so a
/// stored credential is not bounced before its identity is known.
pub fn evaluate_route(state: &AuthState, access: RouteAccess, requested: &str) -> GuardDecision {
    if access == RouteAccess::Public {
        return GuardDecision::Allowed;
    }
    if state.loading() {
        return GuardDecision::Pending;
    }
    if !state.is_authenticated() {
        return GuardDecision::DeniedUnauthenticated { from: requested.to_owned() };
    }
    match access {
        RouteAccess::Roles(roles) if !state.has_role(roles) => GuardDecision::DeniedForbidden,
        _ => GuardDecision::Allowed,
    }
}

/// Access rule for an app path (query string excluded).
pub fn route_access(path: &str) -> RouteAccess {
    let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };
    if PUBLIC_PATHS.contains(&path) {
        return RouteAccess::Public;
    }
    let mut segments = path.trim_start_matches('/').split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some("customer"), ..) => RouteAccess::Roles(&[Role::Customer]),
        (Some("admin"), ..) => RouteAccess::Roles(&[Role::Admin]),
        (Some("teller"), ..) => RouteAccess::Roles(&[Role::Teller]),
        (Some("manager"), ..) => RouteAccess::Roles(&[Role::Manager]),
        (Some("employee"), ..) | (Some("accounts"), Some(_), Some("transactions")) => {
            RouteAccess::Roles(EMPLOYEE_ROLES)
        }
        _ => RouteAccess::Authenticated,
    }
}

pub fn login_redirect_path(from: &str) -> String {
    format!("{LOGIN_PATH}?from={}", encode_component(from))
}

/// Where to go after a successful login.
///
/// A preserved `from` location wins when it is a same-origin app path;
/// anything else (absent, external, or the login page itself) falls back to
/// the role's home route.
pub fn post_login_destination(from: Option<&str>, role: Role) -> String {
    match from {
        Some(from) if is_safe_return_path(from) => from.to_owned(),
        _ => role.home_path().to_owned(),
    }
}

fn is_safe_return_path(path: &str) -> bool {
    let route = path.split(['?', '#']).next().unwrap_or(path).trim_end_matches('/');
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') && route != LOGIN_PATH
}

/// Re-run `decision` on every state change and replace the current history
/// entry whenever it says to redirect.
pub fn install_route_guard<D, F>(decision: D, navigate: F)
where
    D: Fn() -> GuardDecision + 'static,
    F: Fn(&str, NavigateOptions) + 'static,
{
    Effect::new(move || {
        if let Some(target) = decision().redirect_target() {
            leptos::logging::log!("route guard redirecting to {target}");
            navigate(&target, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
}
