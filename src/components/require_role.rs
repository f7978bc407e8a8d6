//! Authorization gate for role-scoped route groups.
//!
//! SYSTEM CONTEXT
//! ==============
//! Mounted as the view of each gated `ParentRoute`. The access rule comes from
//! the route table in `util::auth`, keyed by the current path, so nested
//! routes inherit their group's rule without repeating it.

use leptos::prelude::*;
use leptos_router::components::Outlet;
use leptos_router::hooks::{use_location, use_navigate};

use crate::state::auth::AuthState;
use crate::util::auth::{GuardDecision, evaluate_route, install_route_guard, route_access};

/// Renders the nested route once the session allows it; redirects otherwise.
#[component]
pub fn RequireRole() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let location = use_location();

    let decision = Memo::new(move |_| {
        let path = location.pathname.get();
        let search = location.search.get();
        let search = search.trim_start_matches('?');
        let requested = if search.is_empty() { path.clone() } else { format!("{path}?{search}") };
        auth.with(|state| evaluate_route(state, route_access(&path), &requested))
    });

    install_route_guard(move || decision.get(), use_navigate());

    move || match decision.get() {
        GuardDecision::Allowed => view! { <Outlet/> }.into_any(),
        GuardDecision::Pending => {
            view! { <p class="route-guard route-guard--pending">"Checking authentication..."</p> }.into_any()
        }
        GuardDecision::DeniedUnauthenticated { .. } | GuardDecision::DeniedForbidden => {
            view! { <p class="route-guard">"Redirecting..."</p> }.into_any()
        }
    }
}
