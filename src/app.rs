//! Root application component with routing and context providers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` builds the one `AuthSession` for this application instance and the
//! API client bound to it. Both hold `Rc` state, so they live in local
//! `StoredValue`s; the reactive `RwSignal<AuthState>` mirrors every session
//! change for components and the route guard.

use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    ParamSegment, StaticSegment,
    components::{ParentRoute, Route, Router, Routes},
};

use crate::components::require_role::RequireRole;
use crate::config::ClientConfig;
use crate::net::api::HttpAuthBackend;
use crate::net::client::ApiClient;
use crate::net::transport::default_transport;
use crate::pages::{
    home::HomePage, landing::LandingPage, login::LoginPage, profile::ProfilePage, register::RegisterPage,
    reset_password::ResetPasswordPage, transactions::TransactionsPage, unauthorized::UnauthorizedPage,
};
use crate::state::session::AuthSession;
use crate::state::session_validator::AuthBackend;
use crate::state::token_store::default_token_store;

/// Context handle to the application's session.
pub type SessionHandle = StoredValue<AuthSession, LocalStorage>;
/// Context handle to the session-bound API client.
pub type ApiHandle = StoredValue<ApiClient, LocalStorage>;

pub fn use_session() -> SessionHandle {
    expect_context::<SessionHandle>()
}

pub fn use_api() -> ApiHandle {
    expect_context::<ApiHandle>()
}

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = ClientConfig::from_build_env();
    let api = ApiClient::new(&config.api_base_url, default_transport());
    let backend: Rc<dyn AuthBackend> = Rc::new(HttpAuthBackend::new(api.clone()));
    let session = AuthSession::new(default_token_store(&config.token_key), backend, config.retry);

    let auth = RwSignal::new(session.state());
    session.subscribe(move |state| auth.set(state.clone()));

    provide_context(auth);
    provide_context::<ApiHandle>(StoredValue::new_local(api.with_session(session.clone())));
    provide_context::<SessionHandle>(StoredValue::new_local(session.clone()));

    // The server has no stored credential to check; it renders the pending
    // state and the browser settles it after hydration.
    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move { session.bootstrap().await });
    #[cfg(not(feature = "hydrate"))]
    drop(session);

    view! {
        <Stylesheet id="leptos" href="/pkg/bank-ui.css"/>
        <Title text="Bank"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("") view=LandingPage/>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route path=StaticSegment("register") view=RegisterPage/>
                <Route path=StaticSegment("reset-password") view=ResetPasswordPage/>
                <Route path=StaticSegment("unauthorized") view=UnauthorizedPage/>
                <ParentRoute path=StaticSegment("customer") view=RequireRole>
                    <Route path=StaticSegment("home") view=HomePage/>
                    <Route path=StaticSegment("profile") view=ProfilePage/>
                </ParentRoute>
                <ParentRoute path=StaticSegment("admin") view=RequireRole>
                    <Route path=StaticSegment("home") view=HomePage/>
                </ParentRoute>
                <ParentRoute path=StaticSegment("teller") view=RequireRole>
                    <Route path=StaticSegment("home") view=HomePage/>
                </ParentRoute>
                <ParentRoute path=StaticSegment("manager") view=RequireRole>
                    <Route path=StaticSegment("home") view=HomePage/>
                </ParentRoute>
                <ParentRoute path=StaticSegment("employee") view=RequireRole>
                    <Route path=StaticSegment("profile") view=ProfilePage/>
                </ParentRoute>
                <ParentRoute path=(StaticSegment("accounts"), ParamSegment("id")) view=RequireRole>
                    <Route path=StaticSegment("transactions") view=TransactionsPage/>
                </ParentRoute>
            </Routes>
        </Router>
    }
}
