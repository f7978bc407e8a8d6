//! # bank-ui
//!
//! Leptos + WASM front-end for the role-based banking application.
//!
//! This crate contains the session/authorization core (token store, session
//! validator, auth session), the role-gated route guard, the authenticated
//! REST client, and the pages that drive login, logout and re-authentication.
//! The session core is DOM-free so it builds and tests natively; browser
//! glue lives behind the `hydrate` feature and the SSR shell behind `ssr`.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: installs browser logging and hydrates the SSR shell.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
