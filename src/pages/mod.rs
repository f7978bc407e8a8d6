//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration (form state, API calls, session
//! updates, navigation) and keeps input validation in plain functions so it
//! can be tested without a DOM.

pub mod home;
pub mod landing;
pub mod login;
pub mod profile;
pub mod register;
pub mod reset_password;
pub mod transactions;
pub mod unauthorized;
