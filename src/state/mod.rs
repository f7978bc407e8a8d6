//! Client-side session state.
//!
//! DESIGN
//! ======
//! Split leaves-first: `token_store` persists the credential,
//! `session_validator` turns it into an identity, `session` combines both
//! into the single source of truth, and `auth` holds the snapshot types the
//! UI reads.

pub mod auth;
pub mod session;
pub mod session_validator;
pub mod token_store;

#[cfg(test)]
pub(crate) mod test_helpers;
