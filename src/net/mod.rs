//! Networking modules for the REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` is the HTTP boundary, `client` attaches session credentials
//! and normalizes failures through `error`, `api` holds the typed endpoints,
//! and `types` defines the wire schema.

pub mod api;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
