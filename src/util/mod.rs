//! Utility helpers shared across UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns (timers, URL encoding,
//! route authorization) from page and component logic.

pub mod auth;
pub mod timer;
pub mod url;
