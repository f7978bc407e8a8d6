//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read the shared `RwSignal<AuthState>` from context and never
//! mutate the session directly.

pub mod require_role;
pub mod user_bar;
pub mod username_check;
