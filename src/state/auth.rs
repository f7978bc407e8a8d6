//! Auth-session data model for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AuthState` is the snapshot that route guards and user-aware components
//! render from. The session publishes a fresh snapshot after every change, so
//! consumers only ever read it; mutation goes through `AuthSession`.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::fmt;

use serde::{Deserialize, Serialize};

pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Opaque bearer credential.
///
/// `Debug` is redacted so snapshots can be logged without leaking tokens.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Authorization` header pair carrying this credential.
    pub fn bearer_header(&self) -> (String, String) {
        (AUTHORIZATION_HEADER.to_owned(), format!("Bearer {}", self.0))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Access tier assigned by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Customer,
    Teller,
    Manager,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Customer, Role::Teller, Role::Manager];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Customer => "CUSTOMER",
            Self::Teller => "TELLER",
            Self::Manager => "MANAGER",
        }
    }

    /// Landing route used after login when no other destination was requested.
    pub fn home_path(self) -> &'static str {
        match self {
            Self::Admin => "/admin/home",
            Self::Customer => "/customer/home",
            Self::Teller => "/teller/home",
            Self::Manager => "/manager/home",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verified identity returned by the backend for a credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}

/// Input to `AuthSession::login`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginInput {
    /// The login endpoint already returned the identity; no validation round-trip.
    KnownIdentity(Credential, Identity),
    /// Only the credential is known; the session validates it before settling.
    UnknownIdentity(Credential),
}

impl LoginInput {
    pub fn credential(&self) -> &Credential {
        match self {
            Self::KnownIdentity(credential, _) | Self::UnknownIdentity(credential) => credential,
        }
    }
}

/// Snapshot of the authentication session.
///
/// `bootstrapped == false` means the status is not yet known, which is not
/// the same as logged out. The default snapshot is that undetermined state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub credential: Option<Credential>,
    pub identity: Option<Identity>,
    pub bootstrapped: bool,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some() && self.identity.is_some()
    }

    pub fn loading(&self) -> bool {
        !self.bootstrapped
    }

    /// True iff an identity is present and its role is one of `roles`.
    pub fn has_role(&self, roles: &[Role]) -> bool {
        self.identity.as_ref().is_some_and(|identity| roles.contains(&identity.role))
    }

    /// Headers to attach to outbound API calls; empty without a credential.
    pub fn auth_headers(&self) -> Vec<(String, String)> {
        self.credential.iter().map(Credential::bearer_header).collect()
    }
}
