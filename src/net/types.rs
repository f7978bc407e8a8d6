//! Wire DTOs for the banking REST API.
//!
//! DESIGN
//! ======
//! Request bodies mirror the backend's camelCase JSON; responses decode
//! straight into session types where the shapes coincide.

use serde::{Deserialize, Serialize};

use crate::state::auth::{Credential, Identity, Role};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful password login: the token plus the identity it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: Role,
}

impl LoginResponse {
    pub fn credential(&self) -> Credential {
        Credential::new(self.token.clone())
    }

    pub fn identity(&self) -> Identity {
        Identity { username: self.username.clone(), role: self.role }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerifyPasswordRequest {
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

/// Username change; the backend requires the current password alongside it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUsernameRequest {
    pub username: String,
    pub current_password: String,
}

/// Self-service sign-up; the confirmation field never leaves the form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// `GET /api/v1/users/me`. Every contact field is optional on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub user_id: Option<serde_json::Value>,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub home_number: Option<String>,
    pub work_number: Option<String>,
    pub office_number: Option<String>,
    pub mobile_number: Option<String>,
    pub role_name: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    TransferIn,
    TransferOut,
}

impl TransactionType {
    pub const ALL: [Self; 4] = [Self::Deposit, Self::Withdrawal, Self::TransferIn, Self::TransferOut];

    pub fn label(self) -> &'static str {
        match self {
            Self::Deposit => "Deposit",
            Self::Withdrawal => "Withdrawal",
            Self::TransferIn => "Transfer In",
            Self::TransferOut => "Transfer Out",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdrawal => "WITHDRAWAL",
            Self::TransferIn => "TRANSFER_IN",
            Self::TransferOut => "TRANSFER_OUT",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

/// One ledger entry for an account.
///
/// `created_at` arrives either as an ISO-8601 string or as a
/// `[year, month, day, hour, minute, ...]` array, so it stays raw JSON until
/// rendered.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: serde_json::Value,
    pub account_id: serde_json::Value,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: f64,
    pub balance_after: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: serde_json::Value,
}

/// The transactions endpoint answers with a bare list or a `{data: [...]}` envelope.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TransactionsBody {
    List(Vec<Transaction>),
    Wrapped { data: Vec<Transaction> },
}

impl TransactionsBody {
    pub fn into_vec(self) -> Vec<Transaction> {
        match self {
            Self::List(rows) | Self::Wrapped { data: rows } => rows,
        }
    }
}
