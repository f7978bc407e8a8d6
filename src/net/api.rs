//! Typed REST endpoints for authentication and account flows.
//!
//! ERROR HANDLING
//! ==============
//! Callers get `Result<_, ApiError>` outputs instead of panics so login and
//! profile failures degrade into form messages without crashing hydration.
//! Session validation goes through [`HttpAuthBackend`], which maps responses
//! onto the session's `ValidationError` policy instead.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use super::client::{ApiClient, decode_json, to_value};
use super::error::ApiError;
use super::transport::Method;
use super::types::{
    ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest, Transaction, TransactionsBody,
    UpdateUsernameRequest, UserProfile, VerifyPasswordRequest,
};
use crate::state::auth::{Credential, Identity, LoginInput};
use crate::state::session::AuthSession;
use crate::state::session_validator::{AuthBackend, ValidationError};
use crate::util::url::encode_component;

pub const VALIDATE_TOKEN_PATH: &str = "/api/v1/auth/validate-token";
pub const LOGIN_PATH: &str = "/api/v1/auth/login";
pub const LOGOUT_PATH: &str = "/api/v1/auth/logout";
pub const CHANGE_PASSWORD_PATH: &str = "/api/v1/auth/change-password";
pub const VERIFY_PASSWORD_PATH: &str = "/api/v1/users/verify-password";
pub const USERS_ME_PATH: &str = "/api/v1/users/me";
pub const REGISTER_PATH: &str = "/api/v1/auth/register";

/// Shorter names are never available and are not sent to the backend.
pub const MIN_USERNAME_LEN: usize = 3;

fn username_available_endpoint(username: &str) -> String {
    format!("/api/v1/auth/available?username={}", encode_component(username))
}

fn account_transactions_endpoint(account_id: &str) -> String {
    format!("/api/v1/accounts/{}/transactions", encode_component(account_id))
}

fn forgot_password_endpoint(email: &str) -> String {
    format!("/api/v1/auth/forgot-password?email={}", encode_component(email))
}

fn reset_password_endpoint(token: &str, new_password: Option<&str>) -> String {
    let mut path = format!("/api/v1/auth/reset-password?token={}", encode_component(token));
    if let Some(new_password) = new_password {
        path.push_str("&newPassword=");
        path.push_str(&encode_component(new_password));
    }
    path
}

/// Exchange username and password for a token and identity.
///
/// # Errors
///
/// Returns the normalized error; a 401 carries the backend's message.
pub async fn login_with_password(client: &ApiClient, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
    let body = LoginRequest { username: username.to_owned(), password: password.to_owned() };
    client.post_json(LOGIN_PATH, &body).await
}

/// Check the signed-in user's current password.
///
/// # Errors
///
/// Returns the normalized error; a rejected password is a 4xx status.
pub async fn verify_password(client: &ApiClient, password: &str) -> Result<(), ApiError> {
    let body = to_value(&VerifyPasswordRequest { password: password.to_owned() })?;
    client.request_unit(Method::Post, VERIFY_PASSWORD_PATH, Some(body)).await
}

/// # Errors
///
/// Returns the normalized error, including field violations.
pub async fn change_password(client: &ApiClient, request: &ChangePasswordRequest) -> Result<(), ApiError> {
    client.request_unit(Method::Put, CHANGE_PASSWORD_PATH, Some(to_value(request)?)).await
}

/// Ask the backend to email a reset link.
///
/// # Errors
///
/// Returns the normalized error.
pub async fn forgot_password(client: &ApiClient, email: &str) -> Result<(), ApiError> {
    client.request_unit(Method::Post, &forgot_password_endpoint(email), None).await
}

/// Check that a reset token from an emailed link is still valid.
///
/// # Errors
///
/// Returns the normalized error; an invalid or expired token is a 4xx status.
pub async fn check_reset_token(client: &ApiClient, token: &str) -> Result<(), ApiError> {
    client.request_unit(Method::Get, &reset_password_endpoint(token, None), None).await
}

/// # Errors
///
/// Returns the normalized error.
pub async fn reset_password(client: &ApiClient, token: &str, new_password: &str) -> Result<(), ApiError> {
    client.request_unit(Method::Post, &reset_password_endpoint(token, Some(new_password)), None).await
}

/// Rename the signed-in user, then log in again under the new name.
///
/// The old token names the old username, so the session is replaced with the
/// fresh token and identity from the re-login.
///
/// # Errors
///
/// Returns the error of whichever step failed; the session is untouched unless both succeed.
pub async fn change_username(
    client: &ApiClient,
    session: &AuthSession,
    new_username: &str,
    password: &str,
) -> Result<Identity, ApiError> {
    let update = UpdateUsernameRequest { username: new_username.to_owned(), current_password: password.to_owned() };
    client.request_unit(Method::Put, USERS_ME_PATH, Some(to_value(&update)?)).await?;
    let login = login_with_password(client, new_username, password).await?;
    let identity = login.identity();
    session.login(LoginInput::KnownIdentity(login.credential(), identity.clone())).await;
    Ok(identity)
}

/// Create a customer account. Returns the backend's confirmation text.
///
/// # Errors
///
/// Returns the normalized error; a taken username or email is a 409 whose
/// plain-text body becomes the message.
pub async fn register(client: &ApiClient, request: &RegisterRequest) -> Result<String, ApiError> {
    let resp = client.send(client.build(Method::Post, REGISTER_PATH, Some(to_value(request)?))).await?;
    let text = resp.body.trim();
    Ok(if text.is_empty() { "Registration successful. Please sign in.".to_owned() } else { text.to_owned() })
}

/// `Ok(true)` when the name is free, `Ok(false)` when it is taken (409) or
/// too short to check.
///
/// # Errors
///
/// Returns the normalized error when the backend could not answer either way.
pub async fn check_username_available(client: &ApiClient, username: &str) -> Result<bool, ApiError> {
    let username = username.trim();
    if username.chars().count() < MIN_USERNAME_LEN {
        return Ok(false);
    }
    match client.request_unit(Method::Get, &username_available_endpoint(username), None).await {
        Ok(()) => Ok(true),
        Err(e) if e.status == 409 => Ok(false),
        Err(e) => Err(e),
    }
}

/// # Errors
///
/// Returns the normalized error, or a decode error for an unexpected body.
pub async fn fetch_profile(client: &ApiClient) -> Result<UserProfile, ApiError> {
    client.get_json(USERS_ME_PATH).await
}

/// Ledger of one account, oldest first as the backend sends it.
///
/// # Errors
///
/// Returns the normalized error, or a decode error when the body is neither
/// a list nor a `{data: [...]}` envelope.
pub async fn account_transactions(client: &ApiClient, account_id: &str) -> Result<Vec<Transaction>, ApiError> {
    let body: TransactionsBody = client.get_json(&account_transactions_endpoint(account_id)).await?;
    Ok(body.into_vec())
}

/// [`AuthBackend`] over the REST API.
#[derive(Clone)]
pub struct HttpAuthBackend {
    client: ApiClient,
}

impl HttpAuthBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

/// Map a failed validation call onto the session policy.
///
/// Only an explicit rejection of the token (400, 401, 403) ends the session.
/// Anything else, such as a timeout, rate limiting, a 5xx or no response at
/// all, leaves the credential's validity unknown.
fn classify_validation_error(err: &ApiError) -> ValidationError {
    if !err.is_network() && matches!(err.status, 400 | 401 | 403) {
        ValidationError::Unauthenticated
    } else {
        ValidationError::NetworkFailure(err.message.clone())
    }
}

impl AuthBackend for HttpAuthBackend {
    fn validate(&self, credential: Credential) -> LocalBoxFuture<'static, Result<Identity, ValidationError>> {
        let client = self.client.clone();
        async move {
            let request = client.build_with_credential(Method::Get, VALIDATE_TOKEN_PATH, &credential);
            let resp = client.send(request).await.map_err(|e| classify_validation_error(&e))?;
            // A body we cannot read tells us nothing about the credential.
            decode_json::<Identity>(&resp).map_err(|e| ValidationError::NetworkFailure(e.message))
        }
        .boxed_local()
    }

    fn revoke(&self, credential: Credential) -> LocalBoxFuture<'static, Result<(), ValidationError>> {
        let client = self.client.clone();
        async move {
            let request = client.build_with_credential(Method::Post, LOGOUT_PATH, &credential);
            client.send(request).await.map(|_| ()).map_err(|e| classify_validation_error(&e))
        }
        .boxed_local()
    }
}
