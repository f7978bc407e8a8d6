//! Authenticated REST client.
//!
//! Every request built here carries the session's current `Authorization`
//! header (when a session is attached) and a JSON content type. Responses are
//! turned into typed values or a normalized [`ApiError`]; transport errors
//! never reach callers raw.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::state::auth::Credential;
use crate::state::session::AuthSession;

#[derive(Clone)]
pub struct ApiClient {
    base_url: Rc<str>,
    transport: Rc<dyn Transport>,
    session: Option<AuthSession>,
}

impl ApiClient {
    /// Client without a session; requests carry no credential unless one is passed explicitly.
    pub fn new(base_url: &str, transport: Rc<dyn Transport>) -> Self {
        Self { base_url: Rc::from(base_url.trim_end_matches('/')), transport, session: None }
    }

    /// Copy of this client that authenticates with `session`'s current credential.
    #[must_use]
    pub fn with_session(&self, session: AuthSession) -> Self {
        Self { session: Some(session), ..self.clone() }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Build a request with content type and session auth headers attached.
    pub fn build(&self, method: Method, path: &str, body: Option<serde_json::Value>) -> ApiRequest {
        let mut headers = vec![("Content-Type".to_owned(), "application/json".to_owned())];
        if let Some(session) = &self.session {
            headers.extend(session.auth_headers());
        }
        ApiRequest { method, url: self.url(path), headers, body }
    }

    /// Build a request authenticated with an explicit credential instead of the session's.
    pub fn build_with_credential(&self, method: Method, path: &str, credential: &Credential) -> ApiRequest {
        let mut request = ApiRequest {
            method,
            url: self.url(path),
            headers: vec![("Content-Type".to_owned(), "application/json".to_owned())],
            body: None,
        };
        request.headers.push(credential.bearer_header());
        request
    }

    /// Dispatch `request`; non-2xx statuses and transport failures become [`ApiError`].
    ///
    /// # Errors
    ///
    /// Returns the normalized error for any failed call.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let method = request.method;
        let url = request.url.clone();
        let resp = self.transport.send(request).await.map_err(|e| {
            log::warn!("{} {url} failed: {e}", method.as_str());
            ApiError::network()
        })?;
        if resp.is_success() {
            return Ok(resp);
        }
        let err = ApiError::from_response(resp.status, &resp.body);
        log::debug!("{} {url} -> {}: {}", method.as_str(), err.status, err.message);
        Err(err)
    }

    /// Send a request and decode a JSON response body.
    ///
    /// # Errors
    ///
    /// Returns the normalized error for failed calls, or a decode error for an unexpected body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let resp = self.send(self.build(method, path, body)).await?;
        decode_json(&resp)
    }

    /// Send a request whose response body is irrelevant (plain-text acknowledgements).
    ///
    /// # Errors
    ///
    /// Returns the normalized error for failed calls.
    pub async fn request_unit(&self, method: Method, path: &str, body: Option<serde_json::Value>) -> Result<(), ApiError> {
        self.send(self.build(method, path, body)).await.map(|_| ())
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::Get, path, None).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`]; also fails if `body` cannot be serialized.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.request(Method::Post, path, Some(to_value(body)?)).await
    }
}

pub(crate) fn decode_json<T: DeserializeOwned>(resp: &ApiResponse) -> Result<T, ApiError> {
    serde_json::from_str(&resp.body).map_err(|e| ApiError::decode(resp.status, e))
}

pub(crate) fn to_value<B: Serialize>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::decode(0, e))
}
