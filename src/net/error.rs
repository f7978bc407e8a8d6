//! Normalized API error shape.
//!
//! Every failed call, transport-level or HTTP-level, ends up as an
//! [`ApiError`] so pages can show `message` and project `violations` onto
//! form fields without caring which backend handler produced the body.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use std::collections::BTreeMap;

use serde_json::{Map, Value};

pub const NETWORK_ERROR_CODE: &str = "ERR_NETWORK";
pub const GENERIC_ERROR_CODE: &str = "ERR_GENERIC";
pub const DECODE_ERROR_CODE: &str = "ERR_DECODE";

/// Uniform error returned by the API client.
///
/// `status == 0` with code `ERR_NETWORK` means no HTTP response was received.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({code}, status {status})")]
pub struct ApiError {
    pub message: String,
    pub code: String,
    pub status: u16,
    /// Field name to human-readable message; `None` when the body named no fields.
    pub violations: Option<BTreeMap<String, String>>,
}

impl ApiError {
    pub fn network() -> Self {
        Self { message: "Network error".to_owned(), code: NETWORK_ERROR_CODE.to_owned(), status: 0, violations: None }
    }

    /// A success response whose body did not match the expected shape.
    pub fn decode(status: u16, detail: impl std::fmt::Display) -> Self {
        Self {
            message: format!("Unexpected response: {detail}"),
            code: DECODE_ERROR_CODE.to_owned(),
            status,
            violations: None,
        }
    }

    /// Normalize a non-success HTTP response.
    ///
    /// Message precedence: `message`, `detail`, `title`, `error` string
    /// fields of a JSON object body, then a non-empty plain-text body, then
    /// `"Request failed"`. Field violations are merged from a `violations`
    /// map, an `errors` map and an `errors` list of `{field, message}`, in
    /// that order, so the list wins on key collisions.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<Value>(body).ok();
        let data = parsed.as_ref().and_then(Value::as_object);

        let message = data
            .and_then(|d| ["message", "detail", "title", "error"].iter().find_map(|key| non_empty_str(d, key)))
            .map(str::to_owned)
            .or_else(|| plain_text_message(parsed.as_ref(), body))
            .unwrap_or_else(|| "Request failed".to_owned());

        let code = data
            .and_then(|d| non_empty_str(d, "code"))
            .unwrap_or(GENERIC_ERROR_CODE)
            .to_owned();

        let violations = data.map(collect_violations).filter(|v| !v.is_empty());

        Self { message, code, status, violations }
    }

    pub fn is_network(&self) -> bool {
        self.status == 0 && self.code == NETWORK_ERROR_CODE
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, 401 | 403)
    }

    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    pub fn violation(&self, field: &str) -> Option<&str> {
        self.violations.as_ref()?.get(field).map(String::as_str)
    }
}

fn non_empty_str<'a>(data: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Plain-text bodies (`"Invalid token"`) are used as the message verbatim.
fn plain_text_message(parsed: Option<&Value>, body: &str) -> Option<String> {
    match parsed {
        Some(Value::String(text)) => Some(text.clone()).filter(|t| !t.trim().is_empty()),
        Some(_) => None,
        None => Some(body.trim().to_owned()).filter(|t| !t.is_empty()),
    }
}

fn collect_violations(data: &Map<String, Value>) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    if let Some(Value::Object(map)) = data.get("violations") {
        merge_field_map(&mut fields, map);
    }
    match data.get("errors") {
        Some(Value::Object(map)) => merge_field_map(&mut fields, map),
        Some(Value::Array(items)) => {
            for item in items {
                let field = item.get("field").and_then(Value::as_str);
                let message = item.get("message").and_then(Value::as_str);
                if let (Some(field), Some(message)) = (field, message) {
                    fields.insert(field.to_owned(), message.to_owned());
                }
            }
        }
        _ => {}
    }
    fields
}

fn merge_field_map(fields: &mut BTreeMap<String, String>, map: &Map<String, Value>) {
    for (field, message) in map {
        if let Some(message) = message.as_str() {
            fields.insert(field.clone(), message.to_owned());
        }
    }
}
