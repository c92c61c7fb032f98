use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_STATUS_CODE: u16 = 200;
pub const DEFAULT_MESSAGE: &str = "Success!";

/// Response envelope returned to the invoking platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    #[serde(rename = "isBase64Encoded")]
    pub is_base64_encoded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseParts {
    pub status_code: u16,
    pub message: String,
    pub headers: BTreeMap<String, String>,
    pub is_base64_encoded: bool,
}

impl Default for ResponseParts {
    fn default() -> Self {
        Self {
            status_code: DEFAULT_STATUS_CODE,
            message: DEFAULT_MESSAGE.to_string(),
            headers: json_headers(),
            is_base64_encoded: false,
        }
    }
}

pub fn json_headers() -> BTreeMap<String, String> {
    BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())])
}

pub fn build_response(parts: ResponseParts) -> AlertResponse {
    AlertResponse {
        status_code: parts.status_code,
        headers: parts.headers,
        body: message_body(&parts.message),
        is_base64_encoded: parts.is_base64_encoded,
    }
}

/// Shorthand for [`build_response`] with default headers and encoding.
pub fn respond(status_code: u16, message: impl Into<String>) -> AlertResponse {
    build_response(ResponseParts {
        status_code,
        message: message.into(),
        ..ResponseParts::default()
    })
}

/// Renders `{"message": ...}` with a space after the colon.
fn message_body(message: &str) -> String {
    let quoted = Value::String(message.to_string());
    format!("{{\"message\": {quoted}}}")
}
