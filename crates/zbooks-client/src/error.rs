//! Error types for the ZBooks client.
//!
//! Server error bodies come in three historical shapes: a DRF-style map of
//! field name to message list, a `{"detail": "..."}` envelope, and a bare
//! message. They are decoded exactly once, at the HTTP boundary, into
//! [`ApiErrorBody`] so call sites never re-sniff response shapes.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by client operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An error occurred during the HTTP request (e.g., network issues, invalid request).
    #[error("Request Error: {0}")]
    Network(#[from] reqwest::Error),

    /// An error occurred during serialization or deserialization.
    #[error("Serialization Error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server returned a non-success status with a decoded error body.
    #[error("API Error (status {status}): {}", body.summary("request failed"))]
    Api {
        /// HTTP status code returned by the server.
        status: u16,
        /// Error body decoded at the HTTP boundary.
        body: ApiErrorBody,
    },

    /// The refresh token was rejected; the session has been torn down.
    ///
    /// This is the hard-logout signal: the store is already cleared when
    /// this variant is returned, and the embedding layer should route the
    /// user back to its login boundary.
    #[error("Session expired, re-authentication required")]
    SessionExpired,

    /// The session store failed to read or write.
    #[error("Storage Error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Render a human-readable message for the view layer.
    ///
    /// `fallback` is the per-operation generic string ("Login failed",
    /// "Registration failed", ...) used for network and unknown errors.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Api { body, .. } => body.summary(fallback),
            ApiError::SessionExpired => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Decoded server error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorBody {
    /// Field name to message list, as DRF validation errors.
    Fields(BTreeMap<String, Vec<String>>),
    /// A `{"detail": "..."}` envelope.
    Detail(String),
    /// A bare message, either a JSON string or `{"message": "..."}`.
    Message(String),
    /// Anything the decoder did not recognize.
    Unknown,
}

impl ApiErrorBody {
    /// Decode a raw response body. Total: no input shape errors or panics.
    pub fn decode(raw: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            return ApiErrorBody::Unknown;
        };

        match value {
            Value::String(s) if !s.trim().is_empty() => ApiErrorBody::Message(s),
            Value::Object(map) => {
                if let Some(detail) = map.get("detail").and_then(Value::as_str) {
                    return ApiErrorBody::Detail(detail.to_string());
                }
                if let Some(message) = map.get("message").and_then(Value::as_str) {
                    return ApiErrorBody::Message(message.to_string());
                }

                let mut fields = BTreeMap::new();
                for (name, value) in &map {
                    match value {
                        Value::String(msg) => {
                            fields.insert(name.clone(), vec![msg.clone()]);
                        }
                        Value::Array(items) => {
                            let messages: Vec<String> = items
                                .iter()
                                .filter_map(Value::as_str)
                                .map(String::from)
                                .collect();
                            if !messages.is_empty() {
                                fields.insert(name.clone(), messages);
                            }
                        }
                        _ => {}
                    }
                }

                if fields.is_empty() {
                    ApiErrorBody::Unknown
                } else {
                    ApiErrorBody::Fields(fields)
                }
            }
            _ => ApiErrorBody::Unknown,
        }
    }

    /// Render the body as a single display string.
    ///
    /// Field errors concatenate as `field: msg1, msg2; field2: msg3`.
    pub fn summary(&self, fallback: &str) -> String {
        match self {
            ApiErrorBody::Fields(fields) => fields
                .iter()
                .map(|(name, messages)| format!("{}: {}", name, messages.join(", ")))
                .collect::<Vec<_>>()
                .join("; "),
            ApiErrorBody::Detail(s) | ApiErrorBody::Message(s) => s.clone(),
            ApiErrorBody::Unknown => fallback.to_string(),
        }
    }
}
