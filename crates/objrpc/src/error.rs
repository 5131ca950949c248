//! Error types for objrpc.
//!
//! Construction errors ([`ObjRpcError`]) are fatal and surface once, when the
//! registry is built. Call errors ([`CallError`]) are per request and always
//! end up in the uniform `{"error": "<message>"}` payload.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors raised while building a registry from a receiver.
#[derive(Debug, Error)]
pub enum ObjRpcError {
    #[error("Function '{method}': must have 0 or 1 inputs, it has {count} ({})", .types.join(", "))]
    TooManyInputs {
        method: String,
        count: usize,
        types: Vec<String>,
    },

    #[error("Function '{method}': more than 2 outputs: {count}")]
    TooManyOutputs { method: String, count: usize },

    #[error("Function '{method}': second output should be an error, but found {found}")]
    SecondOutputNotError { method: String, found: String },

    #[error("Function '{method}': first of two outputs must be a value, but found an error")]
    FirstOutputIsError { method: String },

    #[error("Function '{method}': declared more than once")]
    DuplicateMethod { method: String },
}

impl ObjRpcError {
    /// Name of the method that failed validation.
    pub fn method(&self) -> &str {
        match self {
            ObjRpcError::TooManyInputs { method, .. }
            | ObjRpcError::TooManyOutputs { method, .. }
            | ObjRpcError::SecondOutputNotError { method, .. }
            | ObjRpcError::FirstOutputIsError { method }
            | ObjRpcError::DuplicateMethod { method } => method,
        }
    }
}

/// Result type alias for registry construction.
pub type Result<T> = std::result::Result<T, ObjRpcError>;

/// The error a receiver method reports through its error output.
///
/// Typed methods returning `Result<T, E>` for any `Display` error (for
/// example `anyhow::Error`, `std::io::Error` or `String`) have their error
/// captured here. Only the message crosses the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodError {
    message: String,
}

impl MethodError {
    pub fn new(message: impl fmt::Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for MethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Per-call failures. Every variant is reported to the client as
/// `{"error": "<Display of the variant>"}`.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("No such function '{0}'.")]
    NoSuchFunction(String),

    #[error("Function '{0}' does not accept parameters.")]
    UnexpectedParam(String),

    #[error("Error decoding JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("{0}")]
    Application(MethodError),

    #[error("Error encoding result: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Function '{0}' returned outputs that do not match its signature.")]
    SignatureMismatch(String),
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    error: &'a str,
}

impl CallError {
    /// Short category name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CallError::NoSuchFunction(_) => "lookup",
            CallError::UnexpectedParam(_) | CallError::Decode(_) => "decode",
            CallError::Application(_) => "application",
            CallError::Encode(_) => "encode",
            CallError::SignatureMismatch(_) => "internal",
        }
    }

    /// Render as the structural error payload `{"error":"<message>"}`.
    pub fn to_payload(&self) -> Vec<u8> {
        error_payload(&self.to_string())
    }
}

/// Encode a message as `{"error":"<message>"}`.
pub fn error_payload(message: &str) -> Vec<u8> {
    serde_json::to_vec(&ErrorPayload { error: message })
        .unwrap_or_else(|_| br#"{"error":"Failed to encode error"}"#.to_vec())
}

/// Check whether a response payload has the structural error shape.
pub fn is_error_payload(payload: &[u8]) -> bool {
    match serde_json::from_slice::<serde_json::Value>(payload) {
        Ok(serde_json::Value::Object(map)) => {
            map.len() == 1 && map.get("error").map_or(false, |v| v.is_string())
        }
        _ => false,
    }
}
