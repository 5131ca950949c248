//! Per-request dispatch: decode, invoke, encode.
//!
//! [`Registry::call`] never fails. Every failure is rendered as the structural
//! error payload so the transport can always write a body as-is.
//! [`Registry::try_call`] exposes the typed result underneath.

use tracing::{debug, error, warn};

use crate::error::CallError;
use crate::reflect::Slot;
use crate::registry::{MethodHandle, Registry};

/// Successful outcome of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// JSON encoding of the method's value output.
    Json(Vec<u8>),
    /// The method has no value output and did not fail.
    Empty,
}

impl Reply {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Reply::Json(bytes) => bytes,
            Reply::Empty => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Reply::Empty)
    }
}

impl Registry {
    /// Call a function with a JSON-encoded parameter. Functions without input
    /// take an empty parameter. Returns the response payload.
    pub fn call(&self, name: &str, param: &[u8]) -> Vec<u8> {
        debug!("RPC call: {}({} bytes)", name, param.len());

        match self.try_call(name, param) {
            Ok(reply) => reply.into_bytes(),
            Err(err) => {
                match &err {
                    CallError::Application(_)
                    | CallError::Encode(_)
                    | CallError::SignatureMismatch(_) => {
                        error!("RPC error for {}: {}", name, err);
                    }
                    _ => warn!("Rejected call to {} ({}): {}", name, err.kind(), err),
                }
                err.to_payload()
            }
        }
    }

    /// Call a function and return the typed outcome.
    pub fn try_call(&self, name: &str, param: &[u8]) -> Result<Reply, CallError> {
        let handle = self
            .get(name)
            .ok_or_else(|| CallError::NoSuchFunction(name.to_string()))?;

        let args = match handle.input() {
            Some(input) => vec![input.decode(param).map_err(CallError::Decode)?],
            None if !param.is_empty() => {
                return Err(CallError::UnexpectedParam(name.to_string()));
            }
            None => Vec::new(),
        };

        let slots = handle.invoke(args)?;
        settle(handle, slots)
    }
}

/// Sort out a method's outputs according to its recorded contract.
fn settle(handle: &MethodHandle, slots: Vec<Slot>) -> Result<Reply, CallError> {
    let contract = handle.contract();
    let mismatch = || CallError::SignatureMismatch(handle.name().to_string());

    if slots.len() != contract.arity() {
        return Err(mismatch());
    }

    let mut slots = slots.into_iter();
    let value = if contract.has_value() {
        slots.next()
    } else {
        None
    };

    // A non-nil error wins; the value output is dropped unencoded.
    if contract.has_error() {
        match slots.next() {
            Some(Slot::Error(None)) => {}
            Some(Slot::Error(Some(err))) => return Err(CallError::Application(err)),
            _ => return Err(mismatch()),
        }
    }

    match value {
        None => Ok(Reply::Empty),
        Some(Slot::Value(value)) => value
            .encode_json()
            .map(Reply::Json)
            .map_err(CallError::Encode),
        Some(_) => Err(mismatch()),
    }
}
