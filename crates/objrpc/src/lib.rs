//! objrpc - expose an object's methods as a JSON-over-HTTP RPC endpoint.
//!
//! A receiver lists its methods through [`Receiver`]. [`Registry::build`]
//! validates them once; [`Registry::call`] then dispatches requests by name,
//! decoding the JSON parameter and encoding the JSON result. Every per-call
//! failure comes back as `{"error": "<message>"}`.
//!
//! Method rules:
//! 1. at most one input, which must be JSON-decodable;
//! 2. at most two outputs: an optional JSON-encodable value and an optional
//!    error, with the error second.
//!
//! Private declarations are ignored and carry no restriction.
//!
//! # Example
//!
//! ```rust
//! use objrpc::{Endpoint, MethodTable, Receiver};
//!
//! struct Api;
//!
//! impl Receiver for Api {
//!     fn declare(methods: &mut MethodTable<Self>) {
//!         methods.method_with("Half", |_: &Api, i: i64| i / 2);
//!     }
//! }
//!
//! let endpoint = Endpoint::new(Api).unwrap();
//! assert_eq!(endpoint.handle("Half", b"10"), b"5");
//! assert_eq!(endpoint.handle("funcs", b""), br#"["Half"]"#);
//! ```
//!
//! The HTTP side lives in the `objrpc-server` crate; [`client::CLIENT_JS`] is
//! the matching browser script.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod receiver;
pub mod reflect;
pub mod registry;

pub use client::CLIENT_JS;
pub use config::RpcConfig;
pub use dispatch::Reply;
pub use endpoint::Endpoint;
pub use error::{error_payload, is_error_payload, CallError, MethodError, ObjRpcError, Result};
pub use receiver::{BodyResult, Json, MethodDecl, MethodTable, Receiver, Returns, Visibility};
pub use reflect::{Argument, ParamType, Passing, Signature, Slot, TypeInfo};
pub use registry::{MethodHandle, Registry, ResultContract};
