//! Browser client script.
//!
//! `objrpc(url)` fetches the function list from the endpoint at `url` and
//! returns an object with one asynchronous method per registered function:
//!
//! - `ready`: whether initialization finished;
//! - `onReady(callback(error))`: listeners run in registration order once
//!   initialization finishes, `error` is `null` on success;
//! - `Name(param, callback(data), errorCallback(error))`: calls a function.
//!   `param` is omitted for functions without input. Without an
//!   `errorCallback`, errors are thrown.
//!
//! The script is a static asset and does not depend on the receiver.

/// The client script, served verbatim.
pub const CLIENT_JS: &str = include_str!("../assets/client.js");
