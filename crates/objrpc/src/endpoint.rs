//! Transport-agnostic RPC endpoint.
//!
//! `Endpoint` sits between a transport and the dispatcher. It answers the
//! reserved `funcs` request with the sorted list of registered functions and
//! forwards everything else to [`Registry::call`]. The interception happens
//! before lookup, so a receiver method literally named `funcs` can never be
//! reached through an endpoint.

use tracing::debug;

use crate::config::RpcConfig;
use crate::error::Result;
use crate::receiver::Receiver;
use crate::registry::Registry;

/// Entry point for one receiver's RPC traffic.
#[derive(Debug, Clone)]
pub struct Endpoint {
    registry: Registry,
}

impl Endpoint {
    /// Build the registry for `receiver` and wrap it.
    pub fn new<R: Receiver>(receiver: R) -> Result<Self> {
        Ok(Self::from_registry(Registry::build(receiver)?))
    }

    pub fn from_registry(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Handle one request: `func` names the function, `param` is its
    /// JSON-encoded argument (empty for none).
    pub fn handle(&self, func: &str, param: &[u8]) -> Vec<u8> {
        if func == RpcConfig::FUNCS_METHOD {
            debug!("Listing {} registered functions", self.registry.len());
            return self.function_list();
        }
        self.registry.call(func, param)
    }

    /// Registered function names, sorted.
    pub fn function_names(&self) -> Vec<&str> {
        self.registry.names().collect()
    }

    fn function_list(&self) -> Vec<u8> {
        serde_json::to_vec(&self.function_names()).unwrap_or_else(|_| b"[]".to_vec())
    }
}
