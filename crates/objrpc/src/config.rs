//! Protocol constants shared by the endpoint and HTTP transports.

/// Wire-level configuration of the RPC protocol.
pub struct RpcConfig;

impl RpcConfig {
    /// Reserved function name that lists the registered functions.
    pub const FUNCS_METHOD: &'static str = "funcs";

    /// Request field carrying the function name.
    pub const FUNC_FIELD: &'static str = "func";
    /// Request field carrying the JSON-encoded parameter.
    pub const PARAM_FIELD: &'static str = "param";

    pub const JSON_CONTENT_TYPE: &'static str = "application/json";
    pub const JS_CONTENT_TYPE: &'static str = "application/javascript";
    pub const FORM_CONTENT_TYPE: &'static str = "application/x-www-form-urlencoded";

    pub const DEFAULT_RPC_PATH: &'static str = "/api";
    pub const DEFAULT_CLIENT_PATH: &'static str = "/api/client.js";

    /// Largest accepted request body.
    pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024; // 2MB
}
