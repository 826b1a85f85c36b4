use serde::{Deserialize, Serialize};

/// HTTP host configuration (`modules.api_ingress` in the app config).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// Explicit `host:port`; empty means "use server.host/server.port".
    #[serde(default)]
    pub bind_addr: String,
    #[serde(default)]
    pub cors_enabled: bool,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

fn default_body_limit_bytes() -> usize {
    1024 * 1024
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: String::new(),
            cors_enabled: false,
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}
