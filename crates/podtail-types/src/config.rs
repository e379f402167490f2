use std::time::Duration;

pub const DEFAULT_SELECTOR_KEY: &str = "k8s-app";
pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_TAIL_LINES: i64 = 1000;
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Immutable gateway settings, built once at startup and shared by reference
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Selector key assumed when a request does not name one
    pub default_selector_key: String,

    /// Namespace assumed when a request does not name one
    pub default_namespace: String,

    /// Historical lines fetched per source when a request does not say
    pub default_tail_lines: i64,

    /// Shared secret required on the logs endpoint
    pub api_key: String,

    /// Bound on the pod listing call when resolving a selector
    pub resolve_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            default_selector_key: DEFAULT_SELECTOR_KEY.to_string(),
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            default_tail_lines: DEFAULT_TAIL_LINES,
            api_key: String::new(),
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }
}
