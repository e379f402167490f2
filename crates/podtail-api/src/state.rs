use std::sync::Arc;

use podtail_types::{GatewayConfig, LogSource};

/// Shared, immutable per-process state handed to every handler
#[derive(Clone)]
pub struct ApiState {
    pub source: Arc<dyn LogSource>,
    pub config: Arc<GatewayConfig>,
}
