use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use podtail_api::{build_router, ApiState};
use podtail_k8s::ClusterLogSource;
use podtail_types::{
    GatewayConfig, LogSource, DEFAULT_NAMESPACE, DEFAULT_SELECTOR_KEY, DEFAULT_TAIL_LINES,
};

/// Podtail - a streaming HTTP gateway for Kubernetes pod logs
#[derive(Parser, Debug)]
#[command(name = "podtail")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "PODTAIL_LISTEN_ADDR", default_value = "0.0.0.0:9000")]
    listen_addr: SocketAddr,

    /// Kubeconfig file to use instead of the inferred configuration
    #[arg(long, env = "KUBECONFIG")]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to select
    #[arg(long, env = "PODTAIL_CONTEXT")]
    context: Option<String>,

    /// Selector key assumed when a request does not name one
    #[arg(long, env = "DEFAULT_SELECTOR_KEY", default_value = DEFAULT_SELECTOR_KEY)]
    default_selector_key: String,

    /// Namespace assumed when a request does not name one
    #[arg(long, env = "DEFAULT_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    default_namespace: String,

    /// Historical lines fetched per source when a request does not say
    #[arg(long, env = "DEFAULT_TAIL_LINES", default_value_t = DEFAULT_TAIL_LINES)]
    default_tail_lines: i64,

    /// Shared secret required on the logs endpoint
    #[arg(long, env = "X_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Seconds to wait for the pod listing when resolving a selector
    #[arg(long, env = "PODTAIL_RESOLVE_TIMEOUT_SECS", default_value_t = 5)]
    resolve_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let client = podtail_k8s::connect(args.kubeconfig.as_deref(), args.context.as_deref()).await?;
    let source: Arc<dyn LogSource> = Arc::new(ClusterLogSource::new(client));
    let config = Arc::new(GatewayConfig {
        default_selector_key: args.default_selector_key,
        default_namespace: args.default_namespace,
        default_tail_lines: args.default_tail_lines,
        api_key: args.api_key,
        resolve_timeout: Duration::from_secs(args.resolve_timeout_secs),
    });

    let app = build_router(ApiState { source, config });
    let listener = TcpListener::bind(args.listen_addr).await?;
    info!(addr = %args.listen_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
