use std::path::Path;

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};

/// Build a cluster client.
///
/// With an explicit kubeconfig path the file is read and the requested
/// context selected. Otherwise the configuration is inferred: the in-cluster
/// service account when running inside Kubernetes, the default kubeconfig
/// when not.
pub async fn connect(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<kube::Client> {
    let config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("failed to read kubeconfig at {}", path.display()))?;
            kube::Config::from_custom_kubeconfig(
                kubeconfig,
                &KubeConfigOptions {
                    context: context.map(str::to_string),
                    ..Default::default()
                },
            )
            .await
            .context("failed to load kubeconfig")?
        }
        None => kube::Config::infer()
            .await
            .context("failed to infer cluster configuration")?,
    };

    kube::Client::try_from(config).context("failed to create cluster client")
}
