use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{AsyncBufReadExt, StreamExt};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{ListParams, LogParams};
use kube::Api;
use tracing::debug;

use podtail_types::{LineStream, LogSource, ReplicaInfo, SourceRef};

/// `LogSource` backed by the Kubernetes API
#[derive(Clone)]
pub struct ClusterLogSource {
    client: kube::Client,
}

impl ClusterLogSource {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl LogSource for ClusterLogSource {
    async fn list_replicas(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<ReplicaInfo>> {
        let pods = self
            .pods(namespace)
            .list(&ListParams::default().labels(label_selector))
            .await
            .with_context(|| format!("failed to list pods for {label_selector}"))?;
        debug!(
            selector = label_selector,
            pods = pods.items.len(),
            "listed pods"
        );

        Ok(pods
            .items
            .into_iter()
            .map(|pod| {
                let name = pod.metadata.name.unwrap_or_default();
                let containers = pod
                    .spec
                    .map(|spec| spec.containers.into_iter().map(|c| c.name).collect())
                    .unwrap_or_default();
                ReplicaInfo { name, containers }
            })
            .collect())
    }

    async fn open_line_stream(
        &self,
        namespace: &str,
        origin: &SourceRef,
        tail_lines: i64,
    ) -> Result<LineStream> {
        let params = LogParams {
            follow: true,
            container: Some(origin.container.clone()),
            tail_lines: Some(tail_lines),
            timestamps: true,
            ..Default::default()
        };
        let reader = self
            .pods(namespace)
            .log_stream(&origin.pod, &params)
            .await
            .with_context(|| format!("failed to open log stream for {origin}"))?;

        Ok(reader.lines().boxed())
    }
}
