use podtail_types::{ReplicaInfo, SourceRef};

/// Container name fragments that mark injected sidecars rather than
/// application containers. Case-sensitive substring match; covers
/// `istio-proxy` and the like.
const EXCLUDED_CONTAINER_MARKERS: [&str; 2] = ["sidecar", "proxy"];

/// The source set one selector resolves to
#[derive(Clone, Debug, Default)]
pub(crate) struct ResolvedSources {
    pub(crate) pods: Vec<String>,
    pub(crate) containers: Vec<String>,
}

impl ResolvedSources {
    /// One `SourceRef` per (pod, container) pair
    pub(crate) fn source_refs(&self) -> Vec<SourceRef> {
        self.containers
            .iter()
            .flat_map(|container| {
                self.pods
                    .iter()
                    .map(move |pod| SourceRef::new(pod.clone(), container.clone()))
            })
            .collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pods.is_empty() || self.containers.is_empty()
    }
}

/// Pick the pods and containers to stream from a replica listing.
///
/// Replicas of one workload declare the same containers, so only the first
/// replica is inspected for container names; a container unique to a later
/// replica is skipped. Sidecar and proxy containers are excluded, and
/// duplicate names collapse to their first occurrence.
///
/// An empty listing resolves to an empty source set, not an error.
pub(crate) fn select_sources(replicas: &[ReplicaInfo]) -> ResolvedSources {
    let pods = replicas.iter().map(|replica| replica.name.clone()).collect();

    let mut containers: Vec<String> = Vec::new();
    if let Some(first) = replicas.first() {
        for name in &first.containers {
            if containers.iter().any(|seen| seen == name) {
                continue;
            }
            if EXCLUDED_CONTAINER_MARKERS
                .iter()
                .any(|marker| name.contains(marker))
            {
                continue;
            }
            containers.push(name.clone());
        }
    }

    ResolvedSources { pods, containers }
}
