use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::{ReplicaInfo, SourceRef};

/// Continuous line-oriented log output for one source
pub type LineStream = BoxStream<'static, std::io::Result<String>>;

/// The cluster capability the streaming engine consumes: list the replicas
/// matching a selector, and open a follow-mode line stream for one source.
#[async_trait]
pub trait LogSource: Send + Sync + 'static {
    /// List running replicas matching `label_selector` in `namespace`,
    /// together with their declared container names.
    async fn list_replicas(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> anyhow::Result<Vec<ReplicaInfo>>;

    /// Open a line stream for one source, starting with up to `tail_lines`
    /// of backlog and then following new output as it is produced.
    ///
    /// Dropping the returned stream releases the underlying connection.
    async fn open_line_stream(
        &self,
        namespace: &str,
        origin: &SourceRef,
        tail_lines: i64,
    ) -> anyhow::Result<LineStream>;
}
