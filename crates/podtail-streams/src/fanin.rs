use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use podtail_types::{LineEvent, LogRequest, LogSource};

use crate::error::{ResolveError, SourceError};
use crate::reader::run_reader;
use crate::resolve::select_sources;

/// Capacity of the aggregation conduit. Kept small so that a slow client
/// exerts backpressure on every reader instead of buffering without bound.
const CONDUIT_CAPACITY: usize = 16;

/// Resolve a selector into sources and start one reader task per source.
///
/// The returned receiver yields merged lines in arrival order; order is
/// preserved within a source and unspecified across sources. The channel
/// closes once every reader has terminated, which is immediate when the
/// selector matches nothing. Resolution failures surface here, before any
/// stream is opened; a single source failing later never tears the set down.
pub async fn start_streams(
    source: Arc<dyn LogSource>,
    request: &LogRequest,
    resolve_timeout: Duration,
    cancel: CancellationToken,
) -> Result<mpsc::Receiver<LineEvent>, ResolveError> {
    let selector = request.selector();
    let replicas = match timeout(
        resolve_timeout,
        source.list_replicas(&request.namespace, &selector),
    )
    .await
    {
        Ok(Ok(replicas)) => replicas,
        Ok(Err(cause)) => return Err(ResolveError::Lookup(cause)),
        Err(_) => return Err(ResolveError::Timeout(resolve_timeout)),
    };

    let resolved = select_sources(&replicas);
    info!(
        selector = %selector,
        namespace = %request.namespace,
        pods = resolved.pods.len(),
        containers = resolved.containers.len(),
        "resolved log sources"
    );

    let (tx, rx) = mpsc::channel(CONDUIT_CAPACITY);
    let mut readers = JoinSet::new();
    for origin in resolved.source_refs() {
        readers.spawn(run_reader(
            Arc::clone(&source),
            request.namespace.clone(),
            origin,
            request.tail_lines,
            tx.clone(),
            cancel.clone(),
        ));
    }
    // The readers now hold the only senders; the conduit closes when the
    // last one exits.
    drop(tx);
    tokio::spawn(supervise(readers));

    Ok(rx)
}

/// Drain reader terminations, logging each outcome. Completion of the set
/// is what closes the conduit for the consumer.
async fn supervise(mut readers: JoinSet<Result<u64, SourceError>>) {
    let mut finished = 0usize;
    let mut failed = 0usize;
    while let Some(terminated) = readers.join_next().await {
        match terminated {
            Ok(Ok(lines)) => {
                finished += 1;
                debug!(lines, "source reader finished");
            }
            Ok(Err(err)) => {
                failed += 1;
                warn!(error = %err, "source reader failed");
            }
            Err(err) => {
                failed += 1;
                warn!(error = %err, "source reader aborted");
            }
        }
    }
    debug!(finished, failed, "all source readers terminated");
}
