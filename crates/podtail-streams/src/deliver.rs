use std::io;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use podtail_types::LineEvent;

use crate::error::DeliveryError;

/// Where delivered lines go. Implementations append a line terminator and
/// flush before returning, so the client observes each line as it arrives.
#[async_trait]
pub trait LineSink: Send {
    async fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Resolves once the sink can no longer accept writes. Sinks without
    /// disconnect detection leave the default, which never resolves.
    async fn closed(&mut self) {
        std::future::pending().await
    }
}

/// Drain the conduit into the sink until the conduit closes, the request is
/// cancelled, or the sink fails.
///
/// A sink failure fires `cancel` so every reader stops promptly instead of
/// lingering on a disconnected client. Returns the number of lines written.
pub async fn deliver<S: LineSink>(
    mut events: mpsc::Receiver<LineEvent>,
    mut sink: S,
    cancel: CancellationToken,
) -> Result<u64, DeliveryError> {
    let mut delivered = 0u64;
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            () = sink.closed() => {
                cancel.cancel();
                return Err(DeliveryError::from(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "client disconnected",
                )));
            }
            event = events.recv() => event,
        };
        let Some(event) = event else {
            // All readers are done.
            break;
        };
        if let Err(err) = sink.write_line(&event.line).await {
            cancel.cancel();
            return Err(err.into());
        }
        delivered += 1;
    }
    Ok(delivered)
}
