use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use podtail_types::{LineEvent, LogSource, SourceRef};

use crate::error::SourceError;

/// Stream one source into the shared conduit until the stream ends, the
/// request is cancelled, or the consumer goes away.
///
/// The send into the conduit blocks while the consumer is busy; that is the
/// backpressure point, so a slow client throttles every reader. Returns the
/// number of lines forwarded. The remote stream handle is released on every
/// exit path when the stream drops.
pub(crate) async fn run_reader(
    source: Arc<dyn LogSource>,
    namespace: String,
    origin: SourceRef,
    tail_lines: i64,
    conduit: mpsc::Sender<LineEvent>,
    cancel: CancellationToken,
) -> Result<u64, SourceError> {
    let opened = tokio::select! {
        _ = cancel.cancelled() => return Ok(0),
        opened = source.open_line_stream(&namespace, &origin, tail_lines) => opened,
    };
    let mut lines = match opened {
        Ok(lines) => lines,
        Err(cause) => return Err(SourceError::Open { origin, cause }),
    };
    debug!(source = %origin, tail_lines, "log stream opened");

    let mut forwarded = 0u64;
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => break,
            next = lines.next() => next,
        };
        match next {
            Some(Ok(line)) => {
                let sent = tokio::select! {
                    _ = cancel.cancelled() => break,
                    sent = conduit.send(LineEvent::new(line)) => sent,
                };
                if sent.is_err() {
                    // Consumer dropped the conduit; nothing left to feed.
                    break;
                }
                forwarded += 1;
            }
            Some(Err(cause)) => return Err(SourceError::Read { origin, cause }),
            None => break,
        }
    }

    debug!(source = %origin, forwarded, "log stream closed");
    Ok(forwarded)
}
