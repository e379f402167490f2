use std::io;
use std::time::Duration;

use thiserror::Error;

use podtail_types::SourceRef;

/// Failure to turn a selector into a set of sources. Fails the whole
/// request before any stream is opened; never retried.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The replica listing call failed
    #[error("selector lookup failed: {0}")]
    Lookup(anyhow::Error),

    /// The replica listing call did not answer in time
    #[error("selector lookup timed out after {0:?}")]
    Timeout(Duration),
}

/// Terminal failure of a single source's reader. Isolated to that source;
/// the rest of the set keeps streaming.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open log stream for {origin}: {cause}")]
    Open {
        origin: SourceRef,
        cause: anyhow::Error,
    },

    #[error("log stream for {origin} failed: {cause}")]
    Read { origin: SourceRef, cause: io::Error },
}

/// The client sink rejected a write; aborts the whole request
#[derive(Debug, Error)]
#[error("client write failed: {0}")]
pub struct DeliveryError(#[from] io::Error);
