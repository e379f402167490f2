//! Shared types for podtail
//!
//! This crate contains data structures used across multiple podtail crates,
//! plus the cluster capability trait the streaming engine consumes.

mod config;
mod source;

pub use config::{
    GatewayConfig, DEFAULT_NAMESPACE, DEFAULT_RESOLVE_TIMEOUT, DEFAULT_SELECTOR_KEY,
    DEFAULT_TAIL_LINES,
};
pub use source::{LineStream, LogSource};

use std::fmt;

/// One continuous log origin: a pod and one of its containers
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceRef {
    pub pod: String,
    pub container: String,
}

impl SourceRef {
    pub fn new(pod: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            pod: pod.into(),
            container: container.into(),
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pod, self.container)
    }
}

/// One running pod and the container names it declares
#[derive(Clone, Debug)]
pub struct ReplicaInfo {
    pub name: String,
    pub containers: Vec<String>,
}

/// A single line of log output, line terminator stripped
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineEvent {
    pub line: String,
}

impl LineEvent {
    pub fn new(line: impl Into<String>) -> Self {
        let mut line = line.into();
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Self { line }
    }
}

/// Parameters of one streaming request, defaults already applied
#[derive(Clone, Debug)]
pub struct LogRequest {
    pub namespace: String,
    pub selector_key: String,
    pub selector_value: String,
    pub tail_lines: i64,
}

impl LogRequest {
    /// Label selector in `key=value` form
    pub fn selector(&self) -> String {
        format!("{}={}", self.selector_key, self.selector_value)
    }
}
