//! Concurrent log fan-in for podtail
//!
//! One reader task per source feeds a shared bounded conduit; a single
//! delivery loop drains it toward the client in arrival order.

mod deliver;
mod error;
mod fanin;
mod reader;
mod resolve;

pub use deliver::{deliver, LineSink};
pub use error::{DeliveryError, ResolveError, SourceError};
pub use fanin::start_streams;
