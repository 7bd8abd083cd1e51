//! Output module
//!
//! Streams frame snapshots to renderers over Server-Sent Events.

pub mod sse;
