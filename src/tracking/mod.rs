//! Tracking module
//!
//! Hand detection feed driving the simulation:
//! - Landmark set model shared with the gesture code
//! - Hand tracker JSON-over-UDP receiver
//! - Tracker helper subprocess management

pub mod hand;
pub mod landmarks;
pub mod subprocess;

pub use hand::{HandPacket, HandReceiver};
pub use landmarks::LandmarkSet;
