//! Gesture control
//!
//! Turns a landmark set into the two inputs the simulation consumes: where
//! the body should go, and whether the hand is a fist.

pub mod classifier;
pub mod input;
pub mod pose;

pub use classifier::{FistClassifier, FistEvent};
pub use input::{ControlUpdate, HandControl};
pub use pose::PoseMapper;
