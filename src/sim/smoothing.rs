//! Exponential smoothing of the body position.

use glam::Vec3;

use crate::config::MotionConfig;

/// Chases the latest hand target by a fixed fraction each frame.
///
/// Detection runs slower and less regularly than the render tick; the
/// smoother only ever reads the target currently held, so any number of
/// frames may reuse the same target.
#[derive(Debug, Clone)]
pub struct MotionSmoother {
    position: Vec3,
    target: Vec3,
    factor: f32,
}

impl MotionSmoother {
    /// Starts at rest at the origin.
    pub fn new(config: &MotionConfig) -> Self {
        Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            factor: config.smoothing,
        }
    }

    /// Replace the target. Last write wins.
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Advance one frame and return the new position.
    pub fn step(&mut self) -> Vec3 {
        self.position = self.position.lerp(self.target, self.factor);
        self.position
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }
}
