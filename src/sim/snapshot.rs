//! Per-frame render view

use glam::Vec3;
use serde::Serialize;

use super::machine::Phase;

/// Everything a renderer needs to draw one frame, minus the particle buffers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub phase: Phase,
    pub body: BodyView,
    pub particles: ParticleView,
    /// Point light that trails the body while it is solid
    pub light_position: Vec3,
    /// Latest hand target, before smoothing
    pub target_position: Vec3,
    pub fist_closed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyView {
    pub visible: bool,
    pub position: Vec3,
    /// Euler angles (x, y, z) in radians
    pub rotation: Vec3,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleView {
    pub visible: bool,
    pub count: usize,
}
