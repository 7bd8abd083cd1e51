//! Particle buffers and per-frame kinematics for the handburst body.
//!
//! The body is represented by N particles anchored on a sphere. This crate
//! owns their buffers and the two motions they go through: a constant-velocity
//! outward burst and a constant-speed return to their anchors.

pub mod particles;

pub use glam::Vec3;
pub use particles::{ParticleParams, ParticleStyle, ParticleSystem};
