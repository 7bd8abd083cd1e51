//! Explosion state machine

use glam::Vec3;
use serde::{Deserialize, Serialize};

use handburst_fx::ParticleSystem;

use crate::config::ParticleConfig;
use crate::control::FistEvent;

/// What the body is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Solid body at the smoothed position
    Idle,
    /// Particles flying outward
    Exploding,
    /// Particles flying back to their anchors
    Reforming,
}

impl Default for Phase {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Exploding => write!(f, "exploding"),
            Phase::Reforming => write!(f, "reforming"),
        }
    }
}

/// A phase change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
}

/// Owns the phase and drives the particle system according to it.
///
/// Visibility follows directly from the phase: the solid body shows only
/// while idle and the particle cloud shows otherwise, so the two are never
/// on screen together.
#[derive(Debug, Clone)]
pub struct ExplosionMachine {
    phase: Phase,
    reform_speed: f32,
    convergence_epsilon: f32,
}

impl ExplosionMachine {
    pub fn new(config: &ParticleConfig) -> Self {
        Self {
            phase: Phase::Idle,
            reform_speed: config.reform_speed,
            convergence_epsilon: config.convergence_epsilon,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn body_visible(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn particles_visible(&self) -> bool {
        !self.body_visible()
    }

    /// React to a fist edge. `center` is the current smoothed position.
    ///
    /// Only Idle+Closed and Exploding+Opened change the phase.
    pub fn handle(
        &mut self,
        event: FistEvent,
        particles: &mut ParticleSystem,
        center: Vec3,
    ) -> Option<Transition> {
        let next = match (self.phase, event) {
            (Phase::Idle, FistEvent::Closed) => {
                // Shell burst: start from the body surface, not its center
                particles.place_on_shell(center);
                Phase::Exploding
            }
            (Phase::Exploding, FistEvent::Opened) => Phase::Reforming,
            // Reformation always runs to completion; a fist still held at
            // that point bursts the body again from the shell
            _ => return None,
        };

        Some(self.enter(next))
    }

    /// Run one frame of particle motion for the current phase.
    ///
    /// Returns the transition to idle when reformation converges this frame.
    pub fn advance(&mut self, particles: &mut ParticleSystem, center: Vec3) -> Option<Transition> {
        match self.phase {
            Phase::Idle => None,
            Phase::Exploding => {
                particles.advance_explosion();
                None
            }
            Phase::Reforming => {
                let max_dist = particles.advance_reformation(center, self.reform_speed);
                if max_dist < self.convergence_epsilon {
                    particles.place_on_shell(center);
                    Some(self.enter(Phase::Idle))
                } else {
                    None
                }
            }
        }
    }

    fn enter(&mut self, to: Phase) -> Transition {
        let from = self.phase;
        self.phase = to;
        tracing::debug!("Phase change: {} -> {}", from, to);
        Transition { from, to }
    }
}
