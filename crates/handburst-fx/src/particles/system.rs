use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Construction parameters for a [`ParticleSystem`]. Fixed for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleParams {
    /// Number of particles (N)
    pub count: usize,
    /// Radius of the body surface the home offsets sit on
    pub body_radius: f32,
    /// Lower bound of the per-particle explosion speed (units per frame)
    pub speed_min: f32,
    /// Upper bound of the per-particle explosion speed (units per frame)
    pub speed_max: f32,
    /// RNG seed for home offsets, speeds and cosmetics
    pub seed: u64,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            count: 4000,
            body_radius: 2.0,
            speed_min: 0.1,
            speed_max: 0.3,
            seed: 0x5EED_B005,
        }
    }
}

/// Per-particle cosmetic data (16 bytes), uploaded once.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleStyle {
    pub color: [f32; 3],
    pub size: f32,
}

const CYAN: [f32; 3] = [0.0, 1.0, 1.0];
const MAGENTA: [f32; 3] = [1.0, 0.0, 1.0];
const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

const SIZE_MIN: f32 = 0.1;
const SIZE_MAX: f32 = 0.6;

/// Particle buffers in structure-of-arrays layout.
///
/// Index `i` in every buffer refers to the same particle. Home offsets and
/// velocities are drawn once in [`ParticleSystem::new`] and never change;
/// only positions move.
pub struct ParticleSystem {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    home_offsets: Vec<Vec3>,
    styles: Vec<ParticleStyle>,
}

impl ParticleSystem {
    pub fn new(params: &ParticleParams) -> Self {
        let mut rng = StdRng::seed_from_u64(params.seed);
        let (speed_lo, speed_hi) = if params.speed_min <= params.speed_max {
            (params.speed_min, params.speed_max)
        } else {
            (params.speed_max, params.speed_min)
        };

        let mut positions = Vec::with_capacity(params.count);
        let mut velocities = Vec::with_capacity(params.count);
        let mut home_offsets = Vec::with_capacity(params.count);
        let mut styles = Vec::with_capacity(params.count);

        for _ in 0..params.count {
            // Uniform on the sphere: azimuth uniform, polar angle from acos of a uniform cosine
            let theta = rng.gen::<f32>() * TAU;
            let phi = (rng.gen::<f32>() * 2.0 - 1.0).acos();
            let normal = Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());

            let home = normal * params.body_radius;
            let speed = rng.gen_range(speed_lo..=speed_hi);

            let roll = rng.gen::<f32>();
            let color = if roll < 0.3 {
                CYAN
            } else if roll < 0.6 {
                MAGENTA
            } else {
                WHITE
            };
            let size = rng.gen_range(SIZE_MIN..SIZE_MAX);

            home_offsets.push(home);
            positions.push(home);
            velocities.push(normal * speed);
            styles.push(ParticleStyle { color, size });
        }

        Self {
            positions,
            velocities,
            home_offsets,
            styles,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn home_offsets(&self) -> &[Vec3] {
        &self.home_offsets
    }

    pub fn styles(&self) -> &[ParticleStyle] {
        &self.styles
    }

    /// Position buffer as tightly packed `f32` triples, ready for upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Style buffer as packed `[r, g, b, size]` records.
    pub fn style_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.styles)
    }

    /// Put every particle on its home point around `center`.
    ///
    /// Used both for the shell-burst reset when an explosion starts and for
    /// the final snap when reformation converges.
    pub fn place_on_shell(&mut self, center: Vec3) {
        for (pos, home) in self.positions.iter_mut().zip(&self.home_offsets) {
            *pos = center + *home;
        }
    }

    /// One explosion frame: constant velocity, no drag.
    pub fn advance_explosion(&mut self) {
        for (pos, vel) in self.positions.iter_mut().zip(&self.velocities) {
            *pos += *vel;
        }
    }

    /// One reformation frame toward `center + home`, moving at most `step`
    /// per particle.
    ///
    /// Returns the largest distance to target measured before moving. A NaN
    /// distance anywhere makes the result NaN, which never compares as
    /// converged.
    pub fn advance_reformation(&mut self, center: Vec3, step: f32) -> f32 {
        let mut max_dist = 0.0f32;

        for (pos, home) in self.positions.iter_mut().zip(&self.home_offsets) {
            let target = center + *home;
            let delta = target - *pos;
            let dist = delta.length();

            // dist == 0 lands here too, so the division below never sees zero
            if dist < step {
                *pos = target;
            } else {
                *pos += delta / dist * step;
            }

            max_dist = nan_max(max_dist, dist);
        }

        max_dist
    }

    /// Largest distance of any particle from `center + home`.
    pub fn max_distance_to_shell(&self, center: Vec3) -> f32 {
        self.positions
            .iter()
            .zip(&self.home_offsets)
            .map(|(pos, home)| (center + *home).distance(*pos))
            .fold(0.0, nan_max)
    }

    pub fn all_finite(&self) -> bool {
        self.positions.iter().all(|p| p.is_finite())
    }
}

/// `f32::max` that keeps NaN instead of discarding it
fn nan_max(a: f32, b: f32) -> f32 {
    if a.is_nan() || b.is_nan() {
        f32::NAN
    } else {
        a.max(b)
    }
}
