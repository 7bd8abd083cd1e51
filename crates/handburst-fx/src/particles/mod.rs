mod system;

pub use system::{ParticleParams, ParticleStyle, ParticleSystem};
