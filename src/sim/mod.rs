//! Simulation context and frame driver
//!
//! [`Simulation`] owns every piece of mutable scene state: the smoothed body
//! position, the explosion phase and the particle buffers. Nothing here is
//! global; the frame driver owns one instance and feeds it control updates
//! and ticks.

pub mod driver;
pub mod machine;
pub mod mailbox;
pub mod smoothing;
pub mod snapshot;

pub use driver::FrameDriver;
pub use machine::{ExplosionMachine, Phase, Transition};
pub use mailbox::LatestCell;
pub use smoothing::MotionSmoother;
pub use snapshot::{BodyView, FrameSnapshot, ParticleView};

use glam::Vec3;

use handburst_fx::ParticleSystem;

use crate::config::Config;
use crate::control::{ControlUpdate, FistEvent};

pub struct Simulation {
    smoother: MotionSmoother,
    machine: ExplosionMachine,
    particles: ParticleSystem,
    fist_closed: bool,
    body_radius: f32,
    body_position: Vec3,
    rotation: Vec3,
    spin: Vec3,
    light_position: Vec3,
    frame: u64,
    positions_dirty: bool,
}

impl Simulation {
    pub fn new(config: &Config) -> Self {
        let particles = ParticleSystem::new(&config.particle_params());
        tracing::info!(
            "Simulation ready: {} particles, body radius {}",
            particles.len(),
            config.scene.body_radius
        );

        Self {
            smoother: MotionSmoother::new(&config.motion),
            machine: ExplosionMachine::new(&config.particles),
            particles,
            fist_closed: false,
            body_radius: config.scene.body_radius,
            body_position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            spin: Vec3::new(config.scene.spin_x, config.scene.spin_y, 0.0),
            light_position: Vec3::ZERO,
            frame: 0,
            positions_dirty: true,
        }
    }

    /// Apply the latest control state.
    ///
    /// Returns the fist edge seen since the previous update, if any. The edge
    /// acts at the current smoothed position.
    pub fn apply(&mut self, update: &ControlUpdate) -> Option<FistEvent> {
        if let Some(target) = update.target {
            self.smoother.set_target(target);
        }

        if update.fist_closed == self.fist_closed {
            return None;
        }
        self.fist_closed = update.fist_closed;

        let event = if update.fist_closed {
            FistEvent::Closed
        } else {
            FistEvent::Opened
        };

        let center = self.smoother.position();
        if self
            .machine
            .handle(event, &mut self.particles, center)
            .is_some()
        {
            self.positions_dirty = true;
        }
        Some(event)
    }

    /// Advance one render frame.
    pub fn tick(&mut self) -> FrameSnapshot {
        self.frame += 1;

        let position = self.smoother.step();
        let was_visible = self.machine.particles_visible();
        let transition = self.machine.advance(&mut self.particles, position);
        if was_visible {
            self.positions_dirty = true;
        }

        if transition.is_some() {
            // Reformed this frame: body reappears without spinning
            self.body_position = position;
            self.light_position = position;

            if self.fist_closed {
                self.machine
                    .handle(FistEvent::Closed, &mut self.particles, position);
            }
        } else if self.machine.phase() == Phase::Idle {
            self.body_position = position;
            self.light_position = position;
            self.rotation += self.spin;
        }

        self.snapshot()
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.frame,
            phase: self.machine.phase(),
            body: BodyView {
                visible: self.machine.body_visible(),
                position: self.body_position,
                rotation: self.rotation,
                radius: self.body_radius,
            },
            particles: ParticleView {
                visible: self.machine.particles_visible(),
                count: self.particles.len(),
            },
            light_position: self.light_position,
            target_position: self.smoother.target(),
            fist_closed: self.fist_closed,
        }
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn smoothed_position(&self) -> Vec3 {
        self.smoother.position()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// True once per change of the particle positions.
    pub fn take_positions_dirty(&mut self) -> bool {
        std::mem::take(&mut self.positions_dirty)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::control::HandControl;
    use crate::tracking::landmarks::{FINGERTIPS, PALM_POINTS};
    use crate::tracking::LandmarkSet;

    /// Hand with its palm at (`x`, `y`) and fingertips `spread` above the wrist.
    pub(crate) fn hand(x: f32, y: f32, spread: f32) -> LandmarkSet {
        let mut points = vec![[x, y]; 21];
        for tip in FINGERTIPS {
            points[tip] = [x, y - spread];
        }
        for palm in PALM_POINTS {
            points[palm] = [x, y];
        }
        LandmarkSet::from(points)
    }

    pub(crate) fn small_config() -> Config {
        let mut config = Config::default();
        config.particles.count = 256;
        config
    }

    /// Simulation plus the detection-side control that feeds it
    struct Rig {
        control: HandControl,
        sim: Simulation,
    }

    impl Rig {
        fn new(config: &Config) -> Self {
            Self {
                control: HandControl::new(config),
                sim: Simulation::new(config),
            }
        }

        fn detect(&mut self, landmarks: &LandmarkSet) -> Option<FistEvent> {
            let update = self.control.process(landmarks);
            self.sim.apply(&update)
        }

        fn tick_until(&mut self, phase: Phase) -> FrameSnapshot {
            for _ in 0..500 {
                let snap = self.sim.tick();
                assert!(self.sim.particles().all_finite());
                if snap.phase == phase {
                    return snap;
                }
            }
            panic!("never reached {}", phase);
        }
    }

    fn assert_on_shell(sim: &Simulation, center: Vec3) {
        for (pos, home) in sim
            .particles()
            .positions()
            .iter()
            .zip(sim.particles().home_offsets())
        {
            assert_eq!(*pos, center + *home);
        }
    }

    #[test]
    fn test_starts_idle_at_origin() {
        let mut sim = Simulation::new(&small_config());
        let snap = sim.tick();
        assert_eq!(snap.frame, 1);
        assert_eq!(snap.phase, Phase::Idle);
        assert!(snap.body.visible);
        assert!(!snap.particles.visible);
        assert_eq!(snap.body.position, Vec3::ZERO);
        assert_eq!(snap.particles.count, 256);
    }

    #[test]
    fn test_idle_spin_and_light_follow_body() {
        let mut rig = Rig::new(&small_config());
        rig.detect(&hand(0.25, 0.5, 0.5));

        let snap = rig.sim.tick();
        assert!(snap.body.position.x > 0.0);
        assert_eq!(snap.light_position, snap.body.position);
        assert!(snap.body.rotation.abs_diff_eq(Vec3::new(0.002, 0.005, 0.0), 1e-7));

        rig.sim.tick();
        let snap = rig.sim.tick();
        assert!(snap.body.rotation.abs_diff_eq(Vec3::new(0.006, 0.015, 0.0), 1e-6));
    }

    #[test]
    fn test_gesture_scenario() {
        let mut config = Config::default();
        config.particles.count = 4000;
        let mut rig = Rig::new(&config);

        let mut events = Vec::new();
        for spread in [0.5, 0.5, 0.1, 0.1, 0.1, 0.35] {
            events.push(rig.detect(&hand(0.5, 0.5, spread)));
            rig.sim.tick();
        }

        assert_eq!(
            events,
            vec![
                None,
                None,
                Some(FistEvent::Closed),
                None,
                None,
                Some(FistEvent::Opened)
            ]
        );
        assert_eq!(rig.sim.phase(), Phase::Reforming);
        assert_eq!(rig.sim.particles().len(), 4000);
        assert!(rig.sim.particles().all_finite());
    }

    #[test]
    fn test_round_trip_lands_body_at_smoothed_position() {
        let mut rig = Rig::new(&small_config());

        rig.detect(&hand(0.5, 0.5, 0.1));
        assert_eq!(rig.sim.phase(), Phase::Exploding);
        for _ in 0..5 {
            let snap = rig.sim.tick();
            assert!(!snap.body.visible);
            assert!(snap.particles.visible);
        }

        // Open the hand somewhere else and let the cloud chase it
        rig.detect(&hand(0.2, 0.3, 0.5));
        assert_eq!(rig.sim.phase(), Phase::Reforming);

        let snap = rig.tick_until(Phase::Idle);
        let smoothed = rig.sim.smoothed_position();
        assert!(snap.body.visible);
        assert!(!snap.particles.visible);
        assert_eq!(snap.body.position, smoothed);
        assert_eq!(snap.light_position, smoothed);
        assert_on_shell(&rig.sim, smoothed);
    }

    #[test]
    fn test_fist_held_through_reformation_bursts_again() {
        let mut rig = Rig::new(&small_config());

        rig.detect(&hand(0.5, 0.5, 0.1));
        for _ in 0..20 {
            rig.sim.tick();
        }
        rig.detect(&hand(0.5, 0.5, 0.5));
        rig.sim.tick();
        assert_eq!(rig.sim.phase(), Phase::Reforming);

        // Closing mid-reform does not interrupt the return
        assert_eq!(rig.detect(&hand(0.5, 0.5, 0.1)), Some(FistEvent::Closed));
        assert_eq!(rig.sim.phase(), Phase::Reforming);

        // Once reformed, the held fist bursts from a fresh shell
        let snap = rig.tick_until(Phase::Exploding);
        assert!(snap.fist_closed);
        assert!(snap.particles.visible);
        assert_on_shell(&rig.sim, rig.sim.smoothed_position());
    }

    #[test]
    fn test_open_during_reform_finishes_idle() {
        let mut rig = Rig::new(&small_config());
        rig.detect(&hand(0.5, 0.5, 0.1));
        rig.sim.tick();
        rig.detect(&hand(0.5, 0.5, 0.5));

        let snap = rig.tick_until(Phase::Idle);
        assert!(!snap.fist_closed);
        assert!(snap.body.visible);
    }

    #[test]
    fn test_rotation_frozen_while_hidden() {
        let mut rig = Rig::new(&small_config());
        rig.sim.tick();
        let before = rig.sim.snapshot().body.rotation;

        rig.detect(&hand(0.5, 0.5, 0.1));
        for _ in 0..10 {
            rig.sim.tick();
        }
        assert_eq!(rig.sim.snapshot().body.rotation, before);
    }

    #[test]
    fn test_short_set_changes_nothing() {
        let mut rig = Rig::new(&small_config());
        let before = rig.sim.snapshot();

        assert_eq!(rig.detect(&LandmarkSet::from(vec![[0.9, 0.1]; 10])), None);
        assert_eq!(rig.sim.snapshot(), before);
    }

    #[test]
    fn test_non_finite_detection_keeps_positions_finite() {
        let mut rig = Rig::new(&small_config());
        rig.detect(&hand(0.4, 0.5, 0.5));
        rig.sim.tick();

        let mut points = vec![[0.5, 0.5]; 21];
        points[0] = [f32::INFINITY, 0.5];
        points[5] = [0.5, f32::NAN];
        rig.detect(&LandmarkSet::from(points));
        rig.sim.tick();
        assert!(rig.sim.smoothed_position().is_finite());

        rig.detect(&hand(0.5, 0.5, 0.1));
        for _ in 0..5 {
            rig.sim.tick();
        }
        rig.detect(&hand(0.5, 0.5, 0.5));
        rig.tick_until(Phase::Idle);
        assert!(rig.sim.particles().all_finite());
        assert!(rig.sim.smoothed_position().is_finite());
    }

    #[test]
    fn test_positions_dirty_tracking() {
        let mut rig = Rig::new(&small_config());
        assert!(rig.sim.take_positions_dirty());
        rig.sim.tick();
        assert!(!rig.sim.take_positions_dirty());

        rig.detect(&hand(0.5, 0.5, 0.1));
        assert!(rig.sim.take_positions_dirty());
        rig.sim.tick();
        assert!(rig.sim.take_positions_dirty());
    }
}
