//! Per-detection control state

use glam::Vec3;

use crate::config::Config;
use crate::tracking::landmarks::LandmarkSet;

use super::{FistClassifier, PoseMapper};

/// What the simulation needs from the detection feed: where the body should
/// go and whether the hand is currently a fist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlUpdate {
    /// Latest mapped target, `None` until a palm has been seen
    pub target: Option<Vec3>,
    /// Classification after the most recent detection cycle
    pub fist_closed: bool,
}

/// Runs the pose mapper and the fist classifier once per detection cycle.
///
/// Lives on the detection side of the mailbox, so the hysteresis sees every
/// cycle no matter how many of them land between two render ticks.
#[derive(Debug, Clone)]
pub struct HandControl {
    mapper: PoseMapper,
    classifier: FistClassifier,
    target: Option<Vec3>,
}

impl HandControl {
    pub fn new(config: &Config) -> Self {
        Self {
            mapper: PoseMapper::new(&config.scene),
            classifier: FistClassifier::new(&config.gesture),
            target: None,
        }
    }

    /// Fold one landmark set into the control state.
    ///
    /// A set that cannot feed the mapper or the classifier leaves that part unchanged.
    pub fn process(&mut self, landmarks: &LandmarkSet) -> ControlUpdate {
        match self.mapper.map(landmarks) {
            Some(target) => self.target = Some(target),
            None => tracing::debug!("Skipping pose: {} landmarks", landmarks.len()),
        }

        if let Some(event) = self.classifier.observe(landmarks) {
            tracing::debug!("Fist {}", event);
        }

        self.current()
    }

    pub fn current(&self) -> ControlUpdate {
        ControlUpdate {
            target: self.target,
            fist_closed: self.classifier.is_closed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tests::hand;

    #[test]
    fn test_starts_without_target() {
        let control = HandControl::new(&Config::default());
        assert_eq!(
            control.current(),
            ControlUpdate {
                target: None,
                fist_closed: false
            }
        );
    }

    #[test]
    fn test_dead_band_holds_across_cycles() {
        let mut control = HandControl::new(&Config::default());
        assert!(control.process(&hand(0.5, 0.5, 0.1)).fist_closed);
        assert!(control.process(&hand(0.5, 0.5, 0.25)).fist_closed);
        assert!(!control.process(&hand(0.5, 0.5, 0.35)).fist_closed);
    }

    #[test]
    fn test_short_set_keeps_previous_target() {
        let mut control = HandControl::new(&Config::default());
        let first = control.process(&hand(0.25, 0.5, 0.5));
        assert!(first.target.is_some());

        let next = control.process(&LandmarkSet::from(vec![[0.9, 0.9]; 10]));
        assert_eq!(next.target, first.target);
        assert!(!next.fist_closed);
    }

    #[test]
    fn test_non_finite_palm_keeps_previous_target() {
        let mut control = HandControl::new(&Config::default());
        let first = control.process(&hand(0.5, 0.5, 0.5));

        let mut points = vec![[0.5, 0.5]; 21];
        points[0] = [f32::INFINITY, 0.5];
        let bad = LandmarkSet::from(points);

        let next = control.process(&bad);
        assert_eq!(next.target, first.target);
        assert!(next.target.unwrap().is_finite());
    }
}
