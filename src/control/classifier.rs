//! Open hand / fist classification with hysteresis

use serde::Serialize;

use crate::config::GestureConfig;
use crate::tracking::landmarks::{LandmarkSet, FINGERTIPS, HAND_LANDMARK_COUNT, WRIST};

/// Edge emitted when the classification flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FistEvent {
    /// The hand just closed into a fist
    Closed,
    /// The hand just opened again
    Opened,
}

impl std::fmt::Display for FistEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FistEvent::Closed => write!(f, "closed"),
            FistEvent::Opened => write!(f, "opened"),
        }
    }
}

/// Two-threshold fist detector.
///
/// The hand closes when the mean fingertip-to-wrist distance drops below
/// `enter` and opens when it rises above `exit`. Between the two the
/// previous classification holds, so detection jitter around a single
/// threshold cannot toggle the body.
#[derive(Debug, Clone)]
pub struct FistClassifier {
    enter: f32,
    exit: f32,
    closed: bool,
}

impl FistClassifier {
    /// Starts open.
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            enter: config.enter_threshold,
            exit: config.exit_threshold,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Classify a landmark set. Incomplete sets are ignored.
    pub fn observe(&mut self, landmarks: &LandmarkSet) -> Option<FistEvent> {
        let spread = average_tip_distance(landmarks)?;
        self.update(spread)
    }

    /// Feed one averaged fingertip distance.
    pub fn update(&mut self, spread: f32) -> Option<FistEvent> {
        if !self.closed && spread < self.enter {
            self.closed = true;
            Some(FistEvent::Closed)
        } else if self.closed && spread > self.exit {
            self.closed = false;
            Some(FistEvent::Opened)
        } else {
            None
        }
    }
}

/// Mean distance from the four fingertips to the wrist, in image units.
pub fn average_tip_distance(landmarks: &LandmarkSet) -> Option<f32> {
    if landmarks.len() < HAND_LANDMARK_COUNT {
        return None;
    }

    let wrist = landmarks.get(WRIST)?;
    let mut total = 0.0;
    for tip in FINGERTIPS {
        total += landmarks.get(tip)?.distance(wrist);
    }
    Some(total / FINGERTIPS.len() as f32)
}
