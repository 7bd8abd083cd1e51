//! Hand landmark set as produced by the detection model

use glam::Vec2;

pub const WRIST: usize = 0;
pub const INDEX_MCP: usize = 5;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_TIP: usize = 20;

/// Number of landmarks in a complete hand
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Palm base points averaged for the hand position
pub const PALM_POINTS: [usize; 3] = [WRIST, INDEX_MCP, PINKY_MCP];

/// Fingertips compared against the wrist for fist detection
pub const FINGERTIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// One detection cycle's landmarks in normalized image space.
///
/// x grows to the right and y grows downward, both in [0, 1]. Sets longer
/// than a hand are truncated; shorter sets are kept and consumers check for
/// the indices they need.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Vec2>,
}

impl LandmarkSet {
    pub fn new(mut points: Vec<Vec2>) -> Self {
        points.truncate(HAND_LANDMARK_COUNT);
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when all 21 hand landmarks are present
    pub fn is_complete(&self) -> bool {
        self.points.len() == HAND_LANDMARK_COUNT
    }

    pub fn get(&self, index: usize) -> Option<Vec2> {
        self.points.get(index).copied()
    }

    /// True when every coordinate is a finite number
    pub fn is_finite(&self) -> bool {
        self.points.iter().all(|p| p.is_finite())
    }
}

impl From<Vec<[f32; 2]>> for LandmarkSet {
    fn from(points: Vec<[f32; 2]>) -> Self {
        Self::new(points.into_iter().map(Vec2::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_extra_points() {
        let set = LandmarkSet::from(vec![[0.5, 0.5]; 30]);
        assert_eq!(set.len(), HAND_LANDMARK_COUNT);
        assert!(set.is_complete());
    }

    #[test]
    fn test_short_set_lookup() {
        let set = LandmarkSet::from(vec![[0.1, 0.2]; 6]);
        assert!(!set.is_complete());
        assert_eq!(set.get(INDEX_MCP), Some(Vec2::new(0.1, 0.2)));
        assert_eq!(set.get(PINKY_MCP), None);
    }

    #[test]
    fn test_is_finite() {
        let mut points = vec![[0.5, 0.5]; 21];
        assert!(LandmarkSet::from(points.clone()).is_finite());
        points[3] = [f32::INFINITY, 0.5];
        assert!(!LandmarkSet::from(points.clone()).is_finite());
        points[3] = [0.5, f32::NAN];
        assert!(!LandmarkSet::from(points).is_finite());
    }
}
