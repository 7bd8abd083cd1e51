//! Hand position to world position

use glam::{Vec2, Vec3};

use crate::config::SceneConfig;
use crate::tracking::landmarks::{LandmarkSet, PALM_POINTS};

/// Maps the palm center in image space onto the body's working plane.
///
/// The plane is z = 0, seen by a perspective camera `camera_distance` away.
/// Horizontal motion is mirrored so the body follows the hand like a
/// reflection.
#[derive(Debug, Clone, Copy)]
pub struct PoseMapper {
    /// Half of the visible width at z = 0, scaled by reach
    half_width: f32,
    /// Half of the visible height at z = 0, scaled by reach
    half_height: f32,
}

impl PoseMapper {
    pub fn new(scene: &SceneConfig) -> Self {
        let fov = scene.fov_y_degrees.to_radians();
        let visible_height = 2.0 * (fov / 2.0).tan() * scene.camera_distance;
        let visible_width = visible_height * scene.aspect;

        Self {
            half_width: visible_width / 2.0 * scene.reach,
            half_height: visible_height / 2.0 * scene.reach,
        }
    }

    /// Largest |x| and |y| a target can reach.
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.half_width, self.half_height)
    }

    /// Target position for this landmark set, or `None` if the palm
    /// landmarks are missing or not finite.
    pub fn map(&self, landmarks: &LandmarkSet) -> Option<Vec3> {
        let center = palm_center(landmarks)?;

        let ndc_x = (1.0 - center.x) * 2.0 - 1.0;
        let ndc_y = -(center.y * 2.0 - 1.0);

        let target = Vec3::new(ndc_x * self.half_width, ndc_y * self.half_height, 0.0);
        target.is_finite().then_some(target)
    }
}

/// Mean of wrist, index base and pinky base.
pub fn palm_center(landmarks: &LandmarkSet) -> Option<Vec2> {
    let mut sum = Vec2::ZERO;
    for index in PALM_POINTS {
        sum += landmarks.get(index)?;
    }
    Some(sum / PALM_POINTS.len() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palm_at(x: f32, y: f32) -> LandmarkSet {
        LandmarkSet::from(vec![[x, y]; 21])
    }

    fn default_mapper() -> PoseMapper {
        PoseMapper::new(&SceneConfig::default())
    }

    #[test]
    fn test_center_of_image_maps_to_origin() {
        let target = default_mapper().map(&palm_at(0.5, 0.5)).unwrap();
        assert!(target.abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn test_visible_extent_matches_projection() {
        // fov 75, distance 12, aspect 16:9, reach 0.8
        let extent = default_mapper().extent();
        let visible_height = 2.0 * (37.5f32).to_radians().tan() * 12.0;
        assert!((extent.y - visible_height / 2.0 * 0.8).abs() < 1e-4);
        assert!((extent.x - visible_height * (16.0 / 9.0) / 2.0 * 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_horizontal_is_mirrored_and_vertical_flipped() {
        let mapper = default_mapper();
        let extent = mapper.extent();

        // Hand at the image's left edge and top edge
        let target = mapper.map(&palm_at(0.0, 0.0)).unwrap();
        assert!((target.x - extent.x).abs() < 1e-4);
        assert!((target.y - extent.y).abs() < 1e-4);
        assert_eq!(target.z, 0.0);

        let target = mapper.map(&palm_at(1.0, 1.0)).unwrap();
        assert!((target.x + extent.x).abs() < 1e-4);
        assert!((target.y + extent.y).abs() < 1e-4);
    }

    #[test]
    fn test_uses_only_palm_points() {
        let mut points = vec![[0.9, 0.9]; 21];
        points[0] = [0.2, 0.4];
        points[5] = [0.3, 0.4];
        points[17] = [0.4, 0.1];
        let center = palm_center(&LandmarkSet::from(points)).unwrap();
        assert!(center.abs_diff_eq(Vec2::new(0.3, 0.3), 1e-6));
    }

    #[test]
    fn test_short_set_is_skipped() {
        let mapper = default_mapper();
        assert!(mapper.map(&LandmarkSet::from(vec![[0.5, 0.5]; 17])).is_none());
        assert!(mapper.map(&LandmarkSet::from(Vec::new())).is_none());
        // Indices 0, 5 and 17 are enough
        assert!(mapper.map(&LandmarkSet::from(vec![[0.5, 0.5]; 18])).is_some());
    }

    #[test]
    fn test_non_finite_palm_is_skipped() {
        let mut points = vec![[0.5, 0.5]; 21];
        points[0] = [f32::INFINITY, 0.5];
        assert!(default_mapper().map(&LandmarkSet::from(points)).is_none());
    }
}
