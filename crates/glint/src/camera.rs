//! Perspective camera component. Pair with [`Transform`].
//!
//! The camera's position and orientation come from its `Transform`; the
//! [`Camera`] itself only holds lens settings. Exactly one camera should be
//! active at a time. When several are, the one with the lowest entity id
//! wins.

use serde::{Deserialize, Serialize};

use crate::config::CameraConfig;
use crate::ecs::{Coordinator, Entity};
use crate::math::{Mat4, Transform};

/// Lens settings for a perspective camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub active: bool,
}

impl Camera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            fov_degrees: config.fov_degrees,
            near: config.near,
            far: config.far,
            active: true,
        }
    }

    /// Right-handed perspective projection for a viewport of `aspect`
    /// (width / height).
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, self.near, self.far)
    }

    /// World-to-view matrix for a camera placed at `transform`. Scale is
    /// ignored.
    pub fn view(transform: &Transform) -> Mat4 {
        Mat4::from_rotation_translation(transform.rotation, transform.translation).inverse()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

/// The active camera with the lowest entity id, if any has a `Transform`.
/// `None` as well when `Camera` was never registered.
pub fn active_camera(ecs: &Coordinator) -> Option<Entity> {
    ecs.component_array::<Camera>()
        .ok()?
        .iter()
        .filter(|(entity, camera)| camera.active && ecs.has_component::<Transform>(*entity))
        .map(|(entity, _)| entity)
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Vec3, Vec4};

    #[test]
    fn defaults_match_sandbox() {
        let camera = Camera::default();
        assert_eq!(camera.fov_degrees, 45.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 100.0);
        assert!(camera.active);
    }

    #[test]
    fn view_moves_eye_to_origin() {
        let transform = Transform::from_xyz(0.0, 2.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y);
        let view = Camera::view(&transform);
        assert!(view.transform_point3(transform.translation).abs_diff_eq(Vec3::ZERO, 1e-5));
        // The target sits straight ahead, on -Z in view space.
        let target = view.transform_point3(Vec3::ZERO);
        assert!(target.x.abs() < 1e-5 && target.y.abs() < 1e-5 && target.z < 0.0);
    }

    #[test]
    fn projection_maps_near_and_far() {
        let camera = Camera::default();
        let projection = camera.projection(16.0 / 9.0);
        let near = projection * Vec4::new(0.0, 0.0, -camera.near, 1.0);
        let far = projection * Vec4::new(0.0, 0.0, -camera.far, 1.0);
        assert!((near.z / near.w).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn no_camera_type_no_camera() {
        assert_eq!(active_camera(&Coordinator::default()), None);
    }

    #[test]
    fn lowest_active_camera_wins() {
        let mut ecs = Coordinator::default();
        ecs.register_component::<Transform>().unwrap();
        ecs.register_component::<Camera>().unwrap();

        let inactive = Camera {
            active: false,
            ..Camera::default()
        };
        ecs.spawn((Transform::IDENTITY, inactive)).unwrap();
        let lens_only = ecs.spawn((Camera::default(),)).unwrap();
        let second = ecs.spawn((Transform::IDENTITY, Camera::default())).unwrap();
        let third = ecs.spawn((Transform::IDENTITY, Camera::default())).unwrap();

        assert_eq!(active_camera(&ecs), Some(second));
        ecs.destroy_entity(second).unwrap();
        assert_eq!(active_camera(&ecs), Some(third));
        assert!(lens_only < third);
    }
}
