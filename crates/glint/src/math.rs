//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. The [`Transform`] component carries position,
//! rotation and scale for anything placed in the scene, cameras included.
//!
//! Conventions are right-handed with `-Z` forward and `+Y` up, matching
//! [`Mat4::look_at_rh`] and [`Mat4::perspective_rh`].

pub use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};

/// A 3D transform: position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform (origin, no rotation, uniform scale of 1).
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a transform at the given position.
    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self::from_translation(Vec3::new(x, y, z))
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Rotate so that `forward()` points at `target`.
    ///
    /// `Transform::from_xyz(0.0, 5.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y)`
    /// places a camera at (0,5,10) looking toward the origin. Returns `self`
    /// unchanged when `target` coincides with the translation.
    pub fn looking_at(mut self, target: Vec3, up: Vec3) -> Self {
        if (target - self.translation).length_squared() <= f32::EPSILON {
            return self;
        }
        let look = Mat4::look_at_rh(self.translation, target, up);
        let (_, rotation, _) = look.inverse().to_scale_rotation_translation();
        self.rotation = rotation.normalize();
        self
    }

    /// Return a copy with uniform scale applied.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// The 4x4 model matrix: translate * rotate * scale.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Move in world space.
    pub fn translate(&mut self, offset: Vec3) {
        self.translation += offset;
    }

    /// Move along the transform's own axes (`x` right, `y` up, `z` back).
    pub fn translate_local(&mut self, offset: Vec3) {
        self.translation += self.rotation * offset;
    }

    /// Apply `rotation` in world space, after the current rotation.
    pub fn rotate(&mut self, rotation: Quat) {
        self.rotation = (rotation * self.rotation).normalize();
    }

    /// Rotate by `angle` radians around a world-space `axis`.
    pub fn rotate_axis(&mut self, axis: Vec3, angle: f32) {
        self.rotate(Quat::from_axis_angle(axis.normalize(), angle));
    }

    /// Map a point from local to world space.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * (self.scale * point)
    }

    /// Map a direction from local to world space. Translation is ignored.
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * (self.scale * vector)
    }

    /// Map a point from world to local space.
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        (self.rotation.inverse() * (point - self.translation)) / self.scale
    }

    /// Interpolate translation and scale linearly, rotation spherically.
    pub fn lerp(&self, other: &Transform, t: f32) -> Transform {
        Transform {
            translation: self.translation.lerp(other.translation, t),
            rotation: self.rotation.slerp(other.rotation, t),
            scale: self.scale.lerp(other.scale, t),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
