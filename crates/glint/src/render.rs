//! The seam between the sandbox and whatever draws it.
//!
//! The ECS core doesn't know about GPUs. Once per frame the
//! [`Sandbox`](crate::frame::Sandbox) finds the active camera, builds a
//! [`FrameView`] from its `Transform` and `Camera`, and hands it to a
//! [`Renderer`]. A wgpu or OpenGL backend implements the trait; tests and the
//! headless demo implement it with a few lines that just record what they
//! were given.

use crate::camera::Camera;
use crate::ecs::{Coordinator, EcsResult, Entity};
use crate::math::{Mat4, Transform, Vec3};

/// Camera matrices for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView {
    /// World to view space.
    pub view: Mat4,
    /// View to clip space.
    pub projection: Mat4,
    /// Camera position in world space.
    pub eye: Vec3,
    /// The camera entity the matrices came from.
    pub camera: Entity,
}

impl FrameView {
    /// Build the view for `camera`, which must have a `Transform` and a
    /// `Camera`.
    pub fn from_camera(ecs: &Coordinator, camera: Entity, aspect: f32) -> EcsResult<Self> {
        let transform = ecs.get_component::<Transform>(camera)?;
        let lens = ecs.get_component::<Camera>(camera)?;
        Ok(Self {
            view: Camera::view(transform),
            projection: lens.projection(aspect),
            eye: transform.translation,
            camera,
        })
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Receives one [`FrameView`] per rendered frame.
pub trait Renderer {
    fn render(&mut self, frame: &FrameView);
}

impl<F: FnMut(&FrameView)> Renderer for F {
    fn render(&mut self, frame: &FrameView) {
        self(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EcsError;

    #[test]
    fn frame_view_from_camera_entity() {
        let mut ecs = Coordinator::default();
        ecs.register_component::<Transform>().unwrap();
        ecs.register_component::<Camera>().unwrap();
        let transform = Transform::from_xyz(0.0, 2.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y);
        let camera = ecs.spawn((transform, Camera::default())).unwrap();

        let frame = FrameView::from_camera(&ecs, camera, 2.0).unwrap();
        assert_eq!(frame.eye, Vec3::new(0.0, 2.0, 5.0));
        assert_eq!(frame.camera, camera);
        assert_eq!(frame.projection, Camera::default().projection(2.0));
        assert_eq!(frame.view_projection(), frame.projection * frame.view);
    }

    #[test]
    fn frame_view_requires_transform() {
        let mut ecs = Coordinator::default();
        ecs.register_component::<Transform>().unwrap();
        ecs.register_component::<Camera>().unwrap();
        let lens_only = ecs.spawn((Camera::default(),)).unwrap();
        assert!(matches!(
            FrameView::from_camera(&ecs, lens_only, 1.0),
            Err(EcsError::ComponentMissing { .. })
        ));
    }

    #[test]
    fn closures_are_renderers() {
        let mut frames = 0;
        let mut renderer = |_: &FrameView| frames += 1;
        let view = FrameView {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            eye: Vec3::ZERO,
            camera: Entity(0),
        };
        renderer.render(&view);
        renderer.render(&view);
        assert_eq!(frames, 2);
    }
}
