//! Convenience re-exports — `use glint::prelude::*` for the common items.

// Core
pub use crate::ecs::event::window;
pub use crate::ecs::{
    ComponentBundle, ComponentType, Coordinator, EcsError, EcsResult, Entity, Event, EventError,
    EventId, ParamId, Signature, System, SystemHandle,
};

pub use crate::camera::Camera;
pub use crate::config::{SandboxConfig, init_logger};
pub use crate::frame::Sandbox;
pub use crate::input::{Button, ButtonSet, InputSnapshot, InputState, KeyBindings, KeyCode};
pub use crate::math::{Mat4, Quat, Transform, Vec2, Vec3};
pub use crate::render::{FrameView, Renderer};
pub use crate::systems::{CameraControl, FlyCamera, PlayerController, PlayerMovement};
pub use crate::time::Time;
