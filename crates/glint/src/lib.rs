//! # Glint — ECS Core for a 3D Sandbox
//!
//! A signature-based Entity Component System plus the thin layer a 3D
//! sandbox needs to drive it: transforms and cameras, an input snapshot
//! model, fly-camera and first-person systems, and a frame driver that
//! hands camera matrices to whatever renderer you plug in.
//!
//! Start with `use glint::prelude::*` and build a [`Sandbox`](frame::Sandbox),
//! or use [`ecs::Coordinator`] on its own.

pub mod camera;
pub mod config;
pub mod ecs;
pub mod frame;
pub mod input;
pub mod math;
pub mod prelude;
pub mod render;
pub mod systems;
pub mod time;
