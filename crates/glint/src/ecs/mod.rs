//! # Signature-Based ECS
//!
//! A small Entity Component System in the classic "coordinator" shape:
//! entities are plain ids, each component type lives in its own packed
//! array, and systems keep the set of entities whose component signature
//! satisfies theirs. Events are a separate publish/subscribe channel for
//! things that aren't per-entity data (window resizes, quit, input).
//!
//! ## Module Overview
//!
//! - [`entity`] — Id allocation with LIFO recycling, one signature per id
//! - [`signature`] — 64-bit component bit-sets
//! - [`component`] — Packed per-type arrays and the type registry
//! - [`system`] — The `System` trait and matched-entity tracking
//! - [`event`] — Hashed event ids, typed parameters, listener dispatch
//! - [`coordinator`] — The facade that keeps all of the above consistent
//! - [`error`] — Error types for every fallible operation
//!
//! ## Quick Start
//!
//! ```ignore
//! let mut ecs = Coordinator::default();
//! ecs.register_component::<Transform>()?;
//! ecs.register_component::<Camera>()?;
//!
//! let control = ecs.register_system::<CameraControl>()?;
//! let required = ecs.signature_of::<(Transform, Camera)>()?;
//! ecs.set_system_signature(control, required)?;
//!
//! ecs.spawn((Transform::from_xyz(0.0, 2.0, 5.0), Camera::default()))?;
//! ecs.update_system(control, 1.0 / 60.0)?;
//! ```

pub mod component;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod event;
pub mod signature;
pub mod system;

pub use component::{ComponentArray, ComponentBundle};
pub use coordinator::{Coordinator, EcsStats};
pub use entity::Entity;
pub use error::{EcsError, EcsResult, EventError};
pub use event::{Event, EventId, EventManager, ListenerId, Param, ParamId, ParamKind, ParamValue};
pub use signature::{ComponentType, MAX_COMPONENTS, Signature};
pub use system::{System, SystemHandle};
