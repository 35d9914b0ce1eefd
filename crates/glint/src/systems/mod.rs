//! Built-in systems that turn input into camera motion.
//!
//! Both systems subscribe to `window::INPUT` in [`System::init`] and keep the
//! most recent [`InputSnapshot`] in a shared cell. Mouse motion is consumed
//! by the first update after it arrives, so a frame without a fresh input
//! event doesn't replay the last delta.
//!
//! [`System::init`]: crate::ecs::System::init

pub mod camera_control;
pub mod player;

pub use camera_control::{CameraControl, FlyCamera};
pub use player::{PlayerController, PlayerMovement};

use std::cell::Cell;
use std::rc::Rc;

use crate::ecs::event::window;
use crate::ecs::EventManager;
use crate::input::InputSnapshot;
use crate::math::{EulerRot, Quat, Transform, Vec2};

/// Pitch stays just short of straight up or down.
const PITCH_LIMIT_DEGREES: f32 = 89.0;

/// Latest input seen on the event bus.
#[derive(Debug, Clone, Default)]
pub(crate) struct InputCell(Rc<Cell<InputSnapshot>>);

impl InputCell {
    /// Create a cell fed by every `window::INPUT` event.
    pub(crate) fn subscribe(events: &mut EventManager) -> Self {
        let cell = Self::default();
        let shared = Rc::clone(&cell.0);
        events.add_listener(window::INPUT, move |event| {
            match InputSnapshot::from_event(event) {
                Ok(snapshot) => shared.set(snapshot),
                Err(err) => log::warn!("ignoring malformed input event: {err}"),
            }
        });
        cell
    }

    /// Current snapshot. Mouse motion and scroll are cleared after reading;
    /// held buttons are kept.
    pub(crate) fn take(&self) -> InputSnapshot {
        let snapshot = self.0.get();
        self.0.set(InputSnapshot {
            mouse_delta: Vec2::ZERO,
            scroll: 0.0,
            ..snapshot
        });
        snapshot
    }
}

/// Turn by `delta` pixels of mouse motion: yaw around world up, pitch around
/// the camera's right axis, no roll.
pub(crate) fn mouse_look(transform: &mut Transform, delta: Vec2, degrees_per_pixel: f32) {
    if delta == Vec2::ZERO {
        return;
    }
    let (yaw, pitch, _) = transform.rotation.to_euler(EulerRot::YXZ);
    let limit = PITCH_LIMIT_DEGREES.to_radians();
    let yaw = yaw - (delta.x * degrees_per_pixel).to_radians();
    let pitch = (pitch - (delta.y * degrees_per_pixel).to_radians()).clamp(-limit, limit);
    transform.rotation = Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Event;
    use crate::input::{Button, ButtonSet};
    use crate::math::Vec3;

    #[test]
    fn mouse_right_turns_right() {
        let mut transform = Transform::IDENTITY;
        mouse_look(&mut transform, Vec2::new(900.0, 0.0), 0.1);
        // 90 degrees to the right of -Z is +X.
        assert!(transform.forward().abs_diff_eq(Vec3::X, 1e-4));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut transform = Transform::IDENTITY;
        mouse_look(&mut transform, Vec2::new(0.0, -5000.0), 0.1);
        let (_, pitch, _) = transform.rotation.to_euler(EulerRot::YXZ);
        assert!((pitch.to_degrees() - PITCH_LIMIT_DEGREES).abs() < 1e-2);
        assert!(transform.forward().y > 0.99);
    }

    #[test]
    fn input_cell_consumes_motion_once() {
        let mut events = EventManager::new();
        let cell = InputCell::subscribe(&mut events);
        let snapshot = InputSnapshot {
            buttons: ButtonSet::EMPTY.with(Button::Forward),
            mouse_delta: Vec2::new(4.0, 0.0),
            scroll: 0.0,
        };
        events.send(&mut snapshot.to_event());

        assert_eq!(cell.take(), snapshot);
        let again = cell.take();
        assert_eq!(again.mouse_delta, Vec2::ZERO);
        assert!(again.buttons.contains(Button::Forward));
    }

    #[test]
    fn malformed_input_keeps_previous_snapshot() {
        let mut events = EventManager::new();
        let cell = InputCell::subscribe(&mut events);
        let held = InputSnapshot {
            buttons: ButtonSet::EMPTY.with(Button::Jump),
            ..InputSnapshot::default()
        };
        events.send(&mut held.to_event());
        events.send(&mut Event::new(window::INPUT));
        assert!(cell.take().buttons.contains(Button::Jump));
    }
}
