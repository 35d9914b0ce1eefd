//! # Player — First-Person Walking
//!
//! A [`PlayerController`] component turns a camera into a walker: movement
//! is flattened onto the ground plane, gravity pulls the eye down to
//! `ground_level + eye_height`, and Jump launches it upward only while
//! grounded. With `noclip` set the player flies instead: movement follows
//! the view direction, Jump rises and Crouch sinks, and gravity is off.
//!
//! ```text
//!          jump (grounded only)
//!            │  velocity = jump_force
//!            ▼
//!   ┌──────────────────┐   y ≤ ground + eye_height   ┌──────────┐
//!   │ airborne         │ ──────────────────────────► │ grounded │
//!   │ velocity -= g·dt │                             │ velocity │
//!   └──────────────────┘ ◄────────────────────────── │ = 0      │
//!                            jump                    └──────────┘
//! ```

use serde::{Deserialize, Serialize};

use super::{InputCell, mouse_look};
use crate::config::{CameraConfig, PlayerConfig};
use crate::ecs::{Coordinator, EcsResult, Entity, EventManager, System};
use crate::input::{Button, ButtonSet, InputSnapshot};
use crate::math::Transform;

/// Walking parameters and per-player physics state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerController {
    pub move_speed: f32,
    pub jump_force: f32,
    pub gravity: f32,
    pub ground_level: f32,
    pub eye_height: f32,
    pub noclip: bool,
    /// Current vertical speed, positive up.
    pub vertical_velocity: f32,
    pub grounded: bool,
}

impl PlayerController {
    pub fn from_config(config: &PlayerConfig) -> Self {
        Self {
            move_speed: config.move_speed,
            jump_force: config.jump_force,
            gravity: config.gravity,
            ground_level: config.ground_level,
            eye_height: config.eye_height,
            noclip: config.noclip,
            vertical_velocity: 0.0,
            grounded: false,
        }
    }

    /// Lowest height the eye may reach.
    pub fn eye_floor(&self) -> f32 {
        self.ground_level + self.eye_height
    }

    /// Advance one step. `jump` is true only on the frame Jump went down.
    fn step(&mut self, transform: &mut Transform, input: &InputSnapshot, jump: bool, dt: f32) {
        let buttons = input.buttons;
        let mut travel = transform.forward() * axis(buttons, Button::Forward, Button::Backward)
            + transform.right() * axis(buttons, Button::Right, Button::Left);
        if !self.noclip {
            travel.y = 0.0;
        }
        if travel.length_squared() > 0.0 {
            transform.translate(travel.normalize() * self.move_speed * dt);
        }

        if self.noclip {
            let rise = axis(buttons, Button::Jump, Button::Crouch);
            transform.translation.y += rise * self.move_speed * dt;
            self.vertical_velocity = 0.0;
            self.grounded = false;
            return;
        }

        if jump && self.grounded {
            self.vertical_velocity = self.jump_force;
            self.grounded = false;
        }
        if !self.grounded {
            self.vertical_velocity -= self.gravity * dt;
        }
        transform.translation.y += self.vertical_velocity * dt;

        let floor = self.eye_floor();
        if transform.translation.y <= floor {
            transform.translation.y = floor;
            self.vertical_velocity = 0.0;
            self.grounded = true;
        } else {
            self.grounded = false;
        }
    }
}

impl Default for PlayerController {
    fn default() -> Self {
        Self::from_config(&PlayerConfig::default())
    }
}

fn axis(buttons: ButtonSet, positive: Button, negative: Button) -> f32 {
    buttons.contains(positive) as i32 as f32 - buttons.contains(negative) as i32 as f32
}

/// Drives every `Transform + PlayerController` entity.
#[derive(Debug)]
pub struct PlayerMovement {
    pub look_sensitivity: f32,
    input: InputCell,
    previous: ButtonSet,
}

impl PlayerMovement {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            look_sensitivity: config.look_sensitivity,
            input: InputCell::default(),
            previous: ButtonSet::EMPTY,
        }
    }
}

impl Default for PlayerMovement {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

impl System for PlayerMovement {
    fn init(&mut self, events: &mut EventManager) {
        self.input = InputCell::subscribe(events);
    }

    fn update(&mut self, ecs: &mut Coordinator, entities: &[Entity], dt: f32) -> EcsResult<()> {
        let input = self.input.take();
        let jump = input.buttons.contains(Button::Jump) && !self.previous.contains(Button::Jump);
        self.previous = input.buttons;

        for &entity in entities {
            if !ecs.is_alive(entity) {
                continue;
            }
            let mut controller = *ecs.get_component::<PlayerController>(entity)?;
            let transform = ecs.get_component_mut::<Transform>(entity)?;
            mouse_look(transform, input.mouse_delta, self.look_sensitivity);
            controller.step(transform, &input, jump, dt);
            *ecs.get_component_mut::<PlayerController>(entity)? = controller;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::SystemHandle;
    use crate::math::{Vec2, Vec3};

    const DT: f32 = 1.0 / 60.0;

    fn setup(
        controller: PlayerController,
        start: Vec3,
    ) -> (Coordinator, SystemHandle<PlayerMovement>, Entity) {
        let mut ecs = Coordinator::default();
        ecs.register_component::<Transform>().unwrap();
        ecs.register_component::<PlayerController>().unwrap();
        let movement = ecs.register_system::<PlayerMovement>().unwrap();
        let required = ecs.signature_of::<(Transform, PlayerController)>().unwrap();
        ecs.set_system_signature(movement, required).unwrap();
        let player = ecs
            .spawn((Transform::from_translation(start), controller))
            .unwrap();
        (ecs, movement, player)
    }

    fn hold(ecs: &mut Coordinator, buttons: &[Button]) {
        let snapshot = InputSnapshot {
            buttons: buttons.iter().copied().collect(),
            ..InputSnapshot::default()
        };
        ecs.send_event(&mut snapshot.to_event());
    }

    fn state(ecs: &Coordinator, player: Entity) -> (Vec3, PlayerController) {
        (
            ecs.get_component::<Transform>(player).unwrap().translation,
            *ecs.get_component::<PlayerController>(player).unwrap(),
        )
    }

    #[test]
    fn falls_to_eye_height_and_lands() {
        let (mut ecs, movement, player) = setup(PlayerController::default(), Vec3::new(0.0, 5.0, 0.0));
        for _ in 0..120 {
            ecs.update_system(movement, DT).unwrap();
        }
        let (position, controller) = state(&ecs, player);
        assert_eq!(position.y, 1.8);
        assert!(controller.grounded);
        assert_eq!(controller.vertical_velocity, 0.0);
    }

    #[test]
    fn jump_only_when_grounded() {
        let (mut ecs, movement, player) = setup(PlayerController::default(), Vec3::new(0.0, 1.8, 0.0));
        ecs.update_system(movement, DT).unwrap();
        assert!(state(&ecs, player).1.grounded);

        hold(&mut ecs, &[Button::Jump]);
        ecs.update_system(movement, DT).unwrap();
        let (position, controller) = state(&ecs, player);
        assert!(position.y > 1.8);
        assert!(!controller.grounded);
        let launched = controller.vertical_velocity;
        assert!(launched > 0.0 && launched < 5.0);

        // Releasing and pressing again mid-air does nothing.
        hold(&mut ecs, &[]);
        ecs.update_system(movement, DT).unwrap();
        hold(&mut ecs, &[Button::Jump]);
        ecs.update_system(movement, DT).unwrap();
        let (_, controller) = state(&ecs, player);
        assert!(controller.vertical_velocity < launched);
    }

    #[test]
    fn holding_jump_does_not_bounce() {
        let (mut ecs, movement, player) = setup(PlayerController::default(), Vec3::new(0.0, 1.8, 0.0));
        ecs.update_system(movement, DT).unwrap();
        hold(&mut ecs, &[Button::Jump]);
        for _ in 0..240 {
            ecs.update_system(movement, DT).unwrap();
        }
        let (position, controller) = state(&ecs, player);
        assert!(controller.grounded);
        assert_eq!(position.y, 1.8);
    }

    #[test]
    fn walking_stays_on_the_ground_plane() {
        let (mut ecs, movement, player) = setup(PlayerController::default(), Vec3::new(0.0, 1.8, 0.0));
        // Look steeply down, then walk forward.
        let snapshot = InputSnapshot {
            buttons: ButtonSet::EMPTY.with(Button::Forward),
            mouse_delta: Vec2::new(0.0, 600.0),
            scroll: 0.0,
        };
        ecs.send_event(&mut snapshot.to_event());
        ecs.update_system(movement, 0.5).unwrap();

        let (position, _) = state(&ecs, player);
        assert_eq!(position.y, 1.8);
        assert!((position.z + 2.5).abs() < 1e-4);
    }

    #[test]
    fn noclip_flies_without_gravity() {
        let controller = PlayerController {
            noclip: true,
            ..PlayerController::default()
        };
        let (mut ecs, movement, player) = setup(controller, Vec3::new(0.0, 10.0, 0.0));
        ecs.update_system(movement, 1.0).unwrap();
        assert_eq!(state(&ecs, player).0.y, 10.0);

        hold(&mut ecs, &[Button::Jump]);
        ecs.update_system(movement, 1.0).unwrap();
        assert_eq!(state(&ecs, player).0.y, 15.0);

        hold(&mut ecs, &[Button::Crouch]);
        ecs.update_system(movement, 3.0).unwrap();
        // Below the floor is allowed in noclip.
        assert_eq!(state(&ecs, player).0.y, 0.0);
    }
}
