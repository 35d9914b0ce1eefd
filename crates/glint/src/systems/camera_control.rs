//! Free-fly camera: WASD moves along the view direction, Q/E rise and sink,
//! mouse motion turns.

use serde::{Deserialize, Serialize};

use super::{InputCell, mouse_look};
use crate::config::CameraConfig;
use crate::ecs::{Coordinator, EcsResult, Entity, EventManager, System};
use crate::input::{Button, ButtonSet};
use crate::math::{Transform, Vec3};

/// Marks an entity as driven by [`CameraControl`]. Pair with [`Transform`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlyCamera;

/// Moves every `Transform + FlyCamera` entity from the latest input.
#[derive(Debug)]
pub struct CameraControl {
    pub move_speed: f32,
    pub look_sensitivity: f32,
    input: InputCell,
}

impl CameraControl {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            move_speed: config.move_speed,
            look_sensitivity: config.look_sensitivity,
            input: InputCell::default(),
        }
    }
}

impl Default for CameraControl {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

impl System for CameraControl {
    fn init(&mut self, events: &mut EventManager) {
        self.input = InputCell::subscribe(events);
    }

    fn update(&mut self, ecs: &mut Coordinator, entities: &[Entity], dt: f32) -> EcsResult<()> {
        let input = self.input.take();
        for &entity in entities {
            if !ecs.is_alive(entity) {
                continue;
            }
            let transform = ecs.get_component_mut::<Transform>(entity)?;
            mouse_look(transform, input.mouse_delta, self.look_sensitivity);

            let direction = fly_direction(input.buttons, transform);
            if direction != Vec3::ZERO {
                transform.translate(direction.normalize() * self.move_speed * dt);
            }
        }
        Ok(())
    }
}

/// Unnormalized travel direction. Opposing buttons cancel out.
fn fly_direction(buttons: ButtonSet, transform: &Transform) -> Vec3 {
    let axis = |positive: Button, negative: Button| {
        buttons.contains(positive) as i32 as f32 - buttons.contains(negative) as i32 as f32
    };
    transform.forward() * axis(Button::Forward, Button::Backward)
        + transform.right() * axis(Button::Right, Button::Left)
        + Vec3::Y * axis(Button::Up, Button::Down)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::input::InputSnapshot;
    use crate::math::Vec2;

    fn setup() -> (Coordinator, crate::ecs::SystemHandle<CameraControl>, Entity) {
        let mut ecs = Coordinator::default();
        ecs.register_component::<Transform>().unwrap();
        ecs.register_component::<Camera>().unwrap();
        ecs.register_component::<FlyCamera>().unwrap();
        let control = ecs
            .register_system_with(CameraControl::new(&CameraConfig::default()))
            .unwrap();
        let required = ecs.signature_of::<(Transform, FlyCamera)>().unwrap();
        ecs.set_system_signature(control, required).unwrap();
        let camera = ecs
            .spawn((Transform::IDENTITY, Camera::default(), FlyCamera))
            .unwrap();
        (ecs, control, camera)
    }

    fn press(ecs: &mut Coordinator, buttons: &[Button], mouse_delta: Vec2) {
        let snapshot = InputSnapshot {
            buttons: buttons.iter().copied().collect(),
            mouse_delta,
            scroll: 0.0,
        };
        ecs.send_event(&mut snapshot.to_event());
    }

    fn position(ecs: &Coordinator, entity: Entity) -> Vec3 {
        ecs.get_component::<Transform>(entity).unwrap().translation
    }

    #[test]
    fn forward_moves_at_configured_speed() {
        let (mut ecs, control, camera) = setup();
        press(&mut ecs, &[Button::Forward], Vec2::ZERO);
        ecs.update_system(control, 0.5).unwrap();
        assert!(position(&ecs, camera).abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), 1e-5));
    }

    #[test]
    fn buttons_stay_held_between_events() {
        let (mut ecs, control, camera) = setup();
        press(&mut ecs, &[Button::Up], Vec2::ZERO);
        ecs.update_system(control, 0.1).unwrap();
        ecs.update_system(control, 0.1).unwrap();
        assert!(position(&ecs, camera).abs_diff_eq(Vec3::new(0.0, 4.0, 0.0), 1e-5));

        press(&mut ecs, &[], Vec2::ZERO);
        ecs.update_system(control, 0.1).unwrap();
        assert!(position(&ecs, camera).abs_diff_eq(Vec3::new(0.0, 4.0, 0.0), 1e-5));
    }

    #[test]
    fn opposing_buttons_cancel() {
        let (mut ecs, control, camera) = setup();
        press(&mut ecs, &[Button::Left, Button::Right], Vec2::ZERO);
        ecs.update_system(control, 1.0).unwrap();
        assert_eq!(position(&ecs, camera), Vec3::ZERO);
    }

    #[test]
    fn diagonal_speed_is_not_boosted() {
        let (mut ecs, control, camera) = setup();
        press(&mut ecs, &[Button::Forward, Button::Right], Vec2::ZERO);
        ecs.update_system(control, 0.25).unwrap();
        assert!((position(&ecs, camera).length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn mouse_turns_then_forward_follows_view() {
        let (mut ecs, control, camera) = setup();
        // 900 px at 0.1 deg/px: a quarter turn to the right.
        press(&mut ecs, &[Button::Forward], Vec2::new(900.0, 0.0));
        ecs.update_system(control, 0.5).unwrap();
        assert!(position(&ecs, camera).abs_diff_eq(Vec3::new(10.0, 0.0, 0.0), 1e-3));

        // The delta was consumed; the heading doesn't keep turning.
        ecs.update_system(control, 0.5).unwrap();
        assert!(position(&ecs, camera).abs_diff_eq(Vec3::new(20.0, 0.0, 0.0), 1e-3));
    }

    #[test]
    fn entities_without_marker_are_ignored() {
        let (mut ecs, control, _) = setup();
        let bystander = ecs.spawn((Transform::IDENTITY, Camera::default())).unwrap();
        press(&mut ecs, &[Button::Forward], Vec2::ZERO);
        ecs.update_system(control, 1.0).unwrap();
        assert_eq!(position(&ecs, bystander), Vec3::ZERO);
    }
}
