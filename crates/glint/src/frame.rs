//! # Frame — Driving the Sandbox
//!
//! [`Sandbox`] owns everything that lives for the whole session: the
//! configuration, the [`Coordinator`], frame timing and input state. The
//! platform layer calls it from its event loop:
//!
//! ```text
//!  window events ─► input_mut().key_pressed(..) / cursor_moved(..)
//!  resize         ─► resize(w, h)                 publishes window::RESIZED
//!  close request  ─► request_quit()               publishes window::QUIT
//!  redraw         ─► frame(dt, &mut renderer)
//!                      1. advance Time
//!                      2. publish InputSnapshot as window::INPUT
//!                      3. update every system, in registration order
//!                      4. hand the active camera's FrameView to the renderer
//!                      5. clear per-frame input
//! ```

use std::cell::Cell;
use std::rc::Rc;

use crate::camera::{Camera, active_camera};
use crate::config::{SandboxConfig, ViewportConfig};
use crate::ecs::event::window;
use crate::ecs::{Coordinator, EcsResult, Entity, Event};
use crate::input::InputState;
use crate::math::{Transform, Vec3};
use crate::render::{FrameView, Renderer};
use crate::systems::{CameraControl, FlyCamera, PlayerController, PlayerMovement};
use crate::time::Time;

/// Where the default scene's camera starts.
const DEFAULT_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 2.0, 5.0);

pub struct Sandbox {
    config: SandboxConfig,
    ecs: Coordinator,
    time: Time,
    input: InputState,
    viewport: ViewportConfig,
    quit: Rc<Cell<bool>>,
}

impl Sandbox {
    pub fn new(config: SandboxConfig) -> Self {
        let mut ecs = Coordinator::new(&config.ecs);
        let quit = Rc::new(Cell::new(false));
        let flag = Rc::clone(&quit);
        ecs.add_event_listener(window::QUIT, move |_| flag.set(true));

        Self {
            viewport: config.viewport,
            config,
            ecs,
            time: Time::new(),
            input: InputState::default(),
            quit,
        }
    }

    /// Register the built-in components and systems, and spawn a free-fly
    /// camera looking at the origin. Returns the camera entity.
    pub fn setup_default_scene(&mut self) -> EcsResult<Entity> {
        self.ecs.register_component::<Transform>()?;
        self.ecs.register_component::<Camera>()?;
        self.ecs.register_component::<FlyCamera>()?;
        self.ecs.register_component::<PlayerController>()?;

        let control = self
            .ecs
            .register_system_with(CameraControl::new(&self.config.camera))?;
        let required = self.ecs.signature_of::<(Transform, FlyCamera)>()?;
        self.ecs.set_system_signature(control, required)?;

        let movement = self
            .ecs
            .register_system_with(PlayerMovement::new(&self.config.camera))?;
        let required = self.ecs.signature_of::<(Transform, PlayerController)>()?;
        self.ecs.set_system_signature(movement, required)?;

        let transform =
            Transform::from_translation(DEFAULT_CAMERA_POSITION).looking_at(Vec3::ZERO, Vec3::Y);
        let camera = self
            .ecs
            .spawn((transform, Camera::from_config(&self.config.camera), FlyCamera))?;
        log::info!("default scene ready, camera {camera}");
        Ok(camera)
    }

    /// Spawn a walking first-person camera at `position` and make it the
    /// view. Every other camera is deactivated and loses its [`FlyCamera`]
    /// marker, so input drives the player alone. Requires
    /// [`setup_default_scene`](Self::setup_default_scene) to have run.
    pub fn spawn_player(&mut self, position: Vec3) -> EcsResult<Entity> {
        let controller = PlayerController::from_config(&self.config.player);
        let camera = Camera::from_config(&self.config.camera);
        let player = self
            .ecs
            .spawn((Transform::from_translation(position), camera, controller))?;

        let others: Vec<Entity> = self
            .ecs
            .component_array::<Camera>()?
            .iter()
            .map(|(entity, _)| entity)
            .filter(|entity| *entity != player)
            .collect();
        for entity in others {
            self.ecs.get_component_mut::<Camera>(entity)?.active = false;
            if self.ecs.has_component::<FlyCamera>(entity) {
                self.ecs.remove_component::<FlyCamera>(entity)?;
            }
        }
        log::info!("player {player} spawned at {position}");
        Ok(player)
    }

    /// Run one frame. Returns `true` if a camera was found and the renderer
    /// was called.
    pub fn frame(&mut self, dt: f32, renderer: &mut dyn Renderer) -> EcsResult<bool> {
        self.time.advance(dt);

        let mut input = self.input.snapshot().to_event();
        self.ecs.send_event(&mut input);

        self.ecs.update_systems(self.time.delta)?;

        let rendered = match active_camera(&self.ecs) {
            Some(camera) => {
                let view = FrameView::from_camera(&self.ecs, camera, self.viewport.aspect())?;
                renderer.render(&view);
                true
            }
            None => {
                log::trace!("frame {}: no active camera", self.time.frame_count);
                false
            }
        };

        self.input.end_frame();

        #[cfg(feature = "diagnostics")]
        {
            let (created, destroyed) = self.ecs.take_frame_counters();
            if created + destroyed > 0 {
                log::trace!(
                    "frame {}: {created} created, {destroyed} destroyed",
                    self.time.frame_count
                );
            }
        }

        Ok(rendered)
    }

    /// Record a new viewport size and publish `window::RESIZED`.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = ViewportConfig { width, height };
        let mut event = Event::new(window::RESIZED)
            .with_param(window::resized::WIDTH, width)
            .with_param(window::resized::HEIGHT, height);
        self.ecs.send_event(&mut event);
        log::debug!("viewport resized to {width}x{height}");
    }

    /// Publish `window::QUIT`.
    pub fn request_quit(&mut self) {
        self.ecs.send_event_id(window::QUIT);
    }

    pub fn should_quit(&self) -> bool {
        self.quit.get()
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn ecs(&self) -> &Coordinator {
        &self.ecs
    }

    pub fn ecs_mut(&mut self) -> &mut Coordinator {
        &mut self.ecs
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn viewport(&self) -> ViewportConfig {
        self.viewport
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new(SandboxConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;
    use crate::math::Mat4;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<FrameView>,
    }

    impl Renderer for Recorder {
        fn render(&mut self, frame: &FrameView) {
            self.frames.push(*frame);
        }
    }

    #[test]
    fn renderer_receives_active_camera_matrices() {
        let mut sandbox = Sandbox::default();
        let camera = sandbox.setup_default_scene().unwrap();
        let mut recorder = Recorder::default();

        assert!(sandbox.frame(1.0 / 60.0, &mut recorder).unwrap());

        let frame = recorder.frames[0];
        assert_eq!(frame.camera, camera);
        assert_eq!(frame.eye, DEFAULT_CAMERA_POSITION);
        let lens = Camera::default();
        assert_eq!(frame.projection, lens.projection(1920.0 / 1080.0));
        let transform = sandbox.ecs().get_component::<Transform>(camera).unwrap();
        assert_eq!(frame.view, Camera::view(transform));
    }

    #[test]
    fn no_camera_no_render() {
        let mut sandbox = Sandbox::default();
        let mut recorder = Recorder::default();
        assert!(!sandbox.frame(0.016, &mut recorder).unwrap());
        assert!(recorder.frames.is_empty());
        assert_eq!(sandbox.time().frame_count, 1);
    }

    #[test]
    fn held_key_moves_camera_through_input_event() {
        let mut sandbox = Sandbox::default();
        let camera = sandbox.setup_default_scene().unwrap();
        let mut recorder = Recorder::default();

        sandbox.input_mut().key_pressed(KeyCode::KeyQ);
        sandbox.frame(0.5, &mut recorder).unwrap();

        let eye = recorder.frames[0].eye;
        assert!(eye.abs_diff_eq(DEFAULT_CAMERA_POSITION + Vec3::new(0.0, 10.0, 0.0), 1e-4));
        assert_eq!(
            sandbox.ecs().get_component::<Transform>(camera).unwrap().translation,
            eye
        );
    }

    #[test]
    fn resize_changes_projection_and_notifies() {
        let mut sandbox = Sandbox::default();
        sandbox.setup_default_scene().unwrap();
        let seen = Rc::new(Cell::new((0u32, 0u32)));
        let sink = Rc::clone(&seen);
        sandbox.ecs_mut().add_event_listener(window::RESIZED, move |event| {
            let width = event.param::<u32>(window::resized::WIDTH).unwrap_or(0);
            let height = event.param::<u32>(window::resized::HEIGHT).unwrap_or(0);
            sink.set((width, height));
        });

        sandbox.resize(800, 800);
        assert_eq!(seen.get(), (800, 800));

        let mut recorder = Recorder::default();
        sandbox.frame(0.0, &mut recorder).unwrap();
        assert_eq!(
            recorder.frames[0].projection,
            Camera::default().projection(1.0)
        );
        assert_ne!(recorder.frames[0].projection, Mat4::IDENTITY);
    }

    #[test]
    fn quit_flag_follows_event() {
        let mut sandbox = Sandbox::default();
        assert!(!sandbox.should_quit());
        sandbox.request_quit();
        assert!(sandbox.should_quit());
    }

    #[test]
    fn player_spawns_after_setup() {
        let mut sandbox = Sandbox::default();
        assert!(sandbox.spawn_player(Vec3::ZERO).is_err());
        assert_eq!(sandbox.ecs().living_count(), 0);

        sandbox.setup_default_scene().unwrap();
        let player = sandbox.spawn_player(Vec3::new(0.0, 3.0, 0.0)).unwrap();
        let mut recorder = Recorder::default();
        for _ in 0..120 {
            sandbox.frame(1.0 / 60.0, &mut recorder).unwrap();
        }
        let landed = sandbox.ecs().get_component::<Transform>(player).unwrap();
        assert_eq!(landed.translation.y, 1.8);
    }

    #[test]
    fn player_takes_over_view_and_input() {
        let mut sandbox = Sandbox::default();
        let fly = sandbox.setup_default_scene().unwrap();
        let player = sandbox.spawn_player(Vec3::new(0.0, 3.0, 0.0)).unwrap();
        assert!(!sandbox.ecs().get_component::<Camera>(fly).unwrap().active);
        assert!(!sandbox.ecs().has_component::<FlyCamera>(fly));

        let mut recorder = Recorder::default();
        sandbox.input_mut().key_pressed(KeyCode::KeyW);
        sandbox.frame(0.5, &mut recorder).unwrap();

        assert_eq!(recorder.frames[0].camera, player);
        let parked = sandbox.ecs().get_component::<Transform>(fly).unwrap();
        assert_eq!(parked.translation, DEFAULT_CAMERA_POSITION);
        let walked = sandbox.ecs().get_component::<Transform>(player).unwrap();
        assert_ne!(walked.translation.z, 0.0);
    }
}
