//! Fly camera — a headless scripted session.
//!
//! Builds the default scene, adds a ring of spinning markers driven by a
//! user-defined system, then replays a short script of key presses and mouse
//! motion. A logging renderer prints where the camera is every half second,
//! and the ECS stats are dumped as JSON at the end.
//!
//! Run with: `cargo run -p glint --example fly_camera [config.json]`
//! Set `RUST_LOG=glint=trace` to see per-frame entity churn.

use glint::prelude::*;

const DT: f32 = 1.0 / 60.0;

// ── Spinner ──────────────────────────────────────────────────────────────

struct Spin {
    radians_per_second: f32,
}

#[derive(Default)]
struct Spinners;

impl System for Spinners {
    fn update(&mut self, ecs: &mut Coordinator, entities: &[Entity], dt: f32) -> EcsResult<()> {
        for &entity in entities {
            let speed = ecs.get_component::<Spin>(entity)?.radians_per_second;
            ecs.get_component_mut::<Transform>(entity)?
                .rotate_axis(Vec3::Y, speed * dt);
        }
        Ok(())
    }
}

// ── Renderer ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct LogRenderer {
    frames: u64,
}

impl Renderer for LogRenderer {
    fn render(&mut self, frame: &FrameView) {
        if self.frames % 30 == 0 {
            let forward = -frame.view.inverse().z_axis.truncate();
            log::info!(
                "frame {:>3}: eye ({:6.2}, {:6.2}, {:6.2}) looking ({:5.2}, {:5.2}, {:5.2})",
                self.frames,
                frame.eye.x,
                frame.eye.y,
                frame.eye.z,
                forward.x,
                forward.y,
                forward.z
            );
        }
        self.frames += 1;
    }
}

// ── Script ───────────────────────────────────────────────────────────────

enum Step {
    Press(KeyCode),
    Release(KeyCode),
    Look(f32, f32),
    Wait(u32),
}

const SCRIPT: &[Step] = &[
    Step::Press(KeyCode::KeyW),
    Step::Wait(60),
    Step::Look(300.0, 0.0),
    Step::Wait(30),
    Step::Press(KeyCode::KeyQ),
    Step::Wait(45),
    Step::Release(KeyCode::KeyQ),
    Step::Release(KeyCode::KeyW),
    Step::Look(-150.0, 120.0),
    Step::Press(KeyCode::KeyA),
    Step::Wait(60),
    Step::Release(KeyCode::KeyA),
    Step::Wait(15),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => SandboxConfig::load(path)?,
        None => SandboxConfig::default(),
    };
    init_logger(&config.log);

    let mut sandbox = Sandbox::new(config);
    sandbox.setup_default_scene()?;

    let ecs = sandbox.ecs_mut();
    ecs.register_component::<Spin>()?;
    let spinners = ecs.register_system::<Spinners>()?;
    let required = ecs.signature_of::<(Transform, Spin)>()?;
    ecs.set_system_signature(spinners, required)?;
    for i in 0..8 {
        let angle = i as f32 * std::f32::consts::TAU / 8.0;
        ecs.spawn((
            Transform::from_xyz(angle.cos() * 4.0, 0.0, angle.sin() * 4.0),
            Spin {
                radians_per_second: 0.5 + i as f32 * 0.25,
            },
        ))?;
    }

    let mut renderer = LogRenderer::default();
    for step in SCRIPT {
        match *step {
            Step::Press(key) => sandbox.input_mut().key_pressed(key),
            Step::Release(key) => sandbox.input_mut().key_released(key),
            Step::Look(dx, dy) => sandbox.input_mut().mouse_mut().add_motion(Vec2::new(dx, dy)),
            Step::Wait(frames) => {
                for _ in 0..frames {
                    sandbox.frame(DT, &mut renderer)?;
                }
            }
        }
    }

    sandbox.request_quit();
    if sandbox.should_quit() {
        let stats = sandbox.ecs().stats();
        log::info!(
            "done after {} frames ({:.2}s)",
            sandbox.time().frame_count,
            sandbox.time().elapsed
        );
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }
    Ok(())
}
