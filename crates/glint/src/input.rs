//! # Input — Keyboard and Mouse State
//!
//! The platform layer (a winit event loop, or a scripted driver in tests)
//! feeds raw key and cursor events into an [`InputState`]. Once per frame the
//! state is reduced to an [`InputSnapshot`]: which logical [`Button`]s are
//! held, how far the mouse moved, and how far the wheel scrolled. The frame
//! driver publishes that snapshot as a `window::INPUT` event, so systems
//! never touch the platform directly.
//!
//! ```text
//!  KeyCode ──► KeyBindings ──► Input<Button> ─┐
//!                                             ├──► InputSnapshot ──► INPUT event
//!  cursor / wheel ──────────► MouseState ─────┘
//! ```

use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use serde::Serialize;

use crate::ecs::event::{Event, window};
use crate::ecs::EventError;
use crate::math::Vec2;

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

/// Tracks the state of a set of inputs (keys, mouse buttons, or logical
/// buttons).
///
/// - `pressed`: currently held down
/// - `just_pressed`: pressed this frame (not held last frame)
/// - `just_released`: released this frame
pub struct Input<T: Eq + Hash + Copy> {
    pressed: HashSet<T>,
    just_pressed: HashSet<T>,
    just_released: HashSet<T>,
}

impl<T: Eq + Hash + Copy> Input<T> {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    /// Returns `true` if the input is currently held down.
    pub fn pressed(&self, input: T) -> bool {
        self.pressed.contains(&input)
    }

    /// Returns `true` if the input was pressed this frame.
    pub fn just_pressed(&self, input: T) -> bool {
        self.just_pressed.contains(&input)
    }

    /// Returns `true` if the input was released this frame.
    pub fn just_released(&self, input: T) -> bool {
        self.just_released.contains(&input)
    }

    /// Everything currently held.
    pub fn iter_pressed(&self) -> impl Iterator<Item = T> + '_ {
        self.pressed.iter().copied()
    }

    pub fn press(&mut self, input: T) {
        if self.pressed.insert(input) {
            self.just_pressed.insert(input);
        }
    }

    pub fn release(&mut self, input: T) {
        if self.pressed.remove(&input) {
            self.just_released.insert(input);
        }
    }

    /// Clear per-frame state. Called at the end of each frame.
    pub fn clear_just(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl<T: Eq + Hash + Copy> Default for Input<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Logical buttons ──────────────────────────────────────────────────

/// A logical control, independent of which physical key drives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Button {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
    Jump,
    Crouch,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::Forward,
        Button::Backward,
        Button::Left,
        Button::Right,
        Button::Up,
        Button::Down,
        Button::Jump,
        Button::Crouch,
    ];

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// An 8-bit set of [`Button`]s. This is what travels inside input events.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct ButtonSet(u8);

impl ButtonSet {
    pub const EMPTY: Self = Self(0);

    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Return a copy with `button` set.
    pub fn with(mut self, button: Button) -> Self {
        self.insert(button);
        self
    }

    pub fn insert(&mut self, button: Button) {
        self.0 |= button.bit();
    }

    pub fn remove(&mut self, button: Button) {
        self.0 &= !button.bit();
    }

    pub fn contains(self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Button> {
        Button::ALL.into_iter().filter(move |b| self.contains(*b))
    }
}

impl FromIterator<Button> for ButtonSet {
    fn from_iter<I: IntoIterator<Item = Button>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for button in iter {
            set.insert(button);
        }
        set
    }
}

impl fmt::Debug for ButtonSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

// ── Key bindings ─────────────────────────────────────────────────────

/// Maps physical keys to logical buttons. Several keys may drive the same
/// button.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<KeyCode, Button>,
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn bind(&mut self, key: KeyCode, button: Button) -> &mut Self {
        self.map.insert(key, button);
        self
    }

    pub fn unbind(&mut self, key: KeyCode) -> Option<Button> {
        self.map.remove(&key)
    }

    pub fn button(&self, key: KeyCode) -> Option<Button> {
        self.map.get(&key).copied()
    }
}

impl Default for KeyBindings {
    /// WASD to move, Q/E to rise and sink, Space to jump, left Shift to
    /// crouch.
    fn default() -> Self {
        let mut bindings = Self::empty();
        bindings
            .bind(KeyCode::KeyW, Button::Forward)
            .bind(KeyCode::KeyS, Button::Backward)
            .bind(KeyCode::KeyA, Button::Left)
            .bind(KeyCode::KeyD, Button::Right)
            .bind(KeyCode::KeyQ, Button::Up)
            .bind(KeyCode::KeyE, Button::Down)
            .bind(KeyCode::Space, Button::Jump)
            .bind(KeyCode::ShiftLeft, Button::Crouch);
        bindings
    }
}

// ── Mouse ────────────────────────────────────────────────────────────

/// Cursor position, accumulated motion and scroll for the current frame.
///
/// The very first cursor sample only establishes a reference point; it never
/// produces a delta.
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseState {
    position: Vec2,
    last_position: Option<Vec2>,
    delta: Vec2,
    scroll: f32,
}

impl MouseState {
    /// Record a cursor sample in window coordinates. Motion since the
    /// previous sample is added to this frame's delta.
    pub fn cursor_moved(&mut self, position: Vec2) {
        if let Some(last) = self.last_position {
            self.delta += position - last;
        }
        self.position = position;
        self.last_position = Some(position);
    }

    /// Add raw motion directly, for platforms that report relative motion.
    pub fn add_motion(&mut self, delta: Vec2) {
        self.delta += delta;
    }

    pub fn scrolled(&mut self, amount: f32) {
        self.scroll += amount;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// Forget the reference point so the next sample is treated as the first.
    pub fn reset_reference(&mut self) {
        self.last_position = None;
    }

    /// Zero the per-frame delta and scroll.
    pub fn end_frame(&mut self) {
        self.delta = Vec2::ZERO;
        self.scroll = 0.0;
    }
}

// ── Combined state ───────────────────────────────────────────────────

/// Everything a system needs to know about input for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    pub buttons: ButtonSet,
    pub mouse_delta: Vec2,
    pub scroll: f32,
}

impl InputSnapshot {
    /// Package the snapshot as a `window::INPUT` event.
    pub fn to_event(&self) -> Event {
        Event::new(window::INPUT)
            .with_param(window::input::BUTTONS, self.buttons)
            .with_param(window::input::MOUSE_DELTA, self.mouse_delta)
            .with_param(window::input::SCROLL, self.scroll)
    }

    /// Read a snapshot back out of an input event. Only the button set is
    /// required; missing mouse parameters read as zero.
    pub fn from_event(event: &Event) -> Result<Self, EventError> {
        let mouse_delta = if event.has_param(window::input::MOUSE_DELTA) {
            event.param(window::input::MOUSE_DELTA)?
        } else {
            Vec2::ZERO
        };
        let scroll = if event.has_param(window::input::SCROLL) {
            event.param(window::input::SCROLL)?
        } else {
            0.0
        };
        Ok(Self {
            buttons: event.param(window::input::BUTTONS)?,
            mouse_delta,
            scroll,
        })
    }
}

/// Keyboard, mouse-button and cursor state, fed by the platform layer.
#[derive(Default)]
pub struct InputState {
    pub bindings: KeyBindings,
    keys: Input<KeyCode>,
    mouse_buttons: Input<MouseButton>,
    buttons: Input<Button>,
    mouse: MouseState,
}

impl InputState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    pub fn key_pressed(&mut self, key: KeyCode) {
        self.keys.press(key);
        if let Some(button) = self.bindings.button(key) {
            self.buttons.press(button);
        }
    }

    /// Releasing a key releases its button unless another held key is
    /// bound to the same button.
    pub fn key_released(&mut self, key: KeyCode) {
        self.keys.release(key);
        let Some(button) = self.bindings.button(key) else {
            return;
        };
        let still_held = self
            .keys
            .iter_pressed()
            .any(|other| self.bindings.button(other) == Some(button));
        if !still_held {
            self.buttons.release(button);
        }
    }

    pub fn mouse_pressed(&mut self, button: MouseButton) {
        self.mouse_buttons.press(button);
    }

    pub fn mouse_released(&mut self, button: MouseButton) {
        self.mouse_buttons.release(button);
    }

    pub fn cursor_moved(&mut self, position: Vec2) {
        self.mouse.cursor_moved(position);
    }

    pub fn scrolled(&mut self, amount: f32) {
        self.mouse.scrolled(amount);
    }

    pub fn keys(&self) -> &Input<KeyCode> {
        &self.keys
    }

    pub fn mouse_buttons(&self) -> &Input<MouseButton> {
        &self.mouse_buttons
    }

    pub fn buttons(&self) -> &Input<Button> {
        &self.buttons
    }

    pub fn mouse(&self) -> &MouseState {
        &self.mouse
    }

    pub fn mouse_mut(&mut self) -> &mut MouseState {
        &mut self.mouse
    }

    /// Reduce the current state to what systems consume.
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            buttons: self.buttons.iter_pressed().collect(),
            mouse_delta: self.mouse.delta(),
            scroll: self.mouse.scroll(),
        }
    }

    /// Clear per-frame state. Held keys stay held.
    pub fn end_frame(&mut self) {
        self.keys.clear_just();
        self.mouse_buttons.clear_just();
        self.buttons.clear_just();
        self.mouse.end_frame();
    }
}
