//! # Events — Synchronous Publish/Subscribe
//!
//! Input polling shouldn't have to know which systems care about input. The
//! frame driver publishes an [`Event`] and every listener registered for
//! that [`EventId`] runs immediately, in the order the listeners were added.
//!
//! ## Parameters
//!
//! An event carries a small map of named parameters. Values are a closed
//! tagged union ([`Param`]), and reading one back is checked:
//!
//! ```ignore
//! let mut event = Event::new(window::INPUT)
//!     .with_param(window::input::BUTTONS, buttons)
//!     .with_param(window::input::MOUSE_DELTA, Vec2::new(3.0, -1.0));
//!
//! let buttons: ButtonSet = event.param(window::input::BUTTONS)?;
//! let oops: f32 = event.param(window::input::BUTTONS)?; // EventError::TypeMismatch
//! ```
//!
//! ## Ids
//!
//! [`EventId`] and [`ParamId`] are FNV-1a hashes of a name, computed by a
//! `const fn`, so the well-known ids in [`window`] are plain constants.

use std::collections::HashMap;
use std::fmt;

use glam::{Vec2, Vec3};

use super::error::EventError;
use crate::input::ButtonSet;

const fn fnv1a(name: &str) -> u32 {
    let bytes = name.as_bytes();
    let mut hash: u32 = 0x811c_9dc5;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(0x0100_0193);
        i += 1;
    }
    hash
}

/// Identifies a kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(u32);

impl EventId {
    pub const fn from_name(name: &str) -> Self {
        Self(fnv1a(name))
    }
}

/// Identifies a named parameter carried by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(u32);

impl ParamId {
    pub const fn from_name(name: &str) -> Self {
        Self(fnv1a(name))
    }
}

/// Well-known window events published by the frame driver.
pub mod window {
    use super::{EventId, ParamId};

    pub const QUIT: EventId = EventId::from_name("Events::Window::QUIT");
    pub const RESIZED: EventId = EventId::from_name("Events::Window::RESIZED");
    pub const INPUT: EventId = EventId::from_name("Events::Window::INPUT");

    pub mod resized {
        use super::ParamId;

        pub const WIDTH: ParamId = ParamId::from_name("Events::Window::Resized::WIDTH");
        pub const HEIGHT: ParamId = ParamId::from_name("Events::Window::Resized::HEIGHT");
    }

    pub mod input {
        use super::ParamId;

        /// Held buttons, as a [`ButtonSet`](crate::input::ButtonSet).
        pub const BUTTONS: ParamId = ParamId::from_name("Events::Window::Input::INPUT");
        /// Mouse movement since the last frame, as a `Vec2`.
        pub const MOUSE_DELTA: ParamId = ParamId::from_name("Events::Window::Input::MOUSE_DELTA");
        /// Scroll wheel movement since the last frame, as an `f32`.
        pub const SCROLL: ParamId = ParamId::from_name("Events::Window::Input::SCROLL");
    }
}

/// A parameter value. The set of payload kinds is closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Param {
    Buttons(ButtonSet),
    Float(f32),
    UInt(u32),
    Vec2(Vec2),
    Vec3(Vec3),
}

/// Discriminant of a [`Param`], used in type-mismatch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Buttons,
    Float,
    UInt,
    Vec2,
    Vec3,
}

impl Param {
    pub fn kind(&self) -> ParamKind {
        match self {
            Param::Buttons(_) => ParamKind::Buttons,
            Param::Float(_) => ParamKind::Float,
            Param::UInt(_) => ParamKind::UInt,
            Param::Vec2(_) => ParamKind::Vec2,
            Param::Vec3(_) => ParamKind::Vec3,
        }
    }
}

/// Rust types that can travel as a [`Param`].
pub trait ParamValue: Sized {
    const KIND: ParamKind;

    fn into_param(self) -> Param;

    fn from_param(param: &Param) -> Option<Self>;
}

macro_rules! impl_param_value {
    ($ty:ty, $variant:ident) => {
        impl ParamValue for $ty {
            const KIND: ParamKind = ParamKind::$variant;

            fn into_param(self) -> Param {
                Param::$variant(self)
            }

            fn from_param(param: &Param) -> Option<Self> {
                match param {
                    Param::$variant(value) => Some(*value),
                    _ => None,
                }
            }
        }
    };
}

impl_param_value!(ButtonSet, Buttons);
impl_param_value!(f32, Float);
impl_param_value!(u32, UInt);
impl_param_value!(Vec2, Vec2);
impl_param_value!(Vec3, Vec3);

/// A transient message: an id plus named parameters.
#[derive(Debug, Clone)]
pub struct Event {
    id: EventId,
    params: HashMap<ParamId, Param>,
}

impl Event {
    pub fn new(id: EventId) -> Self {
        Self {
            id,
            params: HashMap::new(),
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    /// Builder form of [`set_param`](Self::set_param).
    pub fn with_param<T: ParamValue>(mut self, key: ParamId, value: T) -> Self {
        self.set_param(key, value);
        self
    }

    /// Store a parameter, replacing any previous value under `key`.
    pub fn set_param<T: ParamValue>(&mut self, key: ParamId, value: T) {
        self.params.insert(key, value.into_param());
    }

    /// Read a parameter back as `T`.
    pub fn param<T: ParamValue>(&self, key: ParamId) -> Result<T, EventError> {
        let param = self.params.get(&key).ok_or(EventError::MissingParam {
            event: self.id,
            param: key,
        })?;
        T::from_param(param).ok_or(EventError::TypeMismatch {
            param: key,
            expected: T::KIND,
            found: param.kind(),
        })
    }

    pub fn has_param(&self, key: ParamId) -> bool {
        self.params.contains_key(&key)
    }
}

/// Handle returned by [`EventManager::add_listener`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A boxed listener callback.
pub type Listener = Box<dyn FnMut(&mut Event)>;

/// Routes events to the listeners registered for their id.
pub struct EventManager {
    listeners: HashMap<EventId, Vec<(ListenerId, Listener)>>,
    next_id: u64,
}

impl EventManager {
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 0,
        }
    }

    /// Register a callback for events with the given id. Several listeners
    /// per id are allowed; they run in the order they were added.
    pub fn add_listener(
        &mut self,
        event: EventId,
        listener: impl FnMut(&mut Event) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(event)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Unsubscribe a listener. Returns `false` if it was already gone.
    pub fn remove_listener(&mut self, listener: ListenerId) -> bool {
        for list in self.listeners.values_mut() {
            if let Some(pos) = list.iter().position(|(id, _)| *id == listener) {
                drop(list.remove(pos));
                return true;
            }
        }
        false
    }

    /// Invoke every listener registered for `event`'s id, in registration
    /// order. Returns how many ran.
    pub fn send(&mut self, event: &mut Event) -> usize {
        let Some(list) = self.listeners.get_mut(&event.id()) else {
            return 0;
        };
        for (_, listener) in list.iter_mut() {
            listener(event);
        }
        list.len()
    }

    /// Send a parameterless event.
    pub fn send_id(&mut self, event: EventId) -> usize {
        self.send(&mut Event::new(event))
    }

    pub fn listener_count(&self, event: EventId) -> usize {
        self.listeners.get(&event).map_or(0, Vec::len)
    }

    /// Listeners across every event id.
    pub fn total_listeners(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager")
            .field("events", &self.listeners.len())
            .field("listeners", &self.total_listeners())
            .finish()
    }
}
