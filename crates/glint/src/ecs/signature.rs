//! Component-type ids and the fixed-width [`Signature`] bit-set built from them.

use std::fmt;

use serde::Serialize;

/// Upper bound on registered component types; one bit each in a [`Signature`].
pub const MAX_COMPONENTS: usize = 64;

/// Small integer assigned to a component type when it is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ComponentType(pub(crate) u8);

impl ComponentType {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which component types an entity owns, or a system requires.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Signature(u64);

impl Signature {
    pub const EMPTY: Self = Self(0);

    /// Return a copy with the bit for `component` set.
    pub fn with(mut self, component: ComponentType) -> Self {
        self.set(component, true);
        self
    }

    pub fn set(&mut self, component: ComponentType, value: bool) {
        let bit = 1u64 << component.0;
        if value {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    pub fn contains(self, component: ComponentType) -> bool {
        self.0 & (1u64 << component.0) != 0
    }

    /// `true` when every bit set in `required` is also set in `self`.
    pub fn satisfies(self, required: Signature) -> bool {
        self.0 & required.0 == required.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn bits(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:#b})", self.0)
    }
}
