//! # Errors
//!
//! Every fallible ECS operation returns [`EcsResult`]. The variants fall into
//! three groups, and callers usually only care which group they hit:
//!
//! - **Programmer errors**: registering a type twice, touching a type that
//!   was never registered, adding a component the entity already has,
//!   destroying a dead entity. These mean the calling code is wrong; there is
//!   nothing sensible to retry. See [`EcsError::is_programmer_error`].
//! - **Capacity exceeded**: the entity or component-type limit was reached.
//!   Runaway spawning can legitimately get here, so it is reported rather
//!   than aborting. See [`EcsError::is_capacity_exceeded`].
//! - **Event payload errors**: a listener asked for a parameter that is
//!   missing or carries a different payload kind ([`EventError`]).

use thiserror::Error;

use super::entity::Entity;
use super::event::{EventId, ParamId, ParamKind};

/// Result alias used throughout the ECS.
pub type EcsResult<T> = Result<T, EcsError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    #[error("too many entities alive (maximum is {max})")]
    TooManyEntities { max: u32 },

    #[error("too many component types registered (maximum is {max})")]
    TooManyComponentTypes { max: usize },

    #[error("entity {entity} is outside the valid range (maximum is {max})")]
    EntityOutOfRange { entity: Entity, max: u32 },

    #[error("entity {0} is not alive")]
    EntityNotAlive(Entity),

    #[error("component `{0}` registered more than once")]
    ComponentAlreadyRegistered(&'static str),

    #[error("component `{0}` used before it was registered")]
    ComponentNotRegistered(&'static str),

    #[error("entity {entity} already has a `{component}`")]
    ComponentAlreadyPresent {
        entity: Entity,
        component: &'static str,
    },

    #[error("entity {entity} has no `{component}`")]
    ComponentMissing {
        entity: Entity,
        component: &'static str,
    },

    #[error("system `{0}` registered more than once")]
    SystemAlreadyRegistered(&'static str),

    #[error("system `{0}` is not registered with this coordinator")]
    SystemNotRegistered(&'static str),

    #[error("system `{0}` is already running")]
    SystemBusy(&'static str),

    #[error(transparent)]
    Event(#[from] EventError),
}

impl EcsError {
    /// The calling code broke an ECS precondition.
    pub fn is_programmer_error(&self) -> bool {
        !self.is_capacity_exceeded() && !matches!(self, EcsError::Event(_))
    }

    /// A configured limit was reached.
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(
            self,
            EcsError::TooManyEntities { .. } | EcsError::TooManyComponentTypes { .. }
        )
    }
}

/// Failures when reading parameters off an [`Event`](super::event::Event).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("event {event:?} has no parameter {param:?}")]
    MissingParam { event: EventId, param: ParamId },

    #[error("parameter {param:?} holds {found:?}, requested {expected:?}")]
    TypeMismatch {
        param: ParamId,
        expected: ParamKind,
        found: ParamKind,
    },
}
