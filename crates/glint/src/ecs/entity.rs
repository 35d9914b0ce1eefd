//! # Entity — Identifiers With a Signature Attached
//!
//! An [`Entity`] is just a number. It doesn't own data; component arrays map
//! entities to their components, and the [`EntityManager`] remembers which
//! component types each living entity currently has (its [`Signature`]).
//!
//! ## Recycling
//!
//! Destroyed ids go onto a free list and are handed out again. The list is
//! used as a stack, so the **most recently destroyed id is reused first**:
//!
//! ```text
//! create → 0, create → 1, create → 2
//! destroy 1             free_list: [1]
//! create → 1            free_list: []
//! create → 3            (fresh)
//! ```
//!
//! There are no generations: ids are plain slots, and a stale copy of a
//! recycled id refers to whatever now lives in that slot. Destroying an id
//! twice is caught and reported instead of pushing it onto the free list a
//! second time.

use std::fmt;

use super::error::{EcsError, EcsResult};
use super::signature::Signature;

/// A lightweight handle to an entity owned by a
/// [`Coordinator`](super::coordinator::Coordinator).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(pub(crate) u32);

impl Entity {
    /// Returns the raw slot index.
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocates entity ids and stores one [`Signature`] per slot.
///
/// ## Memory Layout
///
/// ```text
/// signatures: [0b011, 0b000, 0b100]   ← one per slot ever allocated
/// alive:      [true,  false, true ]
/// free_list:  [1]                      ← slots available for reuse
/// ```
pub struct EntityManager {
    signatures: Vec<Signature>,
    alive: Vec<bool>,
    free_list: Vec<u32>,
    living: u32,
    max_entities: u32,
}

impl EntityManager {
    pub fn new(max_entities: u32) -> Self {
        Self {
            signatures: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            living: 0,
            max_entities,
        }
    }

    /// Allocate an id. Reuses the most recently freed slot if there is one.
    pub fn create_entity(&mut self) -> EcsResult<Entity> {
        if self.living >= self.max_entities {
            return Err(EcsError::TooManyEntities {
                max: self.max_entities,
            });
        }

        let index = match self.free_list.pop() {
            Some(index) => index,
            None => {
                // living < max and the free list is empty, so every slot
                // handed out so far is alive and a fresh one fits.
                let index = self.signatures.len() as u32;
                self.signatures.push(Signature::EMPTY);
                self.alive.push(false);
                index
            }
        };

        self.alive[index as usize] = true;
        self.living += 1;
        Ok(Entity(index))
    }

    /// Reset the entity's signature and return its id to the free list.
    pub fn destroy_entity(&mut self, entity: Entity) -> EcsResult<()> {
        let slot = self.slot(entity)?;
        self.signatures[slot] = Signature::EMPTY;
        self.alive[slot] = false;
        self.free_list.push(entity.0);
        self.living -= 1;
        Ok(())
    }

    pub fn set_signature(&mut self, entity: Entity, signature: Signature) -> EcsResult<()> {
        let slot = self.slot(entity)?;
        self.signatures[slot] = signature;
        Ok(())
    }

    pub fn signature(&self, entity: Entity) -> EcsResult<Signature> {
        let slot = self.slot(entity)?;
        Ok(self.signatures[slot])
    }

    /// Check whether `entity` is currently alive.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.get(entity.0 as usize).copied().unwrap_or(false)
    }

    /// Check that `entity` is in range and alive.
    pub fn validate(&self, entity: Entity) -> EcsResult<()> {
        self.slot(entity).map(|_| ())
    }

    /// Every living entity together with its signature, in id order.
    pub fn living(&self) -> impl Iterator<Item = (Entity, Signature)> + '_ {
        self.alive
            .iter()
            .zip(&self.signatures)
            .enumerate()
            .filter(|(_, (alive, _))| **alive)
            .map(|(index, (_, signature))| (Entity(index as u32), *signature))
    }

    /// Number of currently alive entities.
    pub fn living_count(&self) -> u32 {
        self.living
    }

    /// Number of freed slots waiting to be reused.
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    pub fn max_entities(&self) -> u32 {
        self.max_entities
    }

    fn slot(&self, entity: Entity) -> EcsResult<usize> {
        if entity.0 >= self.max_entities {
            return Err(EcsError::EntityOutOfRange {
                entity,
                max: self.max_entities,
            });
        }
        if !self.is_alive(entity) {
            return Err(EcsError::EntityNotAlive(entity));
        }
        Ok(entity.0 as usize)
    }
}
