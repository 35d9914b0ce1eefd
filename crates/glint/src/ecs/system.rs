//! # System — Logic Over Matching Entities
//!
//! A system declares which components it needs (its required [`Signature`])
//! and is handed, once per frame, every entity whose components are a
//! superset of that requirement.
//!
//! The matched set lives in the [`SystemManager`], not in the system, and
//! only the manager changes it: whenever an entity's signature changes the
//! manager re-tests that entity against every system.
//!
//! ## Running a System
//!
//! A system needs `&mut Coordinator` while it runs, but the coordinator owns
//! the system. The instance is checked out of its slot for the duration of
//! the update and put back afterwards. The system receives a snapshot of its
//! matched entities, so destroying entities mid-update can't invalidate
//! iteration.
//!
//! ## Registration Tokens
//!
//! [`register`](SystemManager::register) returns a [`SystemHandle<S>`]. Every
//! later operation takes the handle, so a system type that was never
//! registered can't be addressed at all.

use std::any::{Any, TypeId, type_name};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::marker::PhantomData;

use super::coordinator::Coordinator;
use super::entity::Entity;
use super::error::{EcsError, EcsResult};
use super::event::EventManager;
use super::signature::Signature;

/// Per-frame logic run by the [`Coordinator`].
pub trait System: 'static {
    /// Called once at registration. Subscribe event listeners here.
    fn init(&mut self, _events: &mut EventManager) {}

    /// Run one frame over `entities`, the entities matching this system's
    /// signature when the update started.
    fn update(&mut self, ecs: &mut Coordinator, entities: &[Entity], dt: f32) -> EcsResult<()>;
}

/// Typed token for a registered system.
pub struct SystemHandle<S> {
    id: usize,
    _marker: PhantomData<fn() -> S>,
}

impl<S> SystemHandle<S> {
    pub fn id(&self) -> usize {
        self.id
    }
}

impl<S> Clone for SystemHandle<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for SystemHandle<S> {}

impl<S> fmt::Debug for SystemHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SystemHandle<{}>({})", short_type_name(type_name::<S>()), self.id)
    }
}

type UpdateFn = fn(&mut dyn Any, &mut Coordinator, &[Entity], f32) -> EcsResult<()>;

fn update_erased<S: System>(
    system: &mut dyn Any,
    ecs: &mut Coordinator,
    entities: &[Entity],
    dt: f32,
) -> EcsResult<()> {
    match system.downcast_mut::<S>() {
        Some(system) => system.update(ecs, entities, dt),
        None => Err(EcsError::SystemNotRegistered(type_name::<S>())),
    }
}

struct SystemSlot {
    type_id: TypeId,
    name: &'static str,
    signature: Signature,
    entities: BTreeSet<Entity>,
    /// `None` while the system is checked out for an update.
    instance: Option<Box<dyn Any>>,
    update: UpdateFn,
}

/// A system instance taken out of its slot for an update.
pub(crate) struct CheckedOut {
    pub id: usize,
    pub instance: Box<dyn Any>,
    pub entities: Vec<Entity>,
    update: UpdateFn,
}

impl CheckedOut {
    pub fn run(&mut self, ecs: &mut Coordinator, dt: f32) -> EcsResult<()> {
        (self.update)(&mut *self.instance, ecs, &self.entities, dt)
    }
}

/// Owns every system instance, its required signature and its matched set.
pub struct SystemManager {
    ids: HashMap<TypeId, usize>,
    slots: Vec<SystemSlot>,
}

impl SystemManager {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            slots: Vec::new(),
        }
    }

    /// Store `system`. Each system type may be registered once.
    pub fn register<S: System>(&mut self, system: S) -> EcsResult<SystemHandle<S>> {
        let type_id = TypeId::of::<S>();
        if self.ids.contains_key(&type_id) {
            return Err(EcsError::SystemAlreadyRegistered(type_name::<S>()));
        }

        let id = self.slots.len();
        self.ids.insert(type_id, id);
        self.slots.push(SystemSlot {
            type_id,
            name: type_name::<S>(),
            signature: Signature::EMPTY,
            entities: BTreeSet::new(),
            instance: Some(Box::new(system)),
            update: update_erased::<S>,
        });
        log::debug!("registered system `{}`", short_type_name(type_name::<S>()));
        Ok(SystemHandle {
            id,
            _marker: PhantomData,
        })
    }

    pub fn is_registered<S: System>(&self) -> bool {
        self.ids.contains_key(&TypeId::of::<S>())
    }

    pub fn set_signature<S: System>(
        &mut self,
        handle: SystemHandle<S>,
        signature: Signature,
    ) -> EcsResult<()> {
        self.slot_mut(handle)?.signature = signature;
        Ok(())
    }

    pub fn signature<S: System>(&self, handle: SystemHandle<S>) -> EcsResult<Signature> {
        Ok(self.slot(handle)?.signature)
    }

    pub fn entities<S: System>(&self, handle: SystemHandle<S>) -> EcsResult<&BTreeSet<Entity>> {
        Ok(&self.slot(handle)?.entities)
    }

    pub fn get<S: System>(&self, handle: SystemHandle<S>) -> EcsResult<&S> {
        self.slot(handle)?
            .instance
            .as_ref()
            .ok_or(EcsError::SystemBusy(type_name::<S>()))?
            .downcast_ref::<S>()
            .ok_or(EcsError::SystemNotRegistered(type_name::<S>()))
    }

    pub fn get_mut<S: System>(&mut self, handle: SystemHandle<S>) -> EcsResult<&mut S> {
        self.slot_mut(handle)?
            .instance
            .as_mut()
            .ok_or(EcsError::SystemBusy(type_name::<S>()))?
            .downcast_mut::<S>()
            .ok_or(EcsError::SystemNotRegistered(type_name::<S>()))
    }

    /// Remove `entity` from every matched set.
    pub fn notify_entity_destroyed(&mut self, entity: Entity) {
        for slot in &mut self.slots {
            slot.entities.remove(&entity);
        }
    }

    /// Re-test `entity` against every system's requirement.
    pub fn notify_signature_changed(&mut self, entity: Entity, signature: Signature) {
        for slot in &mut self.slots {
            Self::refresh(slot, entity, signature);
        }
    }

    /// Re-test `entity` against a single system.
    pub(crate) fn refresh_one(&mut self, id: usize, entity: Entity, signature: Signature) {
        if let Some(slot) = self.slots.get_mut(id) {
            Self::refresh(slot, entity, signature);
        }
    }

    fn refresh(slot: &mut SystemSlot, entity: Entity, signature: Signature) {
        if signature.satisfies(slot.signature) {
            slot.entities.insert(entity);
        } else {
            slot.entities.remove(&entity);
        }
    }

    /// Take system `id` out of its slot along with a snapshot of its
    /// matched entities.
    pub(crate) fn check_out(&mut self, id: usize) -> EcsResult<CheckedOut> {
        let slot = self
            .slots
            .get_mut(id)
            .ok_or(EcsError::SystemNotRegistered("<unknown>"))?;
        let instance = slot.instance.take().ok_or(EcsError::SystemBusy(slot.name))?;
        Ok(CheckedOut {
            id,
            instance,
            entities: slot.entities.iter().copied().collect(),
            update: slot.update,
        })
    }

    pub(crate) fn check_in(&mut self, checked_out: CheckedOut) {
        if let Some(slot) = self.slots.get_mut(checked_out.id) {
            slot.instance = Some(checked_out.instance);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// `(short name, matched entity count)` per system, in registration order.
    pub fn summaries(&self) -> impl Iterator<Item = (String, usize)> + '_ {
        self.slots
            .iter()
            .map(|slot| (short_type_name(slot.name), slot.entities.len()))
    }

    fn slot<S: System>(&self, handle: SystemHandle<S>) -> EcsResult<&SystemSlot> {
        self.slots
            .get(handle.id)
            .filter(|slot| slot.type_id == TypeId::of::<S>())
            .ok_or(EcsError::SystemNotRegistered(type_name::<S>()))
    }

    fn slot_mut<S: System>(&mut self, handle: SystemHandle<S>) -> EcsResult<&mut SystemSlot> {
        self.slots
            .get_mut(handle.id)
            .filter(|slot| slot.type_id == TypeId::of::<S>())
            .ok_or(EcsError::SystemNotRegistered(type_name::<S>()))
    }
}

impl Default for SystemManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip module paths from a type name, generic arguments included
/// (`a::Foo<b::Bar>` → `Foo<Bar>`).
pub(crate) fn short_type_name(full: &str) -> String {
    let mut short = String::with_capacity(full.len());
    let mut start = 0;
    for (i, c) in full.char_indices() {
        if matches!(c, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&') {
            short.push_str(last_segment(&full[start..i]));
            short.push(c);
            start = i + 1;
        }
    }
    short.push_str(last_segment(&full[start..]));
    short
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}
