//! # Coordinator — The ECS Facade
//!
//! The [`Coordinator`] owns the entity, component, system and event managers
//! and is the only thing application code and systems talk to. There is no
//! global instance: build one at startup and pass `&mut Coordinator` to
//! whatever needs it.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ Coordinator                                          │
//! │                                                      │
//! │  entities:   EntityManager    id → Signature          │
//! │  components: ComponentManager TypeId → ComponentArray │
//! │  systems:    SystemManager    System → matched set    │
//! │  events:     EventManager     EventId → listeners     │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Keeping Signatures Honest
//!
//! Adding or removing a component flips exactly one bit of the entity's
//! signature, writes it back, and asks the system manager to re-test the
//! entity against every system. Destroying an entity resets its signature,
//! evicts it from every component array, then from every system's matched
//! set. Each step is validated up front so a failed call leaves nothing
//! half-done.

use std::any::type_name;
use std::collections::BTreeSet;

use serde::Serialize;

use super::component::{ComponentArray, ComponentBundle, ComponentManager};
use super::entity::{Entity, EntityManager};
use super::error::{EcsError, EcsResult};
use super::event::{Event, EventId, EventManager, ListenerId};
use super::signature::{ComponentType, Signature};
use super::system::{System, SystemHandle, SystemManager, short_type_name};
use crate::config::EcsConfig;

/// Owns every ECS manager and keeps them consistent.
pub struct Coordinator {
    entities: EntityManager,
    components: ComponentManager,
    systems: SystemManager,
    events: EventManager,
    /// Entities created since the last [`take_frame_counters`](Self::take_frame_counters).
    #[cfg(feature = "diagnostics")]
    created_this_frame: u32,
    /// Entities destroyed since the last [`take_frame_counters`](Self::take_frame_counters).
    #[cfg(feature = "diagnostics")]
    destroyed_this_frame: u32,
}

impl Coordinator {
    pub fn new(config: &EcsConfig) -> Self {
        Self {
            entities: EntityManager::new(config.max_entities),
            components: ComponentManager::new(),
            systems: SystemManager::new(),
            events: EventManager::new(),
            #[cfg(feature = "diagnostics")]
            created_this_frame: 0,
            #[cfg(feature = "diagnostics")]
            destroyed_this_frame: 0,
        }
    }

    // ── Entities ─────────────────────────────────────────────────────

    pub fn create_entity(&mut self) -> EcsResult<Entity> {
        let entity = self.entities.create_entity()?;
        #[cfg(feature = "diagnostics")]
        {
            self.created_this_frame += 1;
        }
        log::trace!("created entity {entity}");
        Ok(entity)
    }

    /// Create an entity and attach every component in `bundle`.
    ///
    /// If any component fails to attach, the entity is destroyed again and
    /// the error returned.
    ///
    /// ```ignore
    /// let camera = ecs.spawn((Transform::from_xyz(0.0, 2.0, 5.0), Camera::default()))?;
    /// ```
    pub fn spawn<B: ComponentBundle>(&mut self, bundle: B) -> EcsResult<Entity> {
        let entity = self.create_entity()?;
        if let Err(err) = bundle.add_to(self, entity) {
            self.destroy_entity(entity)?;
            return Err(err);
        }
        Ok(entity)
    }

    /// Destroy `entity`: reset its signature, drop its components, and
    /// remove it from every system.
    pub fn destroy_entity(&mut self, entity: Entity) -> EcsResult<()> {
        self.entities.destroy_entity(entity)?;
        self.components.notify_entity_destroyed(entity);
        self.systems.notify_entity_destroyed(entity);
        #[cfg(feature = "diagnostics")]
        {
            self.destroyed_this_frame += 1;
        }
        log::trace!("destroyed entity {entity}");
        Ok(())
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn living_count(&self) -> u32 {
        self.entities.living_count()
    }

    pub fn signature(&self, entity: Entity) -> EcsResult<Signature> {
        self.entities.signature(entity)
    }

    // ── Components ───────────────────────────────────────────────────

    pub fn register_component<T: 'static>(&mut self) -> EcsResult<ComponentType> {
        self.components.register::<T>()
    }

    pub fn component_type<T: 'static>(&self) -> EcsResult<ComponentType> {
        self.components.component_type::<T>()
    }

    /// Attach `value` to `entity` and update the entity's system membership.
    pub fn add_component<T: 'static>(&mut self, entity: Entity, value: T) -> EcsResult<()> {
        let mut signature = self.entities.signature(entity)?;
        let component = self.components.component_type::<T>()?;

        self.components.add(entity, value)?;
        signature.set(component, true);
        self.entities.set_signature(entity, signature)?;
        self.systems.notify_signature_changed(entity, signature);
        Ok(())
    }

    /// Detach `entity`'s `T`, update its system membership, and return the
    /// removed value.
    pub fn remove_component<T: 'static>(&mut self, entity: Entity) -> EcsResult<T> {
        let mut signature = self.entities.signature(entity)?;
        let component = self.components.component_type::<T>()?;

        let value = self.components.remove::<T>(entity)?;
        signature.set(component, false);
        self.entities.set_signature(entity, signature)?;
        self.systems.notify_signature_changed(entity, signature);
        Ok(value)
    }

    pub fn get_component<T: 'static>(&self, entity: Entity) -> EcsResult<&T> {
        self.entities.validate(entity)?;
        self.components.get::<T>(entity)
    }

    pub fn get_component_mut<T: 'static>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        self.entities.validate(entity)?;
        self.components.get_mut::<T>(entity)
    }

    pub fn has_component<T: 'static>(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity) && self.components.has::<T>(entity)
    }

    /// Read access to every stored `T`.
    pub fn component_array<T: 'static>(&self) -> EcsResult<&ComponentArray<T>> {
        self.components.array::<T>()
    }

    /// The signature a tuple of component types maps to.
    ///
    /// ```ignore
    /// let required = ecs.signature_of::<(Transform, Camera)>()?;
    /// ```
    pub fn signature_of<B: ComponentBundle>(&self) -> EcsResult<Signature> {
        B::signature(&self.components)
    }

    // ── Systems ──────────────────────────────────────────────────────

    /// Construct `S` with [`Default`] and register it.
    pub fn register_system<S: System + Default>(&mut self) -> EcsResult<SystemHandle<S>> {
        self.register_system_with(S::default())
    }

    /// Register an already-built system instance. Its
    /// [`init`](System::init) runs before it is stored.
    pub fn register_system_with<S: System>(&mut self, mut system: S) -> EcsResult<SystemHandle<S>> {
        if self.systems.is_registered::<S>() {
            return Err(EcsError::SystemAlreadyRegistered(type_name::<S>()));
        }
        system.init(&mut self.events);
        self.systems.register(system)
    }

    /// Set the components `S` requires, and re-test every living entity
    /// against the new requirement.
    pub fn set_system_signature<S: System>(
        &mut self,
        handle: SystemHandle<S>,
        signature: Signature,
    ) -> EcsResult<()> {
        self.systems.set_signature(handle, signature)?;
        for (entity, owned) in self.entities.living() {
            self.systems.refresh_one(handle.id(), entity, owned);
        }
        Ok(())
    }

    pub fn system_signature<S: System>(&self, handle: SystemHandle<S>) -> EcsResult<Signature> {
        self.systems.signature(handle)
    }

    /// Entities currently matching `S`'s signature.
    pub fn system_entities<S: System>(
        &self,
        handle: SystemHandle<S>,
    ) -> EcsResult<&BTreeSet<Entity>> {
        self.systems.entities(handle)
    }

    pub fn system<S: System>(&self, handle: SystemHandle<S>) -> EcsResult<&S> {
        self.systems.get(handle)
    }

    pub fn system_mut<S: System>(&mut self, handle: SystemHandle<S>) -> EcsResult<&mut S> {
        self.systems.get_mut(handle)
    }

    /// Run one system once.
    pub fn update_system<S: System>(&mut self, handle: SystemHandle<S>, dt: f32) -> EcsResult<()> {
        self.systems.signature(handle)?;
        self.run_system(handle.id(), dt)
    }

    /// Run every system once, in registration order. Stops at the first
    /// error.
    pub fn update_systems(&mut self, dt: f32) -> EcsResult<()> {
        for id in 0..self.systems.len() {
            self.run_system(id, dt)?;
        }
        Ok(())
    }

    fn run_system(&mut self, id: usize, dt: f32) -> EcsResult<()> {
        let mut checked_out = self.systems.check_out(id)?;
        let result = checked_out.run(self, dt);
        self.systems.check_in(checked_out);
        result
    }

    // ── Events ───────────────────────────────────────────────────────

    pub fn add_event_listener(
        &mut self,
        event: EventId,
        listener: impl FnMut(&mut Event) + 'static,
    ) -> ListenerId {
        self.events.add_listener(event, listener)
    }

    pub fn remove_event_listener(&mut self, listener: ListenerId) -> bool {
        self.events.remove_listener(listener)
    }

    /// Deliver `event` to its listeners. Returns how many ran.
    pub fn send_event(&mut self, event: &mut Event) -> usize {
        self.events.send(event)
    }

    /// Deliver a parameterless event.
    pub fn send_event_id(&mut self, event: EventId) -> usize {
        self.events.send_id(event)
    }

    pub fn events_mut(&mut self) -> &mut EventManager {
        &mut self.events
    }

    // ── Diagnostics ──────────────────────────────────────────────────

    pub fn stats(&self) -> EcsStats {
        EcsStats {
            living_entities: self.entities.living_count(),
            free_entities: self.entities.free_count(),
            max_entities: self.entities.max_entities(),
            components: self
                .components
                .array_sizes()
                .map(|(name, count)| ComponentStats {
                    name: short_type_name(name),
                    count,
                })
                .collect(),
            systems: self
                .systems
                .summaries()
                .map(|(name, entities)| SystemStats { name, entities })
                .collect(),
            listeners: self.events.total_listeners(),
            #[cfg(feature = "diagnostics")]
            created_this_frame: self.created_this_frame,
            #[cfg(feature = "diagnostics")]
            destroyed_this_frame: self.destroyed_this_frame,
        }
    }

    /// Return `(created, destroyed)` since the last call and reset both.
    #[cfg(feature = "diagnostics")]
    pub fn take_frame_counters(&mut self) -> (u32, u32) {
        let counters = (self.created_this_frame, self.destroyed_this_frame);
        self.created_this_frame = 0;
        self.destroyed_this_frame = 0;
        counters
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(&EcsConfig::default())
    }
}

/// Snapshot of ECS occupancy, serializable for logging.
#[derive(Debug, Clone, Serialize)]
pub struct EcsStats {
    pub living_entities: u32,
    pub free_entities: usize,
    pub max_entities: u32,
    pub components: Vec<ComponentStats>,
    pub systems: Vec<SystemStats>,
    pub listeners: usize,
    #[cfg(feature = "diagnostics")]
    pub created_this_frame: u32,
    #[cfg(feature = "diagnostics")]
    pub destroyed_this_frame: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentStats {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemStats {
    pub name: String,
    pub entities: usize,
}
