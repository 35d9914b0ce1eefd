//! # Component — Dense Per-Type Storage
//!
//! Components are plain data: a `Transform`, a `Camera`, a `Velocity`. Each
//! registered component type gets one [`ComponentArray`], a packed `Vec<T>`
//! plus two index maps so that any entity's component is found in O(1).
//!
//! ## Memory Layout
//!
//! ```text
//! dense:        [pos_a, pos_c, pos_b]   ← no gaps, ever
//! entities:     [  a,     c,     b  ]   ← dense index → entity
//! index_of:     { a: 0, b: 2, c: 1 }    ← entity → dense index
//! ```
//!
//! Removing `a` moves the last element (`pos_b`) into slot 0, repoints `b`
//! at 0 and pops the tail. Removal is O(1) and does **not** preserve order.
//!
//! ## Type Erasure
//!
//! The [`ComponentManager`] holds arrays of many different `T`, so it stores
//! them as `Box<dyn ErasedComponentArray>`. The erased view only needs what
//! entity destruction needs; typed access goes back through `Any`.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;

use super::coordinator::Coordinator;
use super::error::{EcsError, EcsResult};
use super::entity::Entity;
use super::signature::{ComponentType, MAX_COMPONENTS, Signature};

/// Dense storage for every instance of one component type.
pub struct ComponentArray<T> {
    dense: Vec<T>,
    entities: Vec<Entity>,
    index_of: HashMap<Entity, usize>,
}

impl<T: 'static> ComponentArray<T> {
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            entities: Vec::new(),
            index_of: HashMap::new(),
        }
    }

    /// Append `value` for `entity`. An entity holds at most one `T`.
    pub fn insert(&mut self, entity: Entity, value: T) -> EcsResult<()> {
        if self.index_of.contains_key(&entity) {
            return Err(EcsError::ComponentAlreadyPresent {
                entity,
                component: type_name::<T>(),
            });
        }
        self.index_of.insert(entity, self.dense.len());
        self.entities.push(entity);
        self.dense.push(value);
        Ok(())
    }

    /// Swap-remove `entity`'s component and return it.
    pub fn remove(&mut self, entity: Entity) -> EcsResult<T> {
        let index = self.index_of.remove(&entity).ok_or(EcsError::ComponentMissing {
            entity,
            component: type_name::<T>(),
        })?;

        let value = self.dense.swap_remove(index);
        self.entities.swap_remove(index);
        // If something was moved into the hole, repoint it.
        if let Some(&moved) = self.entities.get(index) {
            self.index_of.insert(moved, index);
        }
        Ok(value)
    }

    pub fn get(&self, entity: Entity) -> EcsResult<&T> {
        match self.index_of.get(&entity) {
            Some(&index) => Ok(&self.dense[index]),
            None => Err(self.missing(entity)),
        }
    }

    pub fn get_mut(&mut self, entity: Entity) -> EcsResult<&mut T> {
        match self.index_of.get(&entity) {
            Some(&index) => Ok(&mut self.dense[index]),
            None => Err(self.missing(entity)),
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.index_of.contains_key(&entity)
    }

    /// Iterate `(entity, component)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(&self.dense)
    }

    /// The packed component values.
    pub fn as_slice(&self) -> &[T] {
        &self.dense
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    fn missing(&self, entity: Entity) -> EcsError {
        EcsError::ComponentMissing {
            entity,
            component: type_name::<T>(),
        }
    }
}

impl<T: 'static> Default for ComponentArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The type-erased face of a [`ComponentArray`].
pub trait ErasedComponentArray: Any {
    /// Drop `entity`'s component if it has one.
    fn on_entity_destroyed(&mut self, entity: Entity);

    fn len(&self) -> usize;

    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> ErasedComponentArray for ComponentArray<T> {
    fn on_entity_destroyed(&mut self, entity: Entity) {
        if self.contains(entity) {
            let _ = self.remove(entity);
        }
    }

    fn len(&self) -> usize {
        self.dense.len()
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Owns one [`ComponentArray`] per registered component type.
///
/// Array `i` in `arrays` belongs to [`ComponentType`] `i`.
pub struct ComponentManager {
    types: HashMap<TypeId, ComponentType>,
    arrays: Vec<Box<dyn ErasedComponentArray>>,
}

impl ComponentManager {
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
            arrays: Vec::new(),
        }
    }

    /// Assign the next free [`ComponentType`] to `T` and create its array.
    pub fn register<T: 'static>(&mut self) -> EcsResult<ComponentType> {
        let type_id = TypeId::of::<T>();
        if self.types.contains_key(&type_id) {
            return Err(EcsError::ComponentAlreadyRegistered(type_name::<T>()));
        }
        if self.arrays.len() >= MAX_COMPONENTS {
            return Err(EcsError::TooManyComponentTypes {
                max: MAX_COMPONENTS,
            });
        }

        let component = ComponentType(self.arrays.len() as u8);
        self.types.insert(type_id, component);
        self.arrays.push(Box::new(ComponentArray::<T>::new()));
        log::debug!("registered component `{}` as {:?}", type_name::<T>(), component);
        Ok(component)
    }

    pub fn component_type<T: 'static>(&self) -> EcsResult<ComponentType> {
        self.types
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(EcsError::ComponentNotRegistered(type_name::<T>()))
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.types.contains_key(&TypeId::of::<T>())
    }

    pub fn add<T: 'static>(&mut self, entity: Entity, value: T) -> EcsResult<()> {
        self.array_mut::<T>()?.insert(entity, value)
    }

    pub fn remove<T: 'static>(&mut self, entity: Entity) -> EcsResult<T> {
        self.array_mut::<T>()?.remove(entity)
    }

    pub fn get<T: 'static>(&self, entity: Entity) -> EcsResult<&T> {
        self.array::<T>()?.get(entity)
    }

    pub fn get_mut<T: 'static>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        self.array_mut::<T>()?.get_mut(entity)
    }

    pub fn has<T: 'static>(&self, entity: Entity) -> bool {
        self.array::<T>().is_ok_and(|array| array.contains(entity))
    }

    /// Forward a destruction to every array, in registration order.
    pub fn notify_entity_destroyed(&mut self, entity: Entity) {
        for array in &mut self.arrays {
            array.on_entity_destroyed(entity);
        }
    }

    /// Typed read access to the whole array for `T`.
    pub fn array<T: 'static>(&self) -> EcsResult<&ComponentArray<T>> {
        let component = self.component_type::<T>()?;
        self.arrays[component.index()]
            .as_any()
            .downcast_ref::<ComponentArray<T>>()
            .ok_or(EcsError::ComponentNotRegistered(type_name::<T>()))
    }

    fn array_mut<T: 'static>(&mut self) -> EcsResult<&mut ComponentArray<T>> {
        let component = self.component_type::<T>()?;
        self.arrays[component.index()]
            .as_any_mut()
            .downcast_mut::<ComponentArray<T>>()
            .ok_or(EcsError::ComponentNotRegistered(type_name::<T>()))
    }

    pub fn registered_count(&self) -> usize {
        self.arrays.len()
    }

    /// `(type name, stored count)` for each registered type.
    pub fn array_sizes(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.arrays.iter().map(|array| (array.type_name(), array.len()))
    }
}

impl Default for ComponentManager {
    fn default() -> Self {
        Self::new()
    }
}

// ── Bundles (tuple support) ──────────────────────────────────────────────

/// A tuple of components that can be attached together, or turned into the
/// [`Signature`] a system requires.
///
/// Implemented for tuples of up to 8 component types.
pub trait ComponentBundle {
    fn signature(components: &ComponentManager) -> EcsResult<Signature>;

    /// Add every component to `entity`, one at a time.
    fn add_to(self, ecs: &mut Coordinator, entity: Entity) -> EcsResult<()>;
}

macro_rules! impl_component_bundle {
    ($($T:ident),+) => {
        impl<$($T: 'static),+> ComponentBundle for ($($T,)+) {
            fn signature(components: &ComponentManager) -> EcsResult<Signature> {
                let mut signature = Signature::EMPTY;
                $(signature.set(components.component_type::<$T>()?, true);)+
                Ok(signature)
            }

            #[allow(non_snake_case)]
            fn add_to(self, ecs: &mut Coordinator, entity: Entity) -> EcsResult<()> {
                let ($($T,)+) = self;
                $(ecs.add_component(entity, $T)?;)+
                Ok(())
            }
        }
    };
}

impl_component_bundle!(A);
impl_component_bundle!(A, B);
impl_component_bundle!(A, B, C);
impl_component_bundle!(A, B, C, D);
impl_component_bundle!(A, B, C, D, E);
impl_component_bundle!(A, B, C, D, E, F);
impl_component_bundle!(A, B, C, D, E, F, G);
impl_component_bundle!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Position {
        x: f32,
    }
    #[derive(Debug, PartialEq)]
    struct Health(u32);

    fn e(index: u32) -> Entity {
        Entity(index)
    }

    #[test]
    fn insert_and_get() {
        let mut array = ComponentArray::new();
        array.insert(e(4), Health(10)).unwrap();
        array.insert(e(1), Health(20)).unwrap();
        assert_eq!(array.get(e(4)), Ok(&Health(10)));
        assert_eq!(array.get(e(1)), Ok(&Health(20)));
        assert_eq!(array.len(), 2);
    }

    #[test]
    fn double_insert_is_rejected() {
        let mut array = ComponentArray::new();
        array.insert(e(0), Health(1)).unwrap();
        assert!(matches!(
            array.insert(e(0), Health(2)),
            Err(EcsError::ComponentAlreadyPresent { .. })
        ));
        // The first value is untouched.
        assert_eq!(array.get(e(0)), Ok(&Health(1)));
    }

    #[test]
    fn swap_remove_middle_repoints_last() {
        let mut array = ComponentArray::new();
        array.insert(e(0), Health(10)).unwrap();
        array.insert(e(1), Health(20)).unwrap();
        array.insert(e(2), Health(30)).unwrap();

        assert_eq!(array.remove(e(0)), Ok(Health(10)));
        assert_eq!(array.len(), 2);
        // Health(30) was moved into slot 0.
        assert_eq!(array.as_slice()[0], Health(30));
        assert_eq!(array.get(e(2)), Ok(&Health(30)));
        assert_eq!(array.get(e(1)), Ok(&Health(20)));
        assert!(array.get(e(0)).is_err());
    }

    #[test]
    fn remove_last_element() {
        let mut array = ComponentArray::new();
        array.insert(e(0), Health(10)).unwrap();
        array.insert(e(1), Health(20)).unwrap();
        assert_eq!(array.remove(e(1)), Ok(Health(20)));
        assert_eq!(array.get(e(0)), Ok(&Health(10)));
        assert!(!array.contains(e(1)));
    }

    #[test]
    fn remove_missing_is_an_error() {
        let mut array: ComponentArray<Health> = ComponentArray::new();
        assert!(matches!(
            array.remove(e(3)),
            Err(EcsError::ComponentMissing { .. })
        ));
    }

    #[test]
    fn entity_destroyed_is_noop_without_component() {
        let mut array = ComponentArray::new();
        array.insert(e(0), Health(10)).unwrap();
        ErasedComponentArray::on_entity_destroyed(&mut array, e(5));
        assert_eq!(array.len(), 1);
        ErasedComponentArray::on_entity_destroyed(&mut array, e(0));
        assert!(array.is_empty());
    }

    #[test]
    fn density_holds_under_churn() {
        let mut array = ComponentArray::new();
        let mut expected = HashSet::new();
        for step in 0..200u32 {
            let entity = e((step * 13) % 17);
            if expected.contains(&entity) {
                array.remove(entity).unwrap();
                expected.remove(&entity);
            } else {
                array.insert(entity, Position { x: step as f32 }).unwrap();
                expected.insert(entity);
            }

            assert_eq!(array.len(), expected.len());
            let stored: HashSet<_> = array.iter().map(|(entity, _)| entity).collect();
            assert_eq!(stored, expected);
            for index in 0..17 {
                assert_eq!(array.get(e(index)).is_ok(), expected.contains(&e(index)));
            }
        }
    }

    #[test]
    fn register_assigns_sequential_ids() {
        let mut components = ComponentManager::new();
        assert_eq!(components.register::<Position>(), Ok(ComponentType(0)));
        assert_eq!(components.register::<Health>(), Ok(ComponentType(1)));
        assert_eq!(components.component_type::<Health>(), Ok(ComponentType(1)));
        assert_eq!(components.registered_count(), 2);
    }

    #[test]
    fn double_register_is_rejected() {
        let mut components = ComponentManager::new();
        components.register::<Position>().unwrap();
        assert!(matches!(
            components.register::<Position>(),
            Err(EcsError::ComponentAlreadyRegistered(_))
        ));
        assert_eq!(components.registered_count(), 1);
    }

    #[test]
    fn unregistered_type_is_an_error() {
        let mut components = ComponentManager::new();
        assert!(matches!(
            components.add(e(0), Health(1)),
            Err(EcsError::ComponentNotRegistered(_))
        ));
        assert!(!components.has::<Health>(e(0)));
    }

    #[test]
    fn component_type_limit() {
        struct Slot<const N: usize>;

        macro_rules! register_slots {
            ($components:expr, $($n:literal)*) => {
                $($components.register::<Slot<$n>>().unwrap();)*
            };
        }

        let mut components = ComponentManager::new();
        register_slots!(components,
            0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31
            32 33 34 35 36 37 38 39 40 41 42 43 44 45 46 47 48 49 50 51 52 53 54 55 56 57 58 59 60 61 62 63);
        assert_eq!(components.registered_count(), MAX_COMPONENTS);
        assert_eq!(
            components.register::<Health>(),
            Err(EcsError::TooManyComponentTypes { max: MAX_COMPONENTS })
        );
    }

    #[test]
    fn destruction_reaches_every_array() {
        let mut components = ComponentManager::new();
        components.register::<Position>().unwrap();
        components.register::<Health>().unwrap();
        components.add(e(0), Position { x: 1.0 }).unwrap();
        components.add(e(0), Health(3)).unwrap();
        components.add(e(1), Health(4)).unwrap();

        components.notify_entity_destroyed(e(0));
        assert!(!components.has::<Position>(e(0)));
        assert!(!components.has::<Health>(e(0)));
        assert_eq!(components.get::<Health>(e(1)), Ok(&Health(4)));
    }

    #[test]
    fn bundle_signature() {
        let mut components = ComponentManager::new();
        let position = components.register::<Position>().unwrap();
        let health = components.register::<Health>().unwrap();
        let signature = <(Position, Health)>::signature(&components).unwrap();
        assert_eq!(signature, Signature::EMPTY.with(position).with(health));
    }
}
