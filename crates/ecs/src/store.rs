use crate::components::{
    Active, AreaLight, Drawable, EntityInfo, Light, Material, ProjectionCamera,
};
use lumen_common::{EntityId, Transform};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Component type tags, used in events and by the inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    EntityInfo,
    Transform,
    Camera,
    Light,
    AreaLight,
    Drawable,
    Material,
    Active,
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::EntityInfo => "Entity info",
            Self::Transform => "Transform",
            Self::Camera => "Camera",
            Self::Light => "Light",
            Self::AreaLight => "Area light",
            Self::Drawable => "Mesh",
            Self::Material => "Material",
            Self::Active => "Active",
        };
        f.write_str(label)
    }
}

/// Events produced by entity and component mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentEvent {
    Created { entity: EntityId },
    Destroyed { entity: EntityId },
    Assigned { entity: EntityId, kind: ComponentKind },
    Replaced { entity: EntityId, kind: ComponentKind },
    Removed { entity: EntityId, kind: ComponentKind },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),
}

/// A type that has a storage slot in the `ComponentStore`.
///
/// Implemented for the scene component types of this crate; the storages
/// are fixed fields of the store.
pub trait Component: Sized + 'static {
    const KIND: ComponentKind;

    fn storage(store: &ComponentStore) -> &BTreeMap<EntityId, Self>;
    fn storage_mut(store: &mut ComponentStore) -> &mut BTreeMap<EntityId, Self>;
}

macro_rules! impl_component {
    ($ty:ty, $field:ident, $kind:ident) => {
        impl Component for $ty {
            const KIND: ComponentKind = ComponentKind::$kind;

            fn storage(store: &ComponentStore) -> &BTreeMap<EntityId, Self> {
                &store.$field
            }

            fn storage_mut(store: &mut ComponentStore) -> &mut BTreeMap<EntityId, Self> {
                &mut store.$field
            }
        }
    };
}

impl_component!(EntityInfo, infos, EntityInfo);
impl_component!(Transform, transforms, Transform);
impl_component!(ProjectionCamera, cameras, Camera);
impl_component!(Light, lights, Light);
impl_component!(AreaLight, area_lights, AreaLight);
impl_component!(Drawable, drawables, Drawable);
impl_component!(Material, materials, Material);
impl_component!(Active, active, Active);

/// Deterministic component storage for all component types.
///
/// Uses BTreeMap for canonical iteration order. All mutations produce events.
#[derive(Debug, Clone, Default)]
pub struct ComponentStore {
    next_id: u64,
    entities: BTreeSet<EntityId>,
    infos: BTreeMap<EntityId, EntityInfo>,
    transforms: BTreeMap<EntityId, Transform>,
    cameras: BTreeMap<EntityId, ProjectionCamera>,
    lights: BTreeMap<EntityId, Light>,
    area_lights: BTreeMap<EntityId, AreaLight>,
    drawables: BTreeMap<EntityId, Drawable>,
    materials: BTreeMap<EntityId, Material>,
    active: BTreeMap<EntityId, Active>,
    events: Vec<ComponentEvent>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new entity. Ids increase monotonically and are never reused.
    pub fn create(&mut self) -> EntityId {
        let entity = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(entity);
        self.events.push(ComponentEvent::Created { entity });
        entity
    }

    /// Destroy an entity and every component attached to it.
    pub fn destroy(&mut self, entity: EntityId) -> bool {
        if !self.entities.remove(&entity) {
            return false;
        }
        self.remove::<EntityInfo>(entity);
        self.remove::<Transform>(entity);
        self.remove::<ProjectionCamera>(entity);
        self.remove::<Light>(entity);
        self.remove::<AreaLight>(entity);
        self.remove::<Drawable>(entity);
        self.remove::<Material>(entity);
        self.remove::<Active>(entity);
        self.events.push(ComponentEvent::Destroyed { entity });
        true
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains(&entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// All live entities in creation order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().copied()
    }

    /// Attach a component, replacing any existing one of the same type.
    pub fn assign<C: Component>(
        &mut self,
        entity: EntityId,
        component: C,
    ) -> Result<(), StoreError> {
        if !self.contains(entity) {
            return Err(StoreError::UnknownEntity(entity));
        }
        let previous = C::storage_mut(self).insert(entity, component);
        let event = if previous.is_some() {
            ComponentEvent::Replaced {
                entity,
                kind: C::KIND,
            }
        } else {
            ComponentEvent::Assigned {
                entity,
                kind: C::KIND,
            }
        };
        tracing::trace!(%entity, kind = %C::KIND, "component assigned");
        self.events.push(event);
        Ok(())
    }

    pub fn remove<C: Component>(&mut self, entity: EntityId) -> Option<C> {
        let removed = C::storage_mut(self).remove(&entity);
        if removed.is_some() {
            self.events.push(ComponentEvent::Removed {
                entity,
                kind: C::KIND,
            });
        }
        removed
    }

    pub fn get<C: Component>(&self, entity: EntityId) -> Option<&C> {
        C::storage(self).get(&entity)
    }

    /// Mutable access. In-place edits are not logged as events.
    pub fn get_mut<C: Component>(&mut self, entity: EntityId) -> Option<&mut C> {
        C::storage_mut(self).get_mut(&entity)
    }

    pub fn has<C: Component>(&self, entity: EntityId) -> bool {
        C::storage(self).contains_key(&entity)
    }

    pub fn count<C: Component>(&self) -> usize {
        C::storage(self).len()
    }

    /// Every entity carrying `C`, in ascending id order.
    pub fn each<C: Component>(&self) -> impl Iterator<Item = (EntityId, &C)> + '_ {
        C::storage(self).iter().map(|(id, c)| (*id, c))
    }

    /// Every entity carrying both `A` and `B`, in ascending id order.
    pub fn query<A: Component, B: Component>(
        &self,
    ) -> impl Iterator<Item = (EntityId, &A, &B)> + '_ {
        let bs = B::storage(self);
        A::storage(self)
            .iter()
            .filter_map(move |(id, a)| bs.get(id).map(|b| (*id, a, b)))
    }

    /// Kinds of all components attached to `entity`, in `ComponentKind` order.
    pub fn kinds_of(&self, entity: EntityId) -> Vec<ComponentKind> {
        let mut kinds = Vec::new();
        let mut check = |present: bool, kind: ComponentKind| {
            if present {
                kinds.push(kind);
            }
        };
        check(self.has::<EntityInfo>(entity), ComponentKind::EntityInfo);
        check(self.has::<Transform>(entity), ComponentKind::Transform);
        check(self.has::<ProjectionCamera>(entity), ComponentKind::Camera);
        check(self.has::<Light>(entity), ComponentKind::Light);
        check(self.has::<AreaLight>(entity), ComponentKind::AreaLight);
        check(self.has::<Drawable>(entity), ComponentKind::Drawable);
        check(self.has::<Material>(entity), ComponentKind::Material);
        check(self.has::<Active>(entity), ComponentKind::Active);
        kinds
    }

    /// Drain and return all pending component events.
    pub fn drain_events(&mut self) -> Vec<ComponentEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only access to pending events.
    pub fn events(&self) -> &[ComponentEvent] {
        &self.events
    }
}
