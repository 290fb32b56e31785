use glam::Vec3;
use lumen_common::{EntityId, Transform, TransformError};
use lumen_ecs::{AreaLight, ComponentKind, ComponentStore, EntityInfo, Light, StoreError};

/// Scale range accepted by the transform editor.
pub const MIN_EDIT_SCALE: f32 = 0.001;
pub const MAX_EDIT_SCALE: f32 = 1000.0;

/// Component sections the inspector shows, in display order.
const SECTIONS: [ComponentKind; 6] = [
    ComponentKind::EntityInfo,
    ComponentKind::Transform,
    ComponentKind::Light,
    ComponentKind::AreaLight,
    ComponentKind::Drawable,
    ComponentKind::Material,
];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InspectorError {
    #[error("no entity selected")]
    NoSelection,
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),
    #[error("entity {entity} has no {kind} component")]
    MissingComponent { entity: EntityId, kind: ComponentKind },
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One row of the entity list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityListItem {
    pub entity: EntityId,
    /// `name#index`.
    pub label: String,
    pub selected: bool,
}

/// Position and scale as shown in the transform editor.
///
/// Rotation is not editable; writing the fields back produces
/// `translate * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformFields {
    pub position: Vec3,
    pub scale: Vec3,
}

impl TransformFields {
    pub fn reset_scale(&mut self) {
        self.scale = Vec3::ONE;
    }

    /// Copy the X scale into Y and Z.
    pub fn make_uniform(&mut self) {
        self.scale = Vec3::splat(self.scale.x);
    }

    pub fn to_transform(self) -> Transform {
        let scale = self.scale.clamp(Vec3::splat(MIN_EDIT_SCALE), Vec3::splat(MAX_EDIT_SCALE));
        Transform::from_translation_scale(self.position, scale)
    }
}

/// Summary of scene contents for the inspector header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSummary {
    pub entity_count: usize,
    pub named: usize,
    pub cameras: usize,
    pub lights: usize,
    pub drawables: usize,
    pub pending_events: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: entities={} named={} cameras={} lights={} drawables={} pending_events={}",
            self.entity_count,
            self.named,
            self.cameras,
            self.lights,
            self.drawables,
            self.pending_events
        )
    }
}

/// Editor-side scene inspector: entity list, selection and component
/// editing over a `ComponentStore`. Holds no scene data of its own.
#[derive(Debug, Clone)]
pub struct SceneInspector {
    enabled: bool,
    selected: Option<EntityId>,
}

impl Default for SceneInspector {
    fn default() -> Self {
        Self {
            enabled: true,
            selected: None,
        }
    }
}

impl SceneInspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn summary(store: &ComponentStore) -> SceneSummary {
        SceneSummary {
            entity_count: store.entity_count(),
            named: store.count::<EntityInfo>(),
            cameras: store.count::<lumen_ecs::ProjectionCamera>(),
            lights: store.count::<Light>(),
            drawables: store.count::<lumen_ecs::Drawable>(),
            pending_events: store.events().len(),
        }
    }

    /// Named entities in creation order. Unnamed entities are not listed.
    pub fn entity_list(&self, store: &ComponentStore) -> Vec<EntityListItem> {
        store
            .each::<EntityInfo>()
            .map(|(entity, info)| EntityListItem {
                entity,
                label: format!("{}#{}", info.name(), entity.index()),
                selected: self.selected == Some(entity),
            })
            .collect()
    }

    pub fn select(
        &mut self,
        store: &ComponentStore,
        entity: EntityId,
    ) -> Result<(), InspectorError> {
        if !store.contains(entity) {
            return Err(InspectorError::UnknownEntity(entity));
        }
        self.selected = Some(entity);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// The selected entity, if it is still alive.
    pub fn selection(&self, store: &ComponentStore) -> Option<EntityId> {
        self.selected.filter(|&entity| store.contains(entity))
    }

    fn require_selection(&self, store: &ComponentStore) -> Result<EntityId, InspectorError> {
        self.selection(store).ok_or(InspectorError::NoSelection)
    }

    /// New entity named "Empty" with an identity transform.
    pub fn create_empty_entity(
        &mut self,
        store: &mut ComponentStore,
    ) -> Result<EntityId, InspectorError> {
        let entity = store.create();
        store.assign(entity, EntityInfo::new("Empty"))?;
        store.assign(entity, Transform::IDENTITY)?;
        tracing::info!(%entity, "created empty entity");
        Ok(entity)
    }

    /// New entity named "Light" with an identity transform and a white light.
    pub fn create_light(&mut self, store: &mut ComponentStore) -> Result<EntityId, InspectorError> {
        let entity = store.create();
        store.assign(entity, EntityInfo::new("Light"))?;
        store.assign(entity, Transform::IDENTITY)?;
        store.assign(entity, Light::default())?;
        tracing::info!(%entity, "created light");
        Ok(entity)
    }

    pub fn attach_area_light(&mut self, store: &mut ComponentStore) -> Result<(), InspectorError> {
        let entity = self.require_selection(store)?;
        store.assign(entity, AreaLight::default())?;
        Ok(())
    }

    /// Destroy the selected entity and clear the selection.
    pub fn delete_selected(
        &mut self,
        store: &mut ComponentStore,
    ) -> Result<EntityId, InspectorError> {
        let entity = self.require_selection(store)?;
        store.destroy(entity);
        self.selected = None;
        tracing::info!(%entity, "deleted entity");
        Ok(entity)
    }

    pub fn rename(
        &mut self,
        store: &mut ComponentStore,
        name: impl Into<String>,
    ) -> Result<(), InspectorError> {
        let entity = self.require_selection(store)?;
        let info = store
            .get_mut::<EntityInfo>(entity)
            .ok_or(InspectorError::MissingComponent {
                entity,
                kind: ComponentKind::EntityInfo,
            })?;
        info.set_name(name);
        Ok(())
    }

    /// Decompose the selection's transform into editable fields.
    pub fn transform_fields(
        &self,
        store: &ComponentStore,
    ) -> Result<TransformFields, InspectorError> {
        let entity = self.require_selection(store)?;
        let transform = store
            .get::<Transform>(entity)
            .ok_or(InspectorError::MissingComponent {
                entity,
                kind: ComponentKind::Transform,
            })?;
        let (scale, _rotation, position) = transform.decompose();
        Ok(TransformFields { position, scale })
    }

    /// Write edited fields back as `translate * scale`.
    pub fn apply_transform(
        &mut self,
        store: &mut ComponentStore,
        fields: TransformFields,
    ) -> Result<(), InspectorError> {
        let entity = self.require_selection(store)?;
        let transform = store
            .get_mut::<Transform>(entity)
            .ok_or(InspectorError::MissingComponent {
                entity,
                kind: ComponentKind::Transform,
            })?;
        transform.set_matrix(fields.to_transform().matrix())?;
        Ok(())
    }

    pub fn reset_scale(&mut self, store: &mut ComponentStore) -> Result<(), InspectorError> {
        let mut fields = self.transform_fields(store)?;
        fields.reset_scale();
        self.apply_transform(store, fields)
    }

    pub fn make_scale_uniform(&mut self, store: &mut ComponentStore) -> Result<(), InspectorError> {
        let mut fields = self.transform_fields(store)?;
        fields.make_uniform();
        self.apply_transform(store, fields)
    }

    /// Sections shown for the selection. Empty without a selection.
    pub fn component_sections(&self, store: &ComponentStore) -> Vec<ComponentKind> {
        let Some(entity) = self.selection(store) else {
            return Vec::new();
        };
        let present = store.kinds_of(entity);
        SECTIONS
            .iter()
            .copied()
            .filter(|kind| present.contains(kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    #[test]
    fn create_empty_entity_and_light() {
        let mut store = ComponentStore::new();
        let mut inspector = SceneInspector::new();
        let empty = inspector.create_empty_entity(&mut store).unwrap();
        let light = inspector.create_light(&mut store).unwrap();

        assert_eq!(store.get::<EntityInfo>(empty).unwrap().name(), "Empty");
        assert_eq!(store.get::<Transform>(empty), Some(&Transform::IDENTITY));
        assert!(!store.has::<Light>(empty));
        assert_eq!(store.get::<EntityInfo>(light).unwrap().name(), "Light");
        assert_eq!(store.get::<Light>(light), Some(&Light::default()));
    }

    #[test]
    fn entity_list_labels_and_selection() {
        let mut store = ComponentStore::new();
        let mut inspector = SceneInspector::new();
        let unnamed = store.create();
        let a = inspector.create_empty_entity(&mut store).unwrap();
        let b = inspector.create_light(&mut store).unwrap();
        inspector.select(&store, b).unwrap();

        let list = inspector.entity_list(&store);
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|item| item.entity != unnamed));
        assert_eq!(list[0].label, format!("Empty#{}", a.index()));
        assert!(!list[0].selected);
        assert_eq!(list[1].label, format!("Light#{}", b.index()));
        assert!(list[1].selected);
    }

    #[test]
    fn select_unknown_entity_fails() {
        let store = ComponentStore::new();
        let mut inspector = SceneInspector::new();
        assert_eq!(
            inspector.select(&store, EntityId(42)),
            Err(InspectorError::UnknownEntity(EntityId(42)))
        );
    }

    #[test]
    fn actions_need_a_selection() {
        let mut store = ComponentStore::new();
        let mut inspector = SceneInspector::new();
        assert_eq!(
            inspector.attach_area_light(&mut store),
            Err(InspectorError::NoSelection)
        );
        assert_eq!(
            inspector.rename(&mut store, "x"),
            Err(InspectorError::NoSelection)
        );
        assert!(inspector.component_sections(&store).is_empty());
    }

    #[test]
    fn attach_area_light_to_selection() {
        let mut store = ComponentStore::new();
        let mut inspector = SceneInspector::new();
        let entity = inspector.create_empty_entity(&mut store).unwrap();
        inspector.select(&store, entity).unwrap();
        inspector.attach_area_light(&mut store).unwrap();
        assert_eq!(store.get::<AreaLight>(entity), Some(&AreaLight::default()));
        assert_eq!(
            inspector.component_sections(&store),
            vec![
                ComponentKind::EntityInfo,
                ComponentKind::Transform,
                ComponentKind::AreaLight
            ]
        );
    }

    #[test]
    fn rename_selection() {
        let mut store = ComponentStore::new();
        let mut inspector = SceneInspector::new();
        let entity = inspector.create_light(&mut store).unwrap();
        inspector.select(&store, entity).unwrap();
        inspector.rename(&mut store, "Sun").unwrap();
        assert_eq!(store.get::<EntityInfo>(entity).unwrap().name(), "Sun");
    }

    #[test]
    fn rename_without_entity_info_fails() {
        let mut store = ComponentStore::new();
        let mut inspector = SceneInspector::new();
        let entity = store.create();
        inspector.select(&store, entity).unwrap();
        assert!(matches!(
            inspector.rename(&mut store, "x"),
            Err(InspectorError::MissingComponent {
                kind: ComponentKind::EntityInfo,
                ..
            })
        ));
    }

    #[test]
    fn transform_edit_writes_translate_times_scale() {
        let mut store = ComponentStore::new();
        let mut inspector = SceneInspector::new();
        let entity = inspector.create_empty_entity(&mut store).unwrap();
        let rotated = Transform::from_scale_rotation_translation(
            Vec3::new(2.0, 3.0, 4.0),
            Quat::from_rotation_y(0.7),
            Vec3::new(1.0, 2.0, 3.0),
        );
        store.assign(entity, rotated).unwrap();
        inspector.select(&store, entity).unwrap();

        let mut fields = inspector.transform_fields(&store).unwrap();
        assert!(approx(fields.position, Vec3::new(1.0, 2.0, 3.0)));
        assert!(approx(fields.scale, Vec3::new(2.0, 3.0, 4.0)));

        fields.position = Vec3::new(5.0, 0.0, 0.0);
        inspector.apply_transform(&mut store, fields).unwrap();
        let written = store.get::<Transform>(entity).unwrap();
        let (scale, rotation, position) = written.decompose();
        assert!(approx(position, Vec3::new(5.0, 0.0, 0.0)));
        assert!(approx(scale, Vec3::new(2.0, 3.0, 4.0)));
        assert!(rotation.abs_diff_eq(Quat::IDENTITY, 1e-5));
    }

    #[test]
    fn reset_and_uniform_scale() {
        let mut store = ComponentStore::new();
        let mut inspector = SceneInspector::new();
        let entity = inspector.create_empty_entity(&mut store).unwrap();
        store
            .assign(
                entity,
                Transform::from_translation_scale(Vec3::ONE, Vec3::new(2.0, 5.0, 7.0)),
            )
            .unwrap();
        inspector.select(&store, entity).unwrap();

        inspector.make_scale_uniform(&mut store).unwrap();
        let (scale, _, position) = store.get::<Transform>(entity).unwrap().decompose();
        assert!(approx(scale, Vec3::splat(2.0)));
        assert!(approx(position, Vec3::ONE));

        inspector.reset_scale(&mut store).unwrap();
        let (scale, _, _) = store.get::<Transform>(entity).unwrap().decompose();
        assert!(approx(scale, Vec3::ONE));
    }

    #[test]
    fn edited_scale_is_clamped() {
        let fields = TransformFields {
            position: Vec3::ZERO,
            scale: Vec3::new(0.0, 5000.0, 1.0),
        };
        let (scale, _, _) = fields.to_transform().decompose();
        assert!(approx(scale, Vec3::new(MIN_EDIT_SCALE, MAX_EDIT_SCALE, 1.0)));
    }

    #[test]
    fn delete_clears_selection() {
        let mut store = ComponentStore::new();
        let mut inspector = SceneInspector::new();
        let entity = inspector.create_light(&mut store).unwrap();
        inspector.select(&store, entity).unwrap();
        assert_eq!(inspector.delete_selected(&mut store), Ok(entity));
        assert!(!store.contains(entity));
        assert_eq!(inspector.selection(&store), None);
    }

    #[test]
    fn summary_counts() {
        let mut store = ComponentStore::new();
        let mut inspector = SceneInspector::new();
        inspector.create_light(&mut store).unwrap();
        inspector.create_empty_entity(&mut store).unwrap();
        let summary = SceneInspector::summary(&store);
        assert_eq!(summary.entity_count, 2);
        assert_eq!(summary.lights, 1);
        assert!(summary.to_string().contains("entities=2"));
    }
}
