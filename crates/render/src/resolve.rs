//! Selection of the frame's camera and light.
//!
//! Candidates are visited in store iteration order, which is ascending
//! `EntityId` (creation order). That order is what "last" means below.

use glam::Mat4;
use lumen_common::{EntityId, Transform};
use lumen_ecs::{Active, Component, ComponentStore, Light, ProjectionCamera};
use serde::{Deserialize, Serialize};

/// How a single camera or light is chosen among several candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// The last candidate in iteration order wins.
    #[default]
    LastVisited,
    /// More than one candidate is an error.
    Strict,
    /// The single candidate carrying `Active` wins. With no tagged candidate
    /// this falls back to `LastVisited`.
    Tagged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Camera,
    Light,
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Camera => write!(f, "camera"),
            Self::Light => write!(f, "light"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("{count} {subject} candidates under the strict policy")]
    Ambiguous { subject: Subject, count: usize },
    #[error("{count} {subject} entities are tagged active")]
    MultipleActive { subject: Subject, count: usize },
}

/// View and projection for the frame. Identity when there is no camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedCamera {
    pub entity: Option<EntityId>,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Default for ResolvedCamera {
    fn default() -> Self {
        Self {
            entity: None,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }
}

/// Light for the frame. A zero-colour light when the scene has none.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLight {
    pub entity: Option<EntityId>,
    pub transform: Transform,
    pub light: Light,
}

impl Default for ResolvedLight {
    fn default() -> Self {
        Self {
            entity: None,
            transform: Transform::IDENTITY,
            light: Light::OFF,
        }
    }
}

pub fn resolve_camera(
    store: &ComponentStore,
    policy: ResolutionPolicy,
) -> Result<ResolvedCamera, ResolveError> {
    let selected = select::<ProjectionCamera>(store, policy, Subject::Camera)?;
    Ok(match selected {
        Some((entity, transform, camera)) => ResolvedCamera {
            entity: Some(entity),
            view: transform.inverse(),
            projection: camera.projection_matrix(),
        },
        None => ResolvedCamera::default(),
    })
}

pub fn resolve_light(
    store: &ComponentStore,
    policy: ResolutionPolicy,
) -> Result<ResolvedLight, ResolveError> {
    let selected = select::<Light>(store, policy, Subject::Light)?;
    Ok(match selected {
        Some((entity, transform, light)) => ResolvedLight {
            entity: Some(entity),
            transform: *transform,
            light: *light,
        },
        None => ResolvedLight::default(),
    })
}

type Candidate<'a, C> = (EntityId, &'a Transform, &'a C);

fn select<'a, C: Component>(
    store: &'a ComponentStore,
    policy: ResolutionPolicy,
    subject: Subject,
) -> Result<Option<Candidate<'a, C>>, ResolveError> {
    let candidates: Vec<Candidate<'a, C>> = store.query::<Transform, C>().collect();
    let count = candidates.len();

    match policy {
        ResolutionPolicy::LastVisited => {
            if count > 1 {
                tracing::debug!(%subject, count, "several candidates, last visited wins");
            }
            Ok(candidates.last().copied())
        }
        ResolutionPolicy::Strict => {
            if count > 1 {
                return Err(ResolveError::Ambiguous { subject, count });
            }
            Ok(candidates.first().copied())
        }
        ResolutionPolicy::Tagged => {
            let tagged: Vec<Candidate<'a, C>> = candidates
                .iter()
                .copied()
                .filter(|(entity, _, _)| store.has::<Active>(*entity))
                .collect();
            match tagged.len() {
                0 => {
                    if count > 0 {
                        tracing::debug!(
                            %subject,
                            count,
                            "no active-tagged candidate, falling back to last visited"
                        );
                    }
                    Ok(candidates.last().copied())
                }
                1 => Ok(tagged.first().copied()),
                n => Err(ResolveError::MultipleActive { subject, count: n }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn camera_at(store: &mut ComponentStore, z: f32) -> EntityId {
        let entity = store.create();
        store
            .assign(entity, Transform::from_translation(Vec3::new(0.0, 0.0, z)))
            .unwrap();
        store.assign(entity, ProjectionCamera::default()).unwrap();
        entity
    }

    fn light_at(store: &mut ComponentStore, color: Vec3) -> EntityId {
        let entity = store.create();
        store
            .assign(entity, Transform::from_translation(color * 10.0))
            .unwrap();
        store.assign(entity, Light::new(color)).unwrap();
        entity
    }

    #[test]
    fn empty_scene_resolves_to_defaults() {
        let store = ComponentStore::new();
        for policy in [
            ResolutionPolicy::LastVisited,
            ResolutionPolicy::Strict,
            ResolutionPolicy::Tagged,
        ] {
            assert_eq!(
                resolve_camera(&store, policy).unwrap(),
                ResolvedCamera::default()
            );
            let light = resolve_light(&store, policy).unwrap();
            assert_eq!(light.light.color(), Vec3::ZERO);
            assert_eq!(light.entity, None);
        }
    }

    #[test]
    fn single_camera_uses_inverse_transform() {
        let mut store = ComponentStore::new();
        let entity = camera_at(&mut store, 5.0);
        let resolved = resolve_camera(&store, ResolutionPolicy::Strict).unwrap();
        assert_eq!(resolved.entity, Some(entity));
        assert!(resolved
            .view
            .abs_diff_eq(Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)), 1e-6));
        assert_eq!(
            resolved.projection,
            ProjectionCamera::default().projection_matrix()
        );
    }

    #[test]
    fn last_created_camera_wins() {
        let mut store = ComponentStore::new();
        camera_at(&mut store, 1.0);
        let second = camera_at(&mut store, 2.0);
        let resolved = resolve_camera(&store, ResolutionPolicy::LastVisited).unwrap();
        assert_eq!(resolved.entity, Some(second));
    }

    #[test]
    fn last_created_light_wins() {
        let mut store = ComponentStore::new();
        light_at(&mut store, Vec3::X);
        let second = light_at(&mut store, Vec3::Y);
        let resolved = resolve_light(&store, ResolutionPolicy::LastVisited).unwrap();
        assert_eq!(resolved.entity, Some(second));
        assert_eq!(resolved.light.color(), Vec3::Y);
        assert_eq!(resolved.transform.position(), Vec3::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn strict_rejects_duplicates() {
        let mut store = ComponentStore::new();
        camera_at(&mut store, 1.0);
        camera_at(&mut store, 2.0);
        assert_eq!(
            resolve_camera(&store, ResolutionPolicy::Strict),
            Err(ResolveError::Ambiguous {
                subject: Subject::Camera,
                count: 2
            })
        );
    }

    #[test]
    fn tagged_prefers_active_entity() {
        let mut store = ComponentStore::new();
        let first = light_at(&mut store, Vec3::X);
        light_at(&mut store, Vec3::Y);
        store.assign(first, Active).unwrap();
        let resolved = resolve_light(&store, ResolutionPolicy::Tagged).unwrap();
        assert_eq!(resolved.entity, Some(first));
    }

    #[test]
    fn tagged_without_tags_falls_back() {
        let mut store = ComponentStore::new();
        camera_at(&mut store, 1.0);
        let second = camera_at(&mut store, 2.0);
        let resolved = resolve_camera(&store, ResolutionPolicy::Tagged).unwrap();
        assert_eq!(resolved.entity, Some(second));
    }

    #[test]
    fn tagged_rejects_multiple_active() {
        let mut store = ComponentStore::new();
        for z in [1.0, 2.0] {
            let entity = camera_at(&mut store, z);
            store.assign(entity, Active).unwrap();
        }
        assert!(matches!(
            resolve_camera(&store, ResolutionPolicy::Tagged),
            Err(ResolveError::MultipleActive { count: 2, .. })
        ));
    }

    #[test]
    fn policy_serializes_snake_case() {
        let json = serde_json::to_string(&ResolutionPolicy::LastVisited).unwrap();
        assert_eq!(json, "\"last_visited\"");
    }
}
