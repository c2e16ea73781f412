//! Static scene geometry for gaze ray casts
//!
//! The experiment room is immutable during replay, so it is built once into a
//! Rapier query world: fixed bodies with attached colliders, broad and narrow
//! phases initialized by a single collision-detection step, and borrowed
//! [`QueryPipeline`] views for each cast.

use crate::config::SceneLayout;
use crate::types::Vec3;
use rapier3d::na::{Point3, Translation3, UnitQuaternion};
use rapier3d::prelude::*;

/// First-hit ray queries against static geometry
#[cfg_attr(test, mockall::automock)]
pub trait Raycaster {
    /// World-space point where the ray from `origin` along `direction` first
    /// hits the scene, or `None` when nothing is hit
    fn raycast(&self, origin: Vec3, direction: Vec3) -> Option<Vec3>;
}

/// Supported static collider shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StaticShape {
    /// Infinite plane through the collider translation; geometry is on the
    /// side opposite the normal
    Plane { normal: Vec3 },
    /// Axis-aligned box with the given half-extents
    Cuboid { half_extents: Vec3 },
}

/// One immutable scene collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticCollider {
    /// Stable id, used for deterministic insertion order
    pub id: u32,
    /// World-space center (or a point on the plane)
    pub translation: Vec3,
    /// Collider shape
    pub shape: StaticShape,
}

impl StaticCollider {
    fn to_collider(self) -> Collider {
        match self.shape {
            StaticShape::Plane { normal } => {
                let unit_n = UnitVector::new_normalize(normal);
                ColliderBuilder::new(SharedShape::new(HalfSpace::new(unit_n))).build()
            }
            StaticShape::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).build()
            }
        }
    }
}

/// Colliders for the experiment room: floor, ceiling, four walls, the table,
/// and the two sorting bins
pub fn room_colliders(layout: &SceneLayout) -> Vec<StaticCollider> {
    let [hx, hy, hz] = layout.room_half_extents;
    let plane = |id, translation, normal| StaticCollider {
        id,
        translation,
        shape: StaticShape::Plane { normal },
    };

    let table = layout.table();
    let bin_half = Vec3::new(0.25, layout.box_height / 2.0, 0.25);
    let bin_lift = Vec3::new(0.0, layout.box_height / 2.0, 0.0);

    vec![
        plane(0, Vec3::zeros(), Vec3::y()),
        plane(1, Vec3::new(0.0, 2.0 * hy, 0.0), -Vec3::y()),
        plane(2, Vec3::new(-hx, 0.0, 0.0), Vec3::x()),
        plane(3, Vec3::new(hx, 0.0, 0.0), -Vec3::x()),
        plane(4, Vec3::new(0.0, 0.0, -hz), Vec3::z()),
        plane(5, Vec3::new(0.0, 0.0, hz), -Vec3::z()),
        StaticCollider {
            id: 6,
            translation: table,
            shape: StaticShape::Cuboid {
                half_extents: Vec3::new(0.6, layout.table_height / 2.0, 0.4),
            },
        },
        StaticCollider {
            id: 7,
            translation: layout.cube_bin() + bin_lift,
            shape: StaticShape::Cuboid {
                half_extents: bin_half,
            },
        },
        StaticCollider {
            id: 8,
            translation: layout.sphere_bin() + bin_lift,
            shape: StaticShape::Cuboid {
                half_extents: bin_half,
            },
        },
    ]
}

/// Rapier query world over immutable scene geometry
pub struct StaticScene {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    max_distance: f32,
}

impl StaticScene {
    /// Build the experiment room from a scene layout
    pub fn from_layout(layout: &SceneLayout) -> Self {
        Self::build(room_colliders(layout), layout.gaze_max_distance)
    }

    /// Build a query world from static collider definitions
    pub fn build(mut defs: Vec<StaticCollider>, max_distance: f32) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        for def in defs {
            let iso = Isometry::from_parts(
                Translation3::from(def.translation),
                UnitQuaternion::identity(),
            );
            let body = bodies.insert(RigidBodyBuilder::fixed().pose(iso).build());
            colliders.insert_with_parent(def.to_collider(), body, &mut bodies);
        }

        // Collision detection only, no dynamics: fills the broad-phase BVH
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        let mut pipeline = CollisionPipeline::new();
        pipeline.step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &(),
            &(),
        );

        tracing::debug!("Static scene built with {} colliders", colliders.len());

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
            max_distance,
        }
    }

    /// Number of colliders in the scene
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Longest ray cast
    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    fn query_pipeline(&self) -> QueryPipeline<'_> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            QueryFilter::default(),
        )
    }
}

impl Raycaster for StaticScene {
    fn raycast(&self, origin: Vec3, direction: Vec3) -> Option<Vec3> {
        let direction = direction.try_normalize(1.0e-6)?;
        let ray = Ray::new(Point3::from(origin), direction);
        let (_handle, toi) = self
            .query_pipeline()
            .cast_ray(&ray, self.max_distance, true)?;
        Some(ray.point_at(toi).coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(a: Vec3, b: Vec3) {
        assert!((a - b).norm() < 1e-4, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_room_has_all_colliders() {
        let scene = StaticScene::from_layout(&SceneLayout::default());
        assert_eq!(scene.collider_count(), 9);
    }

    #[test]
    fn test_ray_hits_floor() {
        let scene = StaticScene::from_layout(&SceneLayout::default());
        let hit = scene
            .raycast(Vec3::new(-3.0, 2.0, -3.0), -Vec3::y())
            .unwrap();
        assert_near(hit, Vec3::new(-3.0, 0.0, -3.0));
    }

    #[test]
    fn test_ray_hits_far_wall() {
        let scene = StaticScene::from_layout(&SceneLayout::default());
        let hit = scene
            .raycast(Vec3::new(0.0, 3.0, 0.0), Vec3::z())
            .unwrap();
        assert_near(hit, Vec3::new(0.0, 3.0, 5.0));
    }

    #[test]
    fn test_ray_hits_table_top() {
        let scene = StaticScene::from_layout(&SceneLayout::default());
        let hit = scene
            .raycast(Vec3::new(0.0, 2.0, 0.75), -Vec3::y())
            .unwrap();
        assert_near(hit, Vec3::new(0.0, 1.05, 0.75));
    }

    #[test]
    fn test_open_scene_misses() {
        let scene = StaticScene::build(Vec::new(), 100.0);
        assert!(scene.raycast(Vec3::zeros(), Vec3::z()).is_none());
        assert!(scene.raycast(Vec3::zeros(), Vec3::zeros()).is_none());
    }

    #[test]
    fn test_max_distance_limits_hits() {
        let defs = vec![StaticCollider {
            id: 0,
            translation: Vec3::new(0.0, 0.0, 10.0),
            shape: StaticShape::Plane { normal: -Vec3::z() },
        }];
        assert!(StaticScene::build(defs.clone(), 5.0)
            .raycast(Vec3::zeros(), Vec3::z())
            .is_none());
        assert!(StaticScene::build(defs, 20.0)
            .raycast(Vec3::zeros(), Vec3::z())
            .is_some());
    }
}
