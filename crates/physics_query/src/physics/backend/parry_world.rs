//! parry3d-backed physics world
//!
//! A small collision world whose native objects live in slot maps, with a hard
//! cap on how many may be alive at once. Narrow phase is done by parry3d:
//! `RayCast::cast_ray` for rays and `query::time_of_impact` for sweeps. There is
//! no broad phase; every collider is tested.
//!
//! # Example
//!
//! ```no_run
//! use physics_query::config::WorldConfig;
//! use physics_query::foundation::math::Vec3;
//! use physics_query::physics::backend::{ParryWorld, PhysicsBackend};
//!
//! let mut world = ParryWorld::new(&WorldConfig::default());
//! world.add_static_box(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
//!
//! let start = world.create_point().unwrap();
//! let end = world.create_point().unwrap();
//! let result = world.create_ray_result().unwrap();
//! world.set_point(start, &Vec3::new(0.0, 0.0, 5.0)).unwrap();
//! world.set_point(end, &Vec3::new(0.0, 0.0, -5.0)).unwrap();
//! world.ray_test(start, end, result, None).unwrap();
//! assert!(world.ray_result(result).unwrap().hit_body.is_some());
//! ```

use super::{
    BackendError, BodyHandle, NativeStats, PhysicsBackend, PointHandle, PoseHandle, RayResultData,
    RayResultHandle, ShapeHandle, SweepResultData, SweepResultHandle, VectorHandle,
};
use crate::config::WorldConfig;
use crate::foundation::math::{Isometry3, Point3, Pose, Quat, Translation3, Vec3};
use parry3d::query::{self, Ray, RayCast, TOIStatus};
use parry3d::shape::Cuboid;
use slotmap::{Key, SlotMap};

pub use parry3d::shape::SharedShape;

/// Rigid body as seen by queries: a pose and an optional collider
#[derive(Clone)]
struct Body {
    pose: Isometry3<f32>,
    collider: Option<SharedShape>,
}

/// parry3d collision world with manually managed native handles
pub struct ParryWorld {
    bodies: SlotMap<BodyHandle, Body>,

    points: SlotMap<PointHandle, Point3>,
    poses: SlotMap<PoseHandle, Isometry3<f32>>,
    vectors: SlotMap<VectorHandle, Vec3>,
    shapes: SlotMap<ShapeHandle, Cuboid>,
    ray_results: SlotMap<RayResultHandle, RayResultData>,
    sweep_results: SlotMap<SweepResultHandle, SweepResultData>,

    /// Maximum live native handles
    capacity: usize,
    stats: NativeStats,
}

impl std::fmt::Debug for ParryWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParryWorld")
            .field("bodies", &self.bodies.len())
            .field("capacity", &self.capacity)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Insert into a native arena, enforcing the shared capacity
fn allocate<K: Key, V>(
    arena: &mut SlotMap<K, V>,
    stats: &mut NativeStats,
    capacity: usize,
    value: V,
) -> Result<K, BackendError> {
    if stats.live() >= capacity as u64 {
        return Err(BackendError::OutOfHandles { capacity });
    }
    stats.allocated += 1;
    Ok(arena.insert(value))
}

/// Remove from a native arena; releasing twice is a stale-handle error
fn release<K: Key, V>(
    arena: &mut SlotMap<K, V>,
    stats: &mut NativeStats,
    key: K,
    kind: &'static str,
) -> Result<(), BackendError> {
    arena.remove(key).ok_or(BackendError::StaleHandle(kind))?;
    stats.released += 1;
    Ok(())
}

impl ParryWorld {
    /// Create an empty world
    pub fn new(config: &WorldConfig) -> Self {
        log::debug!(
            "Creating parry world (native handle capacity {})",
            config.native_handle_capacity
        );
        Self {
            bodies: SlotMap::with_key(),
            points: SlotMap::with_key(),
            poses: SlotMap::with_key(),
            vectors: SlotMap::with_key(),
            shapes: SlotMap::with_key(),
            ray_results: SlotMap::with_key(),
            sweep_results: SlotMap::with_key(),
            capacity: config.native_handle_capacity,
            stats: NativeStats::default(),
        }
    }

    /// Add a body at `position` with an optional collider
    pub fn add_body(&mut self, position: Vec3, collider: Option<SharedShape>) -> BodyHandle {
        self.add_body_with_pose(Pose::from_position(position), collider)
    }

    /// Add a body with a full pose and an optional collider
    pub fn add_body_with_pose(&mut self, pose: Pose, collider: Option<SharedShape>) -> BodyHandle {
        self.bodies.insert(Body {
            pose: pose.to_isometry(),
            collider,
        })
    }

    /// Add an axis-aligned static box collider
    pub fn add_static_box(&mut self, center: Vec3, half_extents: Vec3) -> BodyHandle {
        let collider = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        self.add_body(center, Some(collider))
    }

    /// Move a body, keeping its orientation
    pub fn set_body_position(&mut self, body: BodyHandle, position: Vec3) -> Result<(), BackendError> {
        let body = self.bodies.get_mut(body).ok_or(BackendError::UnknownBody)?;
        body.pose.translation = Translation3::from(position);
        Ok(())
    }

    /// Replace a body's pose
    pub fn set_body_pose(&mut self, body: BodyHandle, pose: Pose) -> Result<(), BackendError> {
        let body = self.bodies.get_mut(body).ok_or(BackendError::UnknownBody)?;
        body.pose = pose.to_isometry();
        Ok(())
    }

    /// Current pose of a body
    pub fn body_pose(&self, body: BodyHandle) -> Result<Pose, BackendError> {
        self.bodies
            .get(body)
            .map(|b| Pose::from_isometry(&b.pose))
            .ok_or(BackendError::UnknownBody)
    }

    /// Remove a body from the world
    pub fn remove_body(&mut self, body: BodyHandle) -> Result<(), BackendError> {
        self.bodies.remove(body).map(|_| ()).ok_or(BackendError::UnknownBody)
    }

    /// Number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Configured native handle capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn point(&self, point: PointHandle) -> Result<Point3, BackendError> {
        self.points.get(point).copied().ok_or(BackendError::StaleHandle("point"))
    }

    fn pose(&self, pose: PoseHandle) -> Result<Isometry3<f32>, BackendError> {
        self.poses.get(pose).copied().ok_or(BackendError::StaleHandle("pose"))
    }

    fn vector(&self, vector: VectorHandle) -> Result<Vec3, BackendError> {
        self.vectors.get(vector).copied().ok_or(BackendError::StaleHandle("vector"))
    }
}

impl PhysicsBackend for ParryWorld {
    fn create_point(&mut self) -> Result<PointHandle, BackendError> {
        allocate(&mut self.points, &mut self.stats, self.capacity, Point3::origin())
    }

    fn set_point(&mut self, point: PointHandle, value: &Vec3) -> Result<(), BackendError> {
        let slot = self.points.get_mut(point).ok_or(BackendError::StaleHandle("point"))?;
        *slot = Point3::from(*value);
        Ok(())
    }

    fn destroy_point(&mut self, point: PointHandle) -> Result<(), BackendError> {
        release(&mut self.points, &mut self.stats, point, "point")
    }

    fn create_pose(&mut self) -> Result<PoseHandle, BackendError> {
        allocate(&mut self.poses, &mut self.stats, self.capacity, Isometry3::identity())
    }

    fn set_pose(&mut self, pose: PoseHandle, origin: &Vec3, rotation: &Quat) -> Result<(), BackendError> {
        let slot = self.poses.get_mut(pose).ok_or(BackendError::StaleHandle("pose"))?;
        *slot = Isometry3::from_parts(Translation3::from(*origin), *rotation);
        Ok(())
    }

    fn set_pose_from_vector(
        &mut self,
        pose: PoseHandle,
        origin: VectorHandle,
        rotation: &Quat,
    ) -> Result<(), BackendError> {
        let origin = self.vector(origin)?;
        self.set_pose(pose, &origin, rotation)
    }

    fn destroy_pose(&mut self, pose: PoseHandle) -> Result<(), BackendError> {
        release(&mut self.poses, &mut self.stats, pose, "pose")
    }

    fn create_vector(&mut self) -> Result<VectorHandle, BackendError> {
        allocate(&mut self.vectors, &mut self.stats, self.capacity, Vec3::zeros())
    }

    fn set_vector(&mut self, vector: VectorHandle, value: &Vec3) -> Result<(), BackendError> {
        let slot = self.vectors.get_mut(vector).ok_or(BackendError::StaleHandle("vector"))?;
        *slot = *value;
        Ok(())
    }

    fn destroy_vector(&mut self, vector: VectorHandle) -> Result<(), BackendError> {
        release(&mut self.vectors, &mut self.stats, vector, "vector")
    }

    fn create_box_shape(&mut self, half_extents: VectorHandle) -> Result<ShapeHandle, BackendError> {
        let half_extents = self.vector(half_extents)?;
        allocate(&mut self.shapes, &mut self.stats, self.capacity, Cuboid::new(half_extents))
    }

    fn destroy_shape(&mut self, shape: ShapeHandle) -> Result<(), BackendError> {
        release(&mut self.shapes, &mut self.stats, shape, "shape")
    }

    fn create_ray_result(&mut self) -> Result<RayResultHandle, BackendError> {
        allocate(&mut self.ray_results, &mut self.stats, self.capacity, RayResultData::default())
    }

    fn reset_ray_result(&mut self, result: RayResultHandle, hit_fraction: f32) -> Result<(), BackendError> {
        let slot = self.ray_results.get_mut(result).ok_or(BackendError::StaleHandle("ray result"))?;
        *slot = RayResultData {
            hit_fraction,
            hit_body: None,
        };
        Ok(())
    }

    fn ray_result(&self, result: RayResultHandle) -> Result<RayResultData, BackendError> {
        self.ray_results.get(result).copied().ok_or(BackendError::StaleHandle("ray result"))
    }

    fn destroy_ray_result(&mut self, result: RayResultHandle) -> Result<(), BackendError> {
        release(&mut self.ray_results, &mut self.stats, result, "ray result")
    }

    fn create_sweep_result(&mut self) -> Result<SweepResultHandle, BackendError> {
        allocate(&mut self.sweep_results, &mut self.stats, self.capacity, SweepResultData::default())
    }

    fn reset_sweep_result(&mut self, result: SweepResultHandle, hit_fraction: f32) -> Result<(), BackendError> {
        let slot = self
            .sweep_results
            .get_mut(result)
            .ok_or(BackendError::StaleHandle("sweep result"))?;
        *slot = SweepResultData {
            hit_fraction,
            hit_body: None,
        };
        Ok(())
    }

    fn sweep_result(&self, result: SweepResultHandle) -> Result<SweepResultData, BackendError> {
        self.sweep_results
            .get(result)
            .copied()
            .ok_or(BackendError::StaleHandle("sweep result"))
    }

    fn destroy_sweep_result(&mut self, result: SweepResultHandle) -> Result<(), BackendError> {
        release(&mut self.sweep_results, &mut self.stats, result, "sweep result")
    }

    fn body_origin(&self, body: BodyHandle) -> Result<Vec3, BackendError> {
        self.bodies
            .get(body)
            .map(|b| b.pose.translation.vector)
            .ok_or(BackendError::UnknownBody)
    }

    fn ray_test(
        &mut self,
        start: PointHandle,
        end: PointHandle,
        result: RayResultHandle,
        exclude: Option<BodyHandle>,
    ) -> Result<(), BackendError> {
        let start = self.point(start)?;
        let end = self.point(end)?;
        // The record's current fraction bounds the search, as a closest-hit callback would.
        let mut closest = self.ray_result(result)?;

        // Direction is not normalized: time of impact is then a fraction of the segment.
        let ray = Ray::new(start, end - start);
        for (handle, body) in &self.bodies {
            if exclude == Some(handle) {
                continue;
            }
            let Some(collider) = &body.collider else {
                continue;
            };
            if let Some(toi) = collider.cast_ray(&body.pose, &ray, closest.hit_fraction, true) {
                if closest.hit_body.is_none() || toi < closest.hit_fraction {
                    closest = RayResultData {
                        hit_fraction: toi,
                        hit_body: Some(handle),
                    };
                }
            }
        }

        self.ray_results[result] = closest;
        Ok(())
    }

    fn convex_sweep_test(
        &mut self,
        shape: ShapeHandle,
        start: PoseHandle,
        end: PoseHandle,
        result: SweepResultHandle,
        allowed_penetration: f32,
    ) -> Result<(), BackendError> {
        let cuboid = *self.shapes.get(shape).ok_or(BackendError::StaleHandle("shape"))?;
        let start = self.pose(start)?;
        let end = self.pose(end)?;
        let mut closest = self.sweep_result(result)?;

        let displacement = end.translation.vector - start.translation.vector;
        let at_rest = Vec3::zeros();
        for (handle, body) in &self.bodies {
            let Some(collider) = &body.collider else {
                continue;
            };
            let toi = query::time_of_impact(
                &start,
                &displacement,
                &cuboid,
                &body.pose,
                &at_rest,
                &**collider,
                closest.hit_fraction,
                true,
            )
            .map_err(|e| BackendError::Unsupported(format!("{e:?}")))?;

            let Some(toi) = toi else {
                continue;
            };
            // A shallow starting overlap is ignored only while the motion leaves it;
            // `normal1` points from the swept box toward the collider.
            if matches!(toi.status, TOIStatus::Penetrating) && allowed_penetration > 0.0 {
                let leaving = query::contact(&start, &cuboid, &body.pose, &**collider, 0.0)
                    .map_err(|e| BackendError::Unsupported(format!("{e:?}")))?
                    .map_or(true, |contact| {
                        -contact.dist <= allowed_penetration && contact.normal1.dot(&displacement) <= 0.0
                    });
                if leaving {
                    continue;
                }
            }
            if closest.hit_body.is_none() || toi.toi < closest.hit_fraction {
                closest = SweepResultData {
                    hit_fraction: toi.toi.clamp(0.0, 1.0),
                    hit_body: Some(handle),
                };
            }
        }

        self.sweep_results[result] = closest;
        Ok(())
    }

    fn native_stats(&self) -> NativeStats {
        self.stats
    }
}
