//! Shared fixtures for facade tests

use crate::config::{QueryConfig, WorldConfig};
use crate::foundation::math::{Quat, Vec3};
use crate::physics::backend::{
    BackendError, BodyHandle, NativeStats, ParryWorld, PhysicsBackend, PointHandle, PoseHandle,
    RayResultData, RayResultHandle, ShapeHandle, SweepResultData, SweepResultHandle, VectorHandle,
};
use crate::physics::PhysicsQueries;

/// Unit box (half extent 1) at the origin plus a collider-less probe body at (0, 0, 5)
pub fn unit_box_world(config: &WorldConfig) -> (ParryWorld, BodyHandle, BodyHandle) {
    let mut world = ParryWorld::new(config);
    let block = world.add_static_box(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
    let probe = world.add_body(Vec3::new(0.0, 0.0, 5.0), None);
    (world, block, probe)
}

/// Ready facade over [`unit_box_world`]
pub fn ready_queries() -> (PhysicsQueries<ParryWorld>, BodyHandle, BodyHandle) {
    let (world, block, probe) = unit_box_world(&WorldConfig::default());
    let mut queries = PhysicsQueries::new(QueryConfig::default());
    assert!(queries.initialize(world).unwrap().is_none());
    (queries, block, probe)
}

pub fn down() -> Vec3 {
    Vec3::new(0.0, 0.0, -1.0)
}

/// World whose sweeps can be made to fail after the shape was created
#[derive(Debug)]
pub struct FaultyWorld {
    pub inner: ParryWorld,
    pub fail_sweeps: bool,
}

impl FaultyWorld {
    pub fn new(inner: ParryWorld) -> Self {
        Self { inner, fail_sweeps: false }
    }
}

impl PhysicsBackend for FaultyWorld {
    fn create_point(&mut self) -> Result<PointHandle, BackendError> {
        self.inner.create_point()
    }

    fn set_point(&mut self, point: PointHandle, value: &Vec3) -> Result<(), BackendError> {
        self.inner.set_point(point, value)
    }

    fn destroy_point(&mut self, point: PointHandle) -> Result<(), BackendError> {
        self.inner.destroy_point(point)
    }

    fn create_pose(&mut self) -> Result<PoseHandle, BackendError> {
        self.inner.create_pose()
    }

    fn set_pose(&mut self, pose: PoseHandle, origin: &Vec3, rotation: &Quat) -> Result<(), BackendError> {
        self.inner.set_pose(pose, origin, rotation)
    }

    fn set_pose_from_vector(
        &mut self,
        pose: PoseHandle,
        origin: VectorHandle,
        rotation: &Quat,
    ) -> Result<(), BackendError> {
        self.inner.set_pose_from_vector(pose, origin, rotation)
    }

    fn destroy_pose(&mut self, pose: PoseHandle) -> Result<(), BackendError> {
        self.inner.destroy_pose(pose)
    }

    fn create_vector(&mut self) -> Result<VectorHandle, BackendError> {
        self.inner.create_vector()
    }

    fn set_vector(&mut self, vector: VectorHandle, value: &Vec3) -> Result<(), BackendError> {
        self.inner.set_vector(vector, value)
    }

    fn destroy_vector(&mut self, vector: VectorHandle) -> Result<(), BackendError> {
        self.inner.destroy_vector(vector)
    }

    fn create_box_shape(&mut self, half_extents: VectorHandle) -> Result<ShapeHandle, BackendError> {
        self.inner.create_box_shape(half_extents)
    }

    fn destroy_shape(&mut self, shape: ShapeHandle) -> Result<(), BackendError> {
        self.inner.destroy_shape(shape)
    }

    fn create_ray_result(&mut self) -> Result<RayResultHandle, BackendError> {
        self.inner.create_ray_result()
    }

    fn reset_ray_result(&mut self, result: RayResultHandle, hit_fraction: f32) -> Result<(), BackendError> {
        self.inner.reset_ray_result(result, hit_fraction)
    }

    fn ray_result(&self, result: RayResultHandle) -> Result<RayResultData, BackendError> {
        self.inner.ray_result(result)
    }

    fn destroy_ray_result(&mut self, result: RayResultHandle) -> Result<(), BackendError> {
        self.inner.destroy_ray_result(result)
    }

    fn create_sweep_result(&mut self) -> Result<SweepResultHandle, BackendError> {
        self.inner.create_sweep_result()
    }

    fn reset_sweep_result(&mut self, result: SweepResultHandle, hit_fraction: f32) -> Result<(), BackendError> {
        self.inner.reset_sweep_result(result, hit_fraction)
    }

    fn sweep_result(&self, result: SweepResultHandle) -> Result<SweepResultData, BackendError> {
        self.inner.sweep_result(result)
    }

    fn destroy_sweep_result(&mut self, result: SweepResultHandle) -> Result<(), BackendError> {
        self.inner.destroy_sweep_result(result)
    }

    fn body_origin(&self, body: BodyHandle) -> Result<Vec3, BackendError> {
        self.inner.body_origin(body)
    }

    fn ray_test(
        &mut self,
        start: PointHandle,
        end: PointHandle,
        result: RayResultHandle,
        exclude: Option<BodyHandle>,
    ) -> Result<(), BackendError> {
        self.inner.ray_test(start, end, result, exclude)
    }

    fn convex_sweep_test(
        &mut self,
        shape: ShapeHandle,
        start: PoseHandle,
        end: PoseHandle,
        result: SweepResultHandle,
        allowed_penetration: f32,
    ) -> Result<(), BackendError> {
        if self.fail_sweeps {
            return Err(BackendError::Unsupported("injected sweep failure".to_string()));
        }
        self.inner.convex_sweep_test(shape, start, end, result, allowed_penetration)
    }

    fn native_stats(&self) -> NativeStats {
        self.inner.native_stats()
    }
}
