//! Physics world backends
//!
//! Platform-independent abstraction over the physics engine the query facade
//! talks to. The trait mirrors an engine with manual native memory: every
//! point, pose, vector, shape and result record is created by an explicit
//! constructor and must be handed back to the matching destructor.

pub mod parry_world;

pub use parry_world::{ParryWorld, SharedShape};

use crate::foundation::math::{Quat, Vec3};
use slotmap::new_key_type;
use thiserror::Error;

new_key_type! {
    /// Rigid body living in the world
    pub struct BodyHandle;
    /// Native 3D point (ray endpoints)
    pub struct PointHandle;
    /// Native pose: origin plus orientation (sweep start/end)
    pub struct PoseHandle;
    /// Native scratch vector
    pub struct VectorHandle;
    /// Native convex shape used by sweeps
    pub struct ShapeHandle;
    /// Native ray result record
    pub struct RayResultHandle;
    /// Native sweep result record
    pub struct SweepResultHandle;
}

/// Errors reported by a physics backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Native handle budget exhausted
    #[error("Native handle capacity exhausted ({capacity} live handles)")]
    OutOfHandles {
        /// Configured maximum number of live handles
        capacity: usize,
    },

    /// Handle was never created or was already released
    #[error("Stale {0} handle")]
    StaleHandle(&'static str),

    /// Body handle does not name a body in this world
    #[error("Unknown rigid body")]
    UnknownBody,

    /// Geometry pair not supported by the engine
    #[error("Unsupported query: {0}")]
    Unsupported(String),
}

/// Contents of a ray result record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayResultData {
    /// Fraction of the segment at the closest hit, 1.0 when nothing was hit
    pub hit_fraction: f32,
    /// Body that was hit
    pub hit_body: Option<BodyHandle>,
}

impl Default for RayResultData {
    fn default() -> Self {
        Self {
            hit_fraction: 1.0,
            hit_body: None,
        }
    }
}

/// Contents of a sweep result record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepResultData {
    /// Fraction of the swept distance at first contact, 1.0 when nothing was hit
    pub hit_fraction: f32,
    /// Body that was hit
    pub hit_body: Option<BodyHandle>,
}

impl Default for SweepResultData {
    fn default() -> Self {
        Self {
            hit_fraction: 1.0,
            hit_body: None,
        }
    }
}

/// Native allocation counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NativeStats {
    /// Handles created since the world was built
    pub allocated: u64,
    /// Handles released since the world was built
    pub released: u64,
}

impl NativeStats {
    /// Handles currently alive
    pub fn live(&self) -> u64 {
        self.allocated - self.released
    }
}

/// Physics world trait used by the query facade
///
/// Not `Send + Sync`: worlds are driven from the single simulation thread.
pub trait PhysicsBackend {
    /// Create a point handle
    fn create_point(&mut self) -> Result<PointHandle, BackendError>;
    /// Overwrite a point in place
    fn set_point(&mut self, point: PointHandle, value: &Vec3) -> Result<(), BackendError>;
    /// Release a point handle
    fn destroy_point(&mut self, point: PointHandle) -> Result<(), BackendError>;

    /// Create a pose handle (identity)
    fn create_pose(&mut self) -> Result<PoseHandle, BackendError>;
    /// Set a pose's orientation and its origin from a literal position
    fn set_pose(&mut self, pose: PoseHandle, origin: &Vec3, rotation: &Quat) -> Result<(), BackendError>;
    /// Set a pose's orientation and copy its origin out of a vector handle
    fn set_pose_from_vector(
        &mut self,
        pose: PoseHandle,
        origin: VectorHandle,
        rotation: &Quat,
    ) -> Result<(), BackendError>;
    /// Release a pose handle
    fn destroy_pose(&mut self, pose: PoseHandle) -> Result<(), BackendError>;

    /// Create a vector handle (zero)
    fn create_vector(&mut self) -> Result<VectorHandle, BackendError>;
    /// Overwrite a vector in place
    fn set_vector(&mut self, vector: VectorHandle, value: &Vec3) -> Result<(), BackendError>;
    /// Release a vector handle
    fn destroy_vector(&mut self, vector: VectorHandle) -> Result<(), BackendError>;

    /// Create a box shape whose half extents are read from a vector handle
    fn create_box_shape(&mut self, half_extents: VectorHandle) -> Result<ShapeHandle, BackendError>;
    /// Release a shape handle
    fn destroy_shape(&mut self, shape: ShapeHandle) -> Result<(), BackendError>;

    /// Create a ray result record
    fn create_ray_result(&mut self) -> Result<RayResultHandle, BackendError>;
    /// Overwrite a ray result record
    fn reset_ray_result(&mut self, result: RayResultHandle, hit_fraction: f32) -> Result<(), BackendError>;
    /// Read a ray result record
    fn ray_result(&self, result: RayResultHandle) -> Result<RayResultData, BackendError>;
    /// Release a ray result record
    fn destroy_ray_result(&mut self, result: RayResultHandle) -> Result<(), BackendError>;

    /// Create a sweep result record
    fn create_sweep_result(&mut self) -> Result<SweepResultHandle, BackendError>;
    /// Overwrite a sweep result record
    fn reset_sweep_result(&mut self, result: SweepResultHandle, hit_fraction: f32) -> Result<(), BackendError>;
    /// Read a sweep result record
    fn sweep_result(&self, result: SweepResultHandle) -> Result<SweepResultData, BackendError>;
    /// Release a sweep result record
    fn destroy_sweep_result(&mut self, result: SweepResultHandle) -> Result<(), BackendError>;

    /// Current world-space origin of a body
    fn body_origin(&self, body: BodyHandle) -> Result<Vec3, BackendError>;

    /// Cast the segment `start..end` and record the closest hit in `result`
    ///
    /// `exclude` names a body whose collider is ignored (typically the caster).
    fn ray_test(
        &mut self,
        start: PointHandle,
        end: PointHandle,
        result: RayResultHandle,
        exclude: Option<BodyHandle>,
    ) -> Result<(), BackendError>;

    /// Sweep `shape` from `start` to `end` and record the first contact in `result`
    fn convex_sweep_test(
        &mut self,
        shape: ShapeHandle,
        start: PoseHandle,
        end: PoseHandle,
        result: SweepResultHandle,
        allowed_penetration: f32,
    ) -> Result<(), BackendError>;

    /// Native allocation counters
    fn native_stats(&self) -> NativeStats;
}
