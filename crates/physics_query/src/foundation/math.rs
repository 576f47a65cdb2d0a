//! Math utilities and types
//!
//! Thin aliases over nalgebra so the facade, the backend trait and parry3d all
//! speak the same `f32` types.

pub use nalgebra::{Isometry3, Quaternion, Translation3, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Rigid pose: position and orientation, no scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Position in world space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }
}

impl Pose {
    /// Create an identity pose
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a pose with identity orientation at `position`
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a pose with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Convert to the isometry representation used by the geometry backend
    pub fn to_isometry(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.position), self.rotation)
    }

    /// Build a pose from an isometry
    pub fn from_isometry(isometry: &Isometry3<f32>) -> Self {
        Self {
            position: isometry.translation.vector,
            rotation: isometry.rotation,
        }
    }
}

/// True when every component is finite
pub fn is_finite(v: &Vec3) -> bool {
    v.iter().all(|c| c.is_finite())
}

/// True when `v` is finite and its length is within `tolerance` of 1
pub fn is_unit(v: &Vec3, tolerance: f32) -> bool {
    is_finite(v) && (v.norm() - 1.0).abs() <= tolerance
}
