//! Cached native scratch handles
//!
//! The bundle is allocated all at once and released all at once: a partially
//! built bundle is rolled back before the error reaches the caller.

use super::backend::{
    BackendError, PhysicsBackend, PointHandle, PoseHandle, RayResultHandle, SweepResultHandle,
    VectorHandle,
};

/// Reusable native handles overwritten by every query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScratchHandles {
    pub(crate) ray_start: PointHandle,
    pub(crate) ray_end: PointHandle,
    pub(crate) ray_result: RayResultHandle,
    pub(crate) sweep_start: PoseHandle,
    pub(crate) sweep_end: PoseHandle,
    pub(crate) temp_vector: VectorHandle,
    pub(crate) temp_extents: VectorHandle,
    pub(crate) sweep_result: SweepResultHandle,
}

/// Handles created so far while building a bundle
#[derive(Default)]
struct PartialScratch {
    ray_start: Option<PointHandle>,
    ray_end: Option<PointHandle>,
    ray_result: Option<RayResultHandle>,
    sweep_start: Option<PoseHandle>,
    sweep_end: Option<PoseHandle>,
    temp_vector: Option<VectorHandle>,
    temp_extents: Option<VectorHandle>,
    sweep_result: Option<SweepResultHandle>,
}

impl PartialScratch {
    fn fill<B: PhysicsBackend>(&mut self, world: &mut B) -> Result<ScratchHandles, BackendError> {
        let ray_start = *self.ray_start.insert(world.create_point()?);
        let ray_end = *self.ray_end.insert(world.create_point()?);
        let ray_result = *self.ray_result.insert(world.create_ray_result()?);
        let sweep_start = *self.sweep_start.insert(world.create_pose()?);
        let sweep_end = *self.sweep_end.insert(world.create_pose()?);
        let temp_vector = *self.temp_vector.insert(world.create_vector()?);
        let temp_extents = *self.temp_extents.insert(world.create_vector()?);
        let sweep_result = *self.sweep_result.insert(world.create_sweep_result()?);

        Ok(ScratchHandles {
            ray_start,
            ray_end,
            ray_result,
            sweep_start,
            sweep_end,
            temp_vector,
            temp_extents,
            sweep_result,
        })
    }

    /// Release whatever exists; returns how many releases failed
    fn release<B: PhysicsBackend>(self, world: &mut B) -> usize {
        let results = [
            self.ray_start.map(|h| world.destroy_point(h)),
            self.ray_end.map(|h| world.destroy_point(h)),
            self.ray_result.map(|h| world.destroy_ray_result(h)),
            self.sweep_start.map(|h| world.destroy_pose(h)),
            self.sweep_end.map(|h| world.destroy_pose(h)),
            self.temp_vector.map(|h| world.destroy_vector(h)),
            self.temp_extents.map(|h| world.destroy_vector(h)),
            self.sweep_result.map(|h| world.destroy_sweep_result(h)),
        ];

        let mut failures = 0;
        for result in results.into_iter().flatten() {
            if let Err(e) = result {
                log::warn!("Failed to release scratch handle: {}", e);
                failures += 1;
            }
        }
        failures
    }
}

impl From<ScratchHandles> for PartialScratch {
    fn from(s: ScratchHandles) -> Self {
        Self {
            ray_start: Some(s.ray_start),
            ray_end: Some(s.ray_end),
            ray_result: Some(s.ray_result),
            sweep_start: Some(s.sweep_start),
            sweep_end: Some(s.sweep_end),
            temp_vector: Some(s.temp_vector),
            temp_extents: Some(s.temp_extents),
            sweep_result: Some(s.sweep_result),
        }
    }
}

impl ScratchHandles {
    /// Allocate every scratch handle, or none of them
    pub(crate) fn allocate<B: PhysicsBackend>(world: &mut B) -> Result<Self, BackendError> {
        let mut partial = PartialScratch::default();
        match partial.fill(world) {
            Ok(handles) => Ok(handles),
            Err(e) => {
                let failures = partial.release(world);
                log::debug!("Scratch allocation rolled back ({} release failures): {}", failures, e);
                Err(e)
            }
        }
    }

    /// Release every handle, tolerating and logging individual failures
    ///
    /// Returns the number of handles that could not be released.
    pub(crate) fn release<B: PhysicsBackend>(self, world: &mut B) -> usize {
        PartialScratch::from(self).release(world)
    }

    /// Number of native handles in the bundle
    pub(crate) const COUNT: usize = 8;
}
