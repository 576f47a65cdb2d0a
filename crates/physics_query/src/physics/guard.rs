//! Scoped per-call box shape

use super::backend::{BackendError, PhysicsBackend, ShapeHandle, VectorHandle};

/// Box shape that is released when the guard goes out of scope
///
/// Holds the world mutably for its lifetime; use [`world`](Self::world) to run
/// queries against it while the shape is alive.
pub struct BoxShape<'w, B: PhysicsBackend> {
    world: &'w mut B,
    shape: ShapeHandle,
}

impl<'w, B: PhysicsBackend> BoxShape<'w, B> {
    /// Create a box shape from the half extents stored in `half_extents`
    pub fn new(world: &'w mut B, half_extents: VectorHandle) -> Result<Self, BackendError> {
        let shape = world.create_box_shape(half_extents)?;
        Ok(Self { world, shape })
    }

    /// Native shape handle
    pub fn handle(&self) -> ShapeHandle {
        self.shape
    }

    /// World the shape lives in
    pub fn world(&mut self) -> &mut B {
        &mut *self.world
    }
}

impl<B: PhysicsBackend> Drop for BoxShape<'_, B> {
    fn drop(&mut self) {
        if let Err(e) = self.world.destroy_shape(self.shape) {
            log::warn!("Failed to release sweep shape: {}", e);
        }
    }
}
