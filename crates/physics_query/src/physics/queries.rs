//! Cached physics query facade
//!
//! [`PhysicsQueries`] owns a physics world plus a bundle of native scratch
//! handles and answers ray and box-sweep queries by overwriting those handles
//! in place. A ray query performs no native allocation at all; a box sweep
//! allocates exactly one shape and releases it before returning.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --initialize--> Ready --teardown--> Uninitialized
//! ```
//!
//! Queries in `Uninitialized` fail with [`QueryError::InvalidState`].
//!
//! # Threading
//!
//! Every query takes `&mut self`, so two queries can never share the scratch
//! handles at once, reentrant calls included. Wrap the facade in a `Mutex` to
//! query from more than one thread.

use super::backend::{BodyHandle, PhysicsBackend};
use super::error::{InitError, QueryError};
use super::guard::BoxShape;
use super::scratch::ScratchHandles;
use crate::config::{QueryConfig, ReinitPolicy};
use crate::foundation::math::{self, Quat, Vec3};

/// Observable facade state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    /// No world, no scratch handles
    Uninitialized,
    /// World held and scratch handles live
    Ready,
}

/// Outcome of a ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Fraction of the ray length at the closest hit, 1.0 on a miss
    pub hit_fraction: f32,
    /// Body that was hit
    pub body: Option<BodyHandle>,
}

impl RayHit {
    /// Whether the ray hit anything
    pub fn has_hit(&self) -> bool {
        self.body.is_some()
    }
}

/// Outcome of a box sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Whether the box touched anything along the way
    pub has_hit: bool,
    /// Fraction of the swept distance at first contact, in `[0, 1]`; 1.0 on a miss
    pub hit_fraction: f32,
}

impl SweepHit {
    /// Result of a sweep that reached its end unobstructed
    pub fn miss() -> Self {
        Self {
            has_hit: false,
            hit_fraction: 1.0,
        }
    }
}

/// Query counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryStats {
    /// Ray queries answered
    pub ray_tests: u64,
    /// Ray queries that hit
    pub ray_hits: u64,
    /// Sweep queries answered
    pub sweep_tests: u64,
    /// Sweep queries that hit
    pub sweep_hits: u64,
}

enum FacadeState<B> {
    Uninitialized,
    Ready { world: B, scratch: ScratchHandles },
}

impl<B> FacadeState<B> {
    fn ready_mut(&mut self) -> Result<(&mut B, ScratchHandles), QueryError> {
        match self {
            Self::Ready { world, scratch } => Ok((world, *scratch)),
            Self::Uninitialized => Err(QueryError::InvalidState("physics queries not initialized")),
        }
    }
}

/// Ray and box-sweep queries over a world, reusing cached native handles
pub struct PhysicsQueries<B: PhysicsBackend> {
    config: QueryConfig,
    state: FacadeState<B>,
    stats: QueryStats,
}

impl<B: PhysicsBackend> PhysicsQueries<B> {
    /// Create an uninitialized facade
    pub fn new(config: QueryConfig) -> Self {
        Self {
            config,
            state: FacadeState::Uninitialized,
            stats: QueryStats::default(),
        }
    }

    /// Take ownership of `world` and allocate the scratch handles in it
    ///
    /// When already `Ready`, behavior follows [`QueryConfig::reinit_policy`]:
    /// `Reject` fails with `InvalidState`, `Reallocate` switches to the new
    /// world and returns the previous one with its scratch handles released.
    /// The new world is allocated into first, so a failure leaves the current
    /// context untouched. On any failure the new world is handed back inside
    /// the [`InitError`].
    pub fn initialize(&mut self, mut world: B) -> Result<Option<B>, InitError<B>> {
        if self.is_ready() && self.config.reinit_policy == ReinitPolicy::Reject {
            log::warn!("Rejecting initialize: physics queries already initialized");
            return Err(InitError::new(
                QueryError::InvalidState("physics queries already initialized"),
                world,
            ));
        }

        let scratch = match ScratchHandles::allocate(&mut world) {
            Ok(scratch) => scratch,
            Err(e) => {
                log::error!("Failed to allocate query scratch handles: {}", e);
                return Err(InitError::new(e.into(), world));
            }
        };

        let previous = self.teardown();
        if previous.is_some() {
            log::info!("Physics queries reinitialized against a new world");
        }
        self.state = FacadeState::Ready { world, scratch };
        log::info!("Physics queries initialized ({} scratch handles)", ScratchHandles::COUNT);
        Ok(previous)
    }

    /// Release the scratch handles and give the world back
    ///
    /// Safe to call any number of times; returns `None` when there was nothing
    /// to tear down. Release failures are logged, never returned.
    pub fn teardown(&mut self) -> Option<B> {
        match std::mem::replace(&mut self.state, FacadeState::Uninitialized) {
            FacadeState::Uninitialized => None,
            FacadeState::Ready { mut world, scratch } => {
                let failures = scratch.release(&mut world);
                if failures > 0 {
                    log::warn!("Teardown finished with {} unreleased scratch handles", failures);
                }
                log::info!("Physics queries torn down");
                Some(world)
            }
        }
    }

    /// Cast a ray from `body`'s current position and report whether it hit anything
    ///
    /// The body's own collider is ignored.
    pub fn ray_test(&mut self, body: BodyHandle, direction: Vec3, distance: f32) -> Result<bool, QueryError> {
        self.ray_cast(body, direction, distance).map(|hit| hit.has_hit())
    }

    /// Like [`ray_test`](Self::ray_test), also returning the hit fraction and body
    pub fn ray_cast(&mut self, body: BodyHandle, direction: Vec3, distance: f32) -> Result<RayHit, QueryError> {
        let (world, scratch) = self.state.ready_mut()?;
        if self.config.validate_arguments {
            check_direction(&direction, self.config.direction_tolerance)?;
            check_distance(distance)?;
        }

        let origin = world.body_origin(body)?;
        let end = origin + direction * distance;
        world.set_point(scratch.ray_start, &origin)?;
        world.set_point(scratch.ray_end, &end)?;
        world.reset_ray_result(scratch.ray_result, 1.0)?;
        world.ray_test(scratch.ray_start, scratch.ray_end, scratch.ray_result, Some(body))?;

        let result = world.ray_result(scratch.ray_result)?;
        let hit = RayHit {
            hit_fraction: if result.hit_body.is_some() { result.hit_fraction.clamp(0.0, 1.0) } else { 1.0 },
            body: result.hit_body,
        };

        self.stats.ray_tests += 1;
        if hit.has_hit() {
            self.stats.ray_hits += 1;
        }
        log::trace!("ray from {:?} along {:?} x {}: {:?}", origin, direction, distance, hit);
        Ok(hit)
    }

    /// Sweep an axis-aligned box of full size `size` from `position` along `direction`
    pub fn box_sweep_test(
        &mut self,
        position: Vec3,
        size: Vec3,
        direction: Vec3,
        distance: f32,
    ) -> Result<SweepHit, QueryError> {
        let (world, scratch) = self.state.ready_mut()?;
        if self.config.validate_arguments {
            if !math::is_finite(&position) {
                return Err(QueryError::InvalidArgument(format!("position {position:?} is not finite")));
            }
            if !math::is_finite(&size) || size.iter().any(|c| *c < 0.0) {
                return Err(QueryError::InvalidArgument(format!("size {size:?} must be finite and non-negative")));
            }
            check_direction(&direction, self.config.direction_tolerance)?;
            check_distance(distance)?;
        }

        let identity = Quat::identity();
        world.set_pose(scratch.sweep_start, &position, &identity)?;
        world.set_vector(scratch.temp_vector, &(position + direction * distance))?;
        world.set_pose_from_vector(scratch.sweep_end, scratch.temp_vector, &identity)?;
        world.set_vector(scratch.temp_extents, &(size * 0.5))?;

        let result = {
            let mut shape = BoxShape::new(world, scratch.temp_extents)?;
            let handle = shape.handle();
            let world = shape.world();
            world.reset_sweep_result(scratch.sweep_result, 1.0)?;
            world.convex_sweep_test(
                handle,
                scratch.sweep_start,
                scratch.sweep_end,
                scratch.sweep_result,
                self.config.allowed_penetration,
            )?;
            world.sweep_result(scratch.sweep_result)?
        };

        let hit = if result.hit_body.is_some() {
            SweepHit {
                has_hit: true,
                hit_fraction: result.hit_fraction.clamp(0.0, 1.0),
            }
        } else {
            SweepHit::miss()
        };

        self.stats.sweep_tests += 1;
        if hit.has_hit {
            self.stats.sweep_hits += 1;
        }
        log::trace!("box sweep {:?} from {:?} along {:?} x {}: {:?}", size, position, direction, distance, hit);
        Ok(hit)
    }

    /// Current lifecycle state
    pub fn state(&self) -> QueryState {
        match self.state {
            FacadeState::Uninitialized => QueryState::Uninitialized,
            FacadeState::Ready { .. } => QueryState::Ready,
        }
    }

    /// Whether queries may be issued
    pub fn is_ready(&self) -> bool {
        self.state() == QueryState::Ready
    }

    /// World held by the facade
    pub fn world(&self) -> Result<&B, QueryError> {
        match &self.state {
            FacadeState::Ready { world, .. } => Ok(world),
            FacadeState::Uninitialized => Err(QueryError::InvalidState("physics queries not initialized")),
        }
    }

    /// World held by the facade, mutably (to move bodies between queries)
    pub fn world_mut(&mut self) -> Result<&mut B, QueryError> {
        self.state.ready_mut().map(|(world, _)| world)
    }

    /// Query counters since construction
    pub fn stats(&self) -> QueryStats {
        self.stats
    }

    /// Facade settings
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }
}

impl<B: PhysicsBackend> Drop for PhysicsQueries<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn check_direction(direction: &Vec3, tolerance: f32) -> Result<(), QueryError> {
    if math::is_unit(direction, tolerance) {
        Ok(())
    } else {
        Err(QueryError::InvalidArgument(format!("direction {direction:?} is not normalized")))
    }
}

fn check_distance(distance: f32) -> Result<(), QueryError> {
    if distance.is_finite() && distance > 0.0 {
        Ok(())
    } else {
        Err(QueryError::InvalidArgument(format!("distance {distance} must be finite and positive")))
    }
}
