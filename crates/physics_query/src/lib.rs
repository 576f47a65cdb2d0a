//! # Physics Query
//!
//! Ray-cast and box-sweep queries against a physics world, performed through a
//! fixed bundle of cached native scratch handles so that a per-frame simulation
//! loop does not allocate on every query.
//!
//! ## Features
//!
//! - **Cached scratch handles**: points, poses, vectors and result records are
//!   created once on [`initialize`](physics::PhysicsQueries::initialize) and reused
//! - **Scoped sweep shapes**: the one per-call box shape is released on every exit path
//! - **Explicit lifecycle**: `Uninitialized` / `Ready` states, idempotent teardown
//! - **Pluggable worlds**: any [`PhysicsBackend`](physics::backend::PhysicsBackend);
//!   [`ParryWorld`](physics::backend::ParryWorld) ships in the crate
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use physics_query::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut world = ParryWorld::new(&WorldConfig::default());
//!     world.add_static_box(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
//!     let player = world.add_body(Vec3::new(0.0, 0.0, 5.0), None);
//!
//!     let mut queries = PhysicsQueries::new(QueryConfig::default());
//!     queries.initialize(world).map_err(|e| e.into_error())?;
//!
//!     let down = Vec3::new(0.0, 0.0, -1.0);
//!     assert!(queries.ray_test(player, down, 10.0)?);
//!
//!     let sweep = queries.box_sweep_test(Vec3::new(0.0, 0.0, 5.0), Vec3::new(1.0, 1.0, 1.0), down, 10.0)?;
//!     assert!(sweep.has_hit);
//!
//!     queries.teardown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod physics;

/// Common imports for facade users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, ConfigFormat, LoggingConfig, PhysicsConfig, QueryConfig, ReinitPolicy, WorldConfig},
        foundation::math::{Pose, Quat, Vec3},
        physics::{
            backend::{BackendError, BodyHandle, NativeStats, ParryWorld, PhysicsBackend},
            InitError, PhysicsQueries, QueryError, QueryStats, RayHit, SweepHit,
        },
    };
}
