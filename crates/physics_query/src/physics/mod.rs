//! Physics module for collision queries
//!
//! Provides ray-cast and box-sweep queries against a physics world through a
//! facade that caches the native handles those queries need.
//!
//! # Module Organization
//!
//! - [`backend`] - The world abstraction and the parry3d implementation
//! - [`queries`] - The [`PhysicsQueries`] facade and its result types
//! - `scratch` - The cached scratch handle bundle owned by the facade
//! - [`guard`] - Scoped per-call sweep shape

pub mod backend;
pub mod error;
pub mod guard;
pub mod queries;
mod scratch;

#[cfg(test)]
mod tests;

pub use error::{InitError, QueryError};
pub use queries::{PhysicsQueries, QueryState, QueryStats, RayHit, SweepHit};
