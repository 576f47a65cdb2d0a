//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and helpers shared with the geometry backend
//! - Logging bootstrap

pub mod math;
pub mod logging;
