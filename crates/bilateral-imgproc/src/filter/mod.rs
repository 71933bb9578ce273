//! Filter operations
//!
//! This module provides the bilateral filter and the weight tables it is built from.

/// Filter kernels
pub mod kernels;

/// Bilateral filter operations
mod bilateral;
pub use bilateral::*;
