#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// interface to accelerated bilateral filter implementations.
pub mod accel;

/// error types of the filtering operations.
pub mod error;

/// image filtering module.
pub mod filter;

/// utilities to pad image borders.
pub mod padding;

/// module containing parallization utilities.
pub mod parallel;

pub use crate::error::BilateralError;
