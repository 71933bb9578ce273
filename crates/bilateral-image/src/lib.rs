#![deny(missing_docs)]
//! Image types for the bilateral filter crates

/// image representation for image processing purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{GrayImage, Image, ImageSize};
