use bilateral_image::{ImageError, ImageSize};
use thiserror::Error;

use crate::parallel::ParallelError;

/// Errors that can occur while filtering an image.
#[derive(Error, Debug, PartialEq)]
pub enum BilateralError {
    /// The diameter is zero, even or too large for the neighborhood to be indexed.
    #[error("diameter must be an odd number >= 1 whose square fits an isize, got {0}")]
    InvalidDiameter(usize),

    /// The intensity sigma is not a finite positive number.
    #[error("intensity sigma must be finite and > 0, got {0}")]
    InvalidSigmaIntensity(f64),

    /// The spatial sigma is not a finite positive number.
    #[error("spatial sigma must be finite and > 0, got {0}")]
    InvalidSigmaSpatial(f64),

    /// An image could not be allocated or has the wrong size.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The worker pool could not run the filter.
    #[error(transparent)]
    Parallel(#[from] ParallelError),

    /// The accelerator returned an image of the wrong size.
    #[error("accelerator returned an image of size {1}, expected {0}")]
    AcceleratorShapeMismatch(ImageSize, ImageSize),

    /// The accelerator failed.
    #[error("accelerator failed: {0}")]
    Accelerator(String),
}
