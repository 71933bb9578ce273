//! Edge-preserving bilateral filtering of grayscale images.
//!
//! ```rust
//! use bilateral::image::{GrayImage, ImageSize};
//! use bilateral::imgproc::filter::{BilateralFilter, BilateralParams};
//!
//! let src = GrayImage::from_size_val(ImageSize { width: 8, height: 8 }, 42).unwrap();
//! let out = BilateralFilter::new(BilateralParams::default()).apply(&src).unwrap();
//!
//! assert_eq!(out.image, src);
//! ```

#[doc(inline)]
pub use bilateral_image as image;

#[doc(inline)]
pub use bilateral_imgproc as imgproc;
