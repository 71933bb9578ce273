use bilateral_image::{GrayImage, ImageError};
use serde::{Deserialize, Serialize};

use super::kernels::{IntensityWeights, SpatialKernel};
use crate::accel::{self, BilateralAccelerator};
use crate::error::BilateralError;
use crate::padding::pad_reflect101;
use crate::parallel::{execute_rows_with, ExecutionStrategy};

/// Parameters of the bilateral filter.
///
/// # Example
///
/// ```rust
/// use bilateral_imgproc::filter::BilateralParams;
///
/// let params = BilateralParams::default().with_diameter(5);
/// assert_eq!(params.radius(), 2);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BilateralParams {
    /// Diameter of the pixel neighborhood. Must be odd.
    pub diameter: usize,
    /// Sigma of the gaussian on the intensity difference.
    pub sigma_intensity: f64,
    /// Sigma of the gaussian on the spatial distance.
    pub sigma_spatial: f64,
}

impl Default for BilateralParams {
    fn default() -> Self {
        Self {
            diameter: 9,
            sigma_intensity: 70.0,
            sigma_spatial: 70.0,
        }
    }
}

impl BilateralParams {
    /// Create a new set of parameters.
    pub fn new(diameter: usize, sigma_intensity: f64, sigma_spatial: f64) -> Self {
        Self {
            diameter,
            sigma_intensity,
            sigma_spatial,
        }
    }

    /// Set the diameter of the pixel neighborhood.
    pub fn with_diameter(mut self, diameter: usize) -> Self {
        self.diameter = diameter;
        self
    }

    /// Set the sigma of the intensity gaussian.
    pub fn with_sigma_intensity(mut self, sigma: f64) -> Self {
        self.sigma_intensity = sigma;
        self
    }

    /// Set the sigma of the spatial gaussian.
    pub fn with_sigma_spatial(mut self, sigma: f64) -> Self {
        self.sigma_spatial = sigma;
        self
    }

    /// Radius of the neighborhood, `diameter / 2`.
    pub fn radius(&self) -> usize {
        self.diameter / 2
    }

    /// Check that the parameters describe a valid filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the diameter is zero, even or so large that its
    /// square does not fit an `isize`, or if a sigma is not a finite positive
    /// number.
    pub fn validate(&self) -> Result<(), BilateralError> {
        let area = self
            .diameter
            .checked_mul(self.diameter)
            .and_then(|a| isize::try_from(a).ok());
        if self.diameter % 2 == 0 || area.is_none() {
            return Err(BilateralError::InvalidDiameter(self.diameter));
        }
        if !(self.sigma_intensity.is_finite() && self.sigma_intensity > 0.0) {
            return Err(BilateralError::InvalidSigmaIntensity(self.sigma_intensity));
        }
        if !(self.sigma_spatial.is_finite() && self.sigma_spatial > 0.0) {
            return Err(BilateralError::InvalidSigmaSpatial(self.sigma_spatial));
        }
        Ok(())
    }
}

/// Build the intensity table and the spatial kernel of a bilateral filter.
///
/// # Arguments
///
/// * `params` - The filter parameters.
/// * `padded_stride` - The row stride of the padded image the kernel will index into.
///
/// # Errors
///
/// Returns an error if the parameters are invalid or if the neighborhood does
/// not fit `padded_stride`.
pub fn build_weight_tables(
    params: &BilateralParams,
    padded_stride: usize,
) -> Result<(IntensityWeights, SpatialKernel), BilateralError> {
    params.validate()?;
    let intensity = IntensityWeights::new(params.sigma_intensity);
    let spatial = SpatialKernel::new(params.radius(), params.sigma_spatial, padded_stride)?;
    Ok((intensity, spatial))
}

/// Compute one output pixel of the bilateral filter.
///
/// # Arguments
///
/// * `padded` - The source image padded by `spatial.radius()` on every side.
/// * `row` - The row of the pixel in the unpadded image.
/// * `col` - The column of the pixel in the unpadded image.
/// * `intensity` - The intensity weight table.
/// * `spatial` - The spatial kernel, built for the stride of `padded`.
///
/// # Returns
///
/// The weighted average of the neighborhood, rounded to the nearest integer.
#[inline]
pub fn bilateral_pixel(
    padded: &GrayImage,
    row: usize,
    col: usize,
    intensity: &IntensityWeights,
    spatial: &SpatialKernel,
) -> u8 {
    debug_assert_eq!(spatial.stride(), padded.stride());
    let radius = spatial.radius();
    let data = padded.as_slice();
    let center = (row + radius) * padded.stride() + col + radius;
    let val0 = data[center];

    let mut sum = 0.0;
    let mut wsum = 0.0;
    for offset in spatial.iter() {
        let val = data[(center as isize + offset.index_delta) as usize];
        // the weight is gaussian space * gaussian intensity
        let w = offset.weight * intensity.get(val.abs_diff(val0));
        sum += val as f64 * w;
        wsum += w;
    }

    // wsum >= 1, the center weighs 1 * 1
    (sum / wsum).round() as u8
}

/// Fill `span`, the part of output row `row` that starts at column `col`.
///
/// Elements past the last image column (row padding) are left untouched.
fn filter_span(
    padded: &GrayImage,
    cols: usize,
    row: usize,
    col: usize,
    span: &mut [u8],
    intensity: &IntensityWeights,
    spatial: &SpatialKernel,
) {
    span.iter_mut()
        .enumerate()
        .take_while(|(i, _)| col + i < cols)
        .for_each(|(i, dst)| {
            *dst = bilateral_pixel(padded, row, col + i, intensity, spatial);
        });
}

/// Apply a bilateral filter to a grayscale image.
///
/// The source is padded with reflect-101 borders, see
/// [`crate::padding::pad_reflect101`], and each output pixel is the average of its disk shaped neighborhood, weighted
/// by spatial distance and by intensity difference to the center pixel.
///
/// Every [`ExecutionStrategy`] visits the neighborhood in the same order, so
/// their outputs are byte-identical.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, 1).
/// * `dst` - The destination image with shape (H, W, 1).
/// * `params` - The filter parameters.
/// * `strategy` - How the rows are distributed across threads.
///
/// # Errors
///
/// Returns an error if the parameters are invalid, if `src` and `dst` have
/// different sizes, if the padded image cannot be allocated or if the thread
/// pool cannot be used. On error `dst` is left untouched.
///
/// # Example
///
/// ```rust
/// use bilateral_image::{GrayImage, ImageSize};
/// use bilateral_imgproc::filter::{bilateral_filter, BilateralParams};
/// use bilateral_imgproc::parallel::ExecutionStrategy;
///
/// let size = ImageSize { width: 5, height: 5 };
/// let src = GrayImage::from_size_val(size, 100).unwrap();
/// let mut dst = GrayImage::from_size_val(size, 0).unwrap();
///
/// let params = BilateralParams::new(3, 70.0, 70.0);
/// bilateral_filter(&src, &mut dst, &params, ExecutionStrategy::Serial).unwrap();
///
/// assert!(dst.as_slice().iter().all(|&v| v == 100));
/// ```
pub fn bilateral_filter(
    src: &GrayImage,
    dst: &mut GrayImage,
    params: &BilateralParams,
    strategy: ExecutionStrategy,
) -> Result<(), BilateralError> {
    params.validate()?;

    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            dst.width(),
            dst.height(),
            src.width(),
            src.height(),
        )
        .into());
    }

    if src.width() == 0 || src.height() == 0 {
        return Ok(());
    }

    let padded = pad_reflect101(src, params.radius())?;
    let (intensity, spatial) = build_weight_tables(params, padded.stride())?;

    log::debug!(
        "bilateral filter {}x{} diameter: {} neighbors: {} strategy: {:?}",
        src.width(),
        src.height(),
        params.diameter,
        spatial.len(),
        strategy
    );

    let cols = src.cols();
    let dst_stride = dst.stride();
    execute_rows_with(dst.as_slice_mut(), strategy, dst_stride, |row, col, span| {
        filter_span(&padded, cols, row, col, span, &intensity, &spatial)
    })?;

    Ok(())
}

/// Where the bilateral filter runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// On the CPU, with the given strategy.
    Cpu(ExecutionStrategy),
    /// On the registered [`BilateralAccelerator`].
    Accelerator,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Cpu(ExecutionStrategy::default())
    }
}

/// The path that produced the pixels of a [`FilterOutput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Filtered on the CPU with the given strategy.
    Cpu(ExecutionStrategy),
    /// Filtered by the named accelerator.
    Accelerator(String),
    /// Accelerator mode was requested without an accelerator; the image is
    /// the unfiltered input.
    Passthrough,
}

/// The result of [`BilateralFilter::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutput {
    /// The output image, same size as the input.
    pub image: GrayImage,
    /// The path that produced `image`.
    pub backend: Backend,
}

impl FilterOutput {
    /// Whether the image was actually filtered.
    pub fn is_filtered(&self) -> bool {
        self.backend != Backend::Passthrough
    }
}

/// A configured bilateral filter.
///
/// # Example
///
/// ```rust
/// use bilateral_image::{GrayImage, ImageSize};
/// use bilateral_imgproc::filter::{Backend, BilateralFilter, BilateralParams, ExecutionMode};
/// use bilateral_imgproc::parallel::ExecutionStrategy;
///
/// let src = GrayImage::new(ImageSize { width: 2, height: 1 }, vec![10, 200]).unwrap();
///
/// let filter = BilateralFilter::new(BilateralParams::new(3, 70.0, 70.0))
///     .with_mode(ExecutionMode::Cpu(ExecutionStrategy::Serial));
/// let out = filter.apply(&src).unwrap();
///
/// assert_eq!(out.image.size(), src.size());
/// assert_eq!(out.backend, Backend::Cpu(ExecutionStrategy::Serial));
/// ```
#[derive(Clone, Copy, Default)]
pub struct BilateralFilter<'a> {
    params: BilateralParams,
    mode: ExecutionMode,
    accelerator: Option<&'a dyn BilateralAccelerator>,
}

impl std::fmt::Debug for BilateralFilter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BilateralFilter")
            .field("params", &self.params)
            .field("mode", &self.mode)
            .field("accelerator", &self.accelerator.map(|a| a.name()))
            .finish()
    }
}

impl<'a> BilateralFilter<'a> {
    /// Create a filter running on the CPU with the default strategy.
    pub fn new(params: BilateralParams) -> Self {
        Self {
            params,
            mode: ExecutionMode::default(),
            accelerator: None,
        }
    }

    /// Set where the filter runs.
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Register the accelerator used by [`ExecutionMode::Accelerator`].
    pub fn with_accelerator(mut self, accelerator: &'a dyn BilateralAccelerator) -> Self {
        self.accelerator = Some(accelerator);
        self
    }

    /// The filter parameters.
    pub fn params(&self) -> &BilateralParams {
        &self.params
    }

    /// Where the filter runs.
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Filter `src` into a newly allocated image.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid, if the output cannot
    /// be allocated, if the thread pool fails or if the accelerator fails.
    pub fn apply(&self, src: &GrayImage) -> Result<FilterOutput, BilateralError> {
        self.params.validate()?;

        match self.mode {
            ExecutionMode::Cpu(strategy) => {
                let mut image = GrayImage::from_size_val(src.size(), 0)?;
                bilateral_filter(src, &mut image, &self.params, strategy)?;
                Ok(FilterOutput {
                    image,
                    backend: Backend::Cpu(strategy),
                })
            }
            ExecutionMode::Accelerator => {
                accel::filter_accelerated(src, &self.params, self.accelerator)
            }
        }
    }
}
