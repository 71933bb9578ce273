use crate::error::BilateralError;

/// Number of distinct absolute differences between two 8-bit values.
pub const INTENSITY_LEVELS: usize = 256;

/// Coefficient `-1 / (2 * sigma^2)` of a gaussian in the form `exp(d^2 * coeff)`.
///
/// Degenerates to `-inf` when `sigma^2` underflows to zero.
#[inline]
fn gaussian_coeff(sigma: f64) -> f64 {
    -0.5 / (sigma * sigma)
}

/// Gaussian weight of a squared distance.
///
/// A zero distance always weighs `1.0`, which keeps the weight finite when
/// `coeff` is `-inf` (`0 * -inf` would be NaN).
#[inline]
fn gaussian_weight(dist_sq: f64, coeff: f64) -> f64 {
    if dist_sq == 0.0 {
        return 1.0;
    }
    (dist_sq * coeff).exp()
}

/// Lookup table of the intensity (range) weights of a bilateral filter.
///
/// Entry `d` holds `exp(-d^2 / (2 * sigma^2))`, the weight of a neighbor whose
/// value differs by `d` from the center pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityWeights([f64; INTENSITY_LEVELS]);

impl IntensityWeights {
    /// Create the intensity weight table.
    ///
    /// # Arguments
    ///
    /// * `sigma` - The sigma of the intensity gaussian.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bilateral_imgproc::filter::kernels::IntensityWeights;
    ///
    /// let weights = IntensityWeights::new(70.0);
    /// assert_eq!(weights.get(0), 1.0);
    /// assert!(weights.get(255) < weights.get(1));
    /// ```
    pub fn new(sigma: f64) -> Self {
        let coeff = gaussian_coeff(sigma);
        let mut table = [0.0; INTENSITY_LEVELS];
        table.iter_mut().enumerate().for_each(|(d, w)| {
            let d = d as f64;
            *w = gaussian_weight(d * d, coeff);
        });
        Self(table)
    }

    /// Weight of an absolute intensity difference.
    #[inline]
    pub fn get(&self, diff: u8) -> f64 {
        self.0[diff as usize]
    }

    /// The table as a slice, indexed by the absolute difference.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// A neighbor position of the spatial kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialOffset {
    /// Row offset from the center pixel.
    pub dy: isize,
    /// Column offset from the center pixel.
    pub dx: isize,
    /// Flat index offset from the center pixel, `dy * stride + dx`.
    pub index_delta: isize,
    /// Spatial gaussian weight of the position.
    pub weight: f64,
}

/// Disk shaped neighborhood of a bilateral filter with precomputed spatial weights.
///
/// The offsets enumerate every lattice point `(dy, dx)` with
/// `dy^2 + dx^2 <= radius^2`, row-major over `dy` then `dx`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialKernel {
    radius: usize,
    stride: usize,
    offsets: Vec<SpatialOffset>,
}

impl SpatialKernel {
    /// Create the spatial kernel.
    ///
    /// # Arguments
    ///
    /// * `radius` - The radius of the disk neighborhood.
    /// * `sigma` - The sigma of the spatial gaussian.
    /// * `stride` - The row stride of the buffer the kernel indexes into.
    ///
    /// # Errors
    ///
    /// Returns [`BilateralError::InvalidDiameter`] if the squared diameter or
    /// the largest index offset does not fit an `isize`, or if the offsets
    /// cannot be allocated.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bilateral_imgproc::filter::kernels::SpatialKernel;
    ///
    /// // radius 1 is a plus shape: the corners are further than 1 away
    /// let kernel = SpatialKernel::new(1, 1.0, 10).unwrap();
    /// let deltas = kernel.iter().map(|o| o.index_delta).collect::<Vec<_>>();
    /// assert_eq!(deltas, vec![-10, -1, 0, 1, 10]);
    /// ```
    pub fn new(radius: usize, sigma: f64, stride: usize) -> Result<Self, BilateralError> {
        let side = radius.saturating_mul(2).saturating_add(1);
        let too_large = || BilateralError::InvalidDiameter(side);

        // every dy * stride + dx and dy^2 + dx^2 below must fit an isize
        let area = side.checked_mul(side).ok_or_else(too_large)?;
        let r = isize::try_from(radius).map_err(|_| too_large())?;
        let max_delta = isize::try_from(stride)
            .ok()
            .and_then(|s| r.checked_mul(s))
            .and_then(|d| d.checked_add(r));
        if isize::try_from(area).is_err() || max_delta.is_none() {
            return Err(too_large());
        }

        let coeff = gaussian_coeff(sigma);
        let mut offsets = Vec::new();
        offsets
            .try_reserve_exact(area)
            .map_err(|_| too_large())?;

        for dy in -r..=r {
            for dx in -r..=r {
                let dist_sq = dy * dy + dx * dx;
                // circle
                if dist_sq > r * r {
                    continue;
                }
                offsets.push(SpatialOffset {
                    dy,
                    dx,
                    index_delta: dy * stride as isize + dx,
                    weight: gaussian_weight(dist_sq as f64, coeff),
                });
            }
        }

        Ok(Self {
            radius,
            stride,
            offsets,
        })
    }

    /// The radius of the neighborhood.
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// The row stride the index offsets were computed for.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of positions in the neighborhood.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the neighborhood is empty. Never true, the center is always included.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// The neighborhood positions in enumeration order.
    pub fn offsets(&self) -> &[SpatialOffset] {
        &self.offsets
    }

    /// Iterate over the neighborhood positions in enumeration order.
    pub fn iter(&self) -> std::slice::Iter<'_, SpatialOffset> {
        self.offsets.iter()
    }
}
