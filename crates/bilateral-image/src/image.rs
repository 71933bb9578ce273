use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use bilateral_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

/// Represents an image with pixel data.
///
/// The pixels are stored row-major with `C` interleaved channels. Each row
/// starts `stride` elements after the previous one; the elements between the
/// end of a row and the next row start are padding and never read as pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const C: usize> {
    size: ImageSize,
    stride: usize,
    data: Vec<T>,
}

/// A single channel 8-bit image.
pub type GrayImage = Image<u8, 1>;

impl<T, const C: usize> Image<T, C> {
    /// Create a new image from contiguous pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use bilateral_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 1>::new(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     vec![0u8; 10 * 20],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.stride(), 10);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        Self::from_strided(size, size.width * C, data)
    }

    /// Create a new image from pixel data with an explicit row stride.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `stride` - The number of elements between the start of two consecutive rows.
    /// * `data` - The pixel data of the image, `size.height * stride` elements.
    ///
    /// # Errors
    ///
    /// Returns an error if the stride is shorter than a row or if the data
    /// length is not `size.height * stride`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bilateral_image::{Image, ImageSize};
    ///
    /// // 3x2 image stored with one padding byte per row
    /// let image = Image::<u8, 1>::from_strided(
    ///     ImageSize { width: 3, height: 2 },
    ///     4,
    ///     vec![1, 2, 3, 0, 4, 5, 6, 0],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(image.row(1), &[4, 5, 6]);
    /// assert!(!image.is_contiguous());
    /// ```
    pub fn from_strided(size: ImageSize, stride: usize, data: Vec<T>) -> Result<Self, ImageError> {
        let row_len = size
            .width
            .checked_mul(C)
            .ok_or(ImageError::InvalidStride(stride, usize::MAX))?;
        if stride < row_len {
            return Err(ImageError::InvalidStride(stride, row_len));
        }

        let expected = size.height.checked_mul(stride).unwrap_or(usize::MAX);
        if data.len() != expected {
            return Err(ImageError::InvalidChannelShape(data.len(), expected));
        }

        Ok(Self { size, stride, data })
    }

    /// Create a new contiguous image with the given size filled with `val`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::AllocationFailed`] if the buffer cannot be
    /// allocated, including when its length overflows.
    ///
    /// # Examples
    ///
    /// ```
    /// use bilateral_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 1>::from_size_val(
    ///     ImageSize { width: 10, height: 20 },
    ///     0u8,
    /// )
    /// .unwrap();
    ///
    /// assert!(image.as_slice().iter().all(|&v| v == 0));
    /// ```
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let len = size
            .width
            .checked_mul(size.height)
            .and_then(|n| n.checked_mul(C))
            .ok_or(ImageError::AllocationFailed(size.width, size.height))?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| ImageError::AllocationFailed(size.width, size.height))?;
        data.resize(len, val);

        Image::new(size, data)
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.width()
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.height()
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of elements between the start of two consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Whether the rows are packed without padding between them.
    pub fn is_contiguous(&self) -> bool {
        self.stride == self.size.width * C
    }

    /// Get the raw buffer of the image, row padding included.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the raw mutable buffer of the image, row padding included.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Get the pixel data of row `y` without the trailing row padding.
    ///
    /// # Panics
    ///
    /// Panics if `y` is out of bounds.
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.stride;
        &self.data[start..start + self.size.width * C]
    }

    /// Get the mutable pixel data of row `y` without the trailing row padding.
    ///
    /// # Panics
    ///
    /// Panics if `y` is out of bounds.
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.stride;
        let len = self.size.width * C;
        &mut self.data[start..start + len]
    }

    /// Copy the image into a new image whose rows are packed.
    pub fn to_contiguous(&self) -> Image<T, C>
    where
        T: Clone,
    {
        if self.is_contiguous() {
            return self.clone();
        }

        let mut data = Vec::with_capacity(self.size.width * self.size.height * C);
        for y in 0..self.height() {
            data.extend_from_slice(self.row(y));
        }

        Image {
            size: self.size,
            stride: self.size.width * C,
            data,
        }
    }

}

#[cfg(test)]
mod tests {
    use crate::image::{GrayImage, Image, ImageError, ImageSize};

    #[test]
    fn image_size() {
        let image_size = ImageSize {
            width: 10,
            height: 20,
        };
        assert_eq!(image_size.width, 10);
        assert_eq!(image_size.height, 20);
    }

    #[test]
    fn image_smoke() -> Result<(), ImageError> {
        let image = GrayImage::new(
            ImageSize {
                width: 10,
                height: 20,
            },
            vec![0u8; 10 * 20],
        )?;
        assert_eq!(image.size().width, 10);
        assert_eq!(image.size().height, 20);
        assert_eq!(image.rows(), 20);
        assert_eq!(image.cols(), 10);
        assert!(image.is_contiguous());

        Ok(())
    }

    #[test]
    fn image_invalid_length() {
        let res = GrayImage::new(
            ImageSize {
                width: 3,
                height: 3,
            },
            vec![0u8; 8],
        );
        assert_eq!(res, Err(ImageError::InvalidChannelShape(8, 9)));
    }

    #[test]
    fn image_invalid_stride() {
        let res = Image::<u8, 2>::from_strided(
            ImageSize {
                width: 3,
                height: 2,
            },
            5,
            vec![0u8; 10],
        );
        assert_eq!(res, Err(ImageError::InvalidStride(5, 6)));
    }

    #[test]
    fn image_strided_rows() -> Result<(), ImageError> {
        let image = GrayImage::from_strided(
            ImageSize {
                width: 2,
                height: 3,
            },
            4,
            vec![1, 2, 99, 99, 3, 4, 99, 99, 5, 6, 99, 99],
        )?;
        assert_eq!(image.row(0), &[1, 2]);
        assert_eq!(image.row(2), &[5, 6]);
        assert_eq!(image.as_slice()[image.stride() + 1], 4);

        let packed = image.to_contiguous();
        assert!(packed.is_contiguous());
        assert_eq!(packed.as_slice(), &[1, 2, 3, 4, 5, 6]);

        Ok(())
    }

    #[test]
    fn image_row_mut() -> Result<(), ImageError> {
        let mut image = GrayImage::from_size_val(
            ImageSize {
                width: 3,
                height: 2,
            },
            0,
        )?;
        image.row_mut(1).copy_from_slice(&[1, 2, 3]);
        assert_eq!(image.as_slice(), &[0, 0, 0, 1, 2, 3]);

        Ok(())
    }

    #[test]
    fn image_allocation_failed() {
        let size = ImageSize {
            width: usize::MAX / 2,
            height: 3,
        };
        assert_eq!(
            GrayImage::from_size_val(size, 0),
            Err(ImageError::AllocationFailed(usize::MAX / 2, 3))
        );

        let size = ImageSize {
            width: isize::MAX as usize,
            height: 1,
        };
        assert_eq!(
            GrayImage::from_size_val(size, 0),
            Err(ImageError::AllocationFailed(isize::MAX as usize, 1))
        );
    }

    #[test]
    fn image_overflowing_stride() {
        let res = Image::<u8, 3>::from_strided(
            ImageSize {
                width: usize::MAX / 2,
                height: 0,
            },
            8,
            vec![],
        );
        assert_eq!(res, Err(ImageError::InvalidStride(8, usize::MAX)));

        let res = GrayImage::from_strided(
            ImageSize {
                width: 1,
                height: usize::MAX,
            },
            2,
            vec![],
        );
        assert_eq!(res, Err(ImageError::InvalidChannelShape(0, usize::MAX)));
    }
}
