use bilateral_image::{Image, ImageError, ImageSize};

/// Maps index `i` to a valid index within `[0, len)` by mirroring at the
/// borders without repeating the edge element.
///
/// Example: ...d c b | a b c d | c b a...
///
/// Indices further away than one image length keep reflecting until they
/// land in range. A length of one maps every index to `0`. `len` must be
/// greater than zero.
///
/// # Example
///
/// ```rust
/// use bilateral_imgproc::padding::reflect101_index;
///
/// // 0 1 2 3 | 2 1 0 1
/// assert_eq!(reflect101_index(-1, 4), 1);
/// assert_eq!(reflect101_index(5, 4), 1);
/// assert_eq!(reflect101_index(6, 4), 0);
/// ```
#[inline]
pub fn reflect101_index(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let len = len as isize;
    let mut i = i;
    while i < 0 || i >= len {
        if i < 0 {
            i = -i;
        } else {
            i = 2 * len - i - 2;
        }
    }
    i as usize
}

/// Represents 2D padding with top, bottom, left, and right values (in pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding2D {
    /// Amount of padding to add on the top side.
    pub top: usize,
    /// Amount of padding to add on the bottom side.
    pub bottom: usize,
    /// Amount of padding to add on the left side.
    pub left: usize,
    /// Amount of padding to add on the right side.
    pub right: usize,
}

impl Padding2D {
    /// The same padding on all four sides.
    pub fn uniform(pad: usize) -> Self {
        Self {
            top: pad,
            bottom: pad,
            left: pad,
            right: pad,
        }
    }

    /// Size of an image of `size` once this padding is applied.
    ///
    /// Saturates at `usize::MAX`, a size no image buffer can be allocated for.
    pub fn padded_size(&self, size: ImageSize) -> ImageSize {
        ImageSize {
            width: size
                .width
                .saturating_add(self.left)
                .saturating_add(self.right),
            height: size
                .height
                .saturating_add(self.top)
                .saturating_add(self.bottom),
        }
    }
}

/// Pads `src` into `dst`, centering the source and filling the border by
/// reflect-101 mirroring, see [`reflect101_index`].
///
/// The source may be strided; rows of `dst` are written up to its width and
/// any row padding of `dst` is left untouched.
///
/// # Arguments
///
/// * `src` - The source image to pad.
/// * `dst` - The destination image where the padded output will be stored.
/// * `padding` - The amount of padding (in pixels) for all four sides.
///
/// # Errors
///
/// Returns an error if the size of `dst` does not match the size of `src`
/// grown by `padding`, or if `src` is empty.
///
/// # Example
///
/// ```rust
/// use bilateral_image::{Image, ImageSize};
/// use bilateral_imgproc::padding::{spatial_padding, Padding2D};
///
/// let src = Image::<u8, 1>::new(ImageSize { width: 3, height: 1 }, vec![1, 2, 3]).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val(ImageSize { width: 5, height: 1 }, 0).unwrap();
///
/// let padding = Padding2D { top: 0, bottom: 0, left: 1, right: 1 };
/// spatial_padding(&src, &mut dst, padding).unwrap();
///
/// assert_eq!(dst.as_slice(), &[2, 1, 2, 3, 2]);
/// ```
pub fn spatial_padding<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    padding: Padding2D,
) -> Result<(), ImageError>
where
    T: Copy,
{
    let expected = padding.padded_size(src.size());
    if expected != dst.size() {
        return Err(ImageError::InvalidImageSize(
            dst.width(),
            dst.height(),
            expected.width,
            expected.height,
        ));
    }

    let old_width = src.width();
    let old_height = src.height();

    if old_width == 0 || old_height == 0 {
        return Err(ImageError::InvalidImageSize(old_width, old_height, 1, 1));
    }

    // precompute the source column of every destination column
    let col_map = (0..dst.width())
        .map(|x| reflect101_index(x as isize - padding.left as isize, old_width))
        .collect::<Vec<_>>();

    for y in 0..dst.height() {
        let src_y = reflect101_index(y as isize - padding.top as isize, old_height);
        let src_row = src.row(src_y);
        let dst_row = dst.row_mut(y);

        // copy the row center in one go, then the borders pixel by pixel
        let center = padding.left * C..(padding.left + old_width) * C;
        dst_row[center].copy_from_slice(src_row);

        for (x, px) in dst_row.chunks_exact_mut(C).enumerate() {
            if x >= padding.left && x < padding.left + old_width {
                continue;
            }
            let src_x = col_map[x];
            px.copy_from_slice(&src_row[src_x * C..(src_x + 1) * C]);
        }
    }

    Ok(())
}

/// Pads a single channel image by `radius` pixels on every side with
/// reflect-101 borders, returning a new contiguous image.
///
/// # Errors
///
/// Returns an error if the source image is empty or if the padded image
/// cannot be allocated.
pub fn pad_reflect101<T: Copy + Default>(
    src: &Image<T, 1>,
    radius: usize,
) -> Result<Image<T, 1>, ImageError> {
    let padding = Padding2D::uniform(radius);
    let mut dst = Image::from_size_val(padding.padded_size(src.size()), T::default())?;
    spatial_padding(src, &mut dst, padding)?;
    Ok(dst)
}
