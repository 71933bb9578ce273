/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the row stride cannot hold a full row.
    #[error("Row stride ({0}) is smaller than the row length ({1})")]
    InvalidStride(usize, usize),

    /// Error when the image size does not match the expected size.
    #[error("Invalid image size ({0}x{1}), expected ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the pixel buffer of an image cannot be allocated.
    #[error("Failed to allocate an image of size ({0}x{1})")]
    AllocationFailed(usize, usize),
}
