use bilateral_image::GrayImage;

use crate::error::BilateralError;
use crate::filter::{Backend, BilateralParams, FilterOutput};

/// An external, accelerated implementation of the bilateral filter.
///
/// Implementors upload the image, run their own kernel with the same
/// diameter and sigmas, and download an image of the same size. The border
/// mode is expected to be reflect-101.
pub trait BilateralAccelerator: Send + Sync {
    /// Human readable name of the accelerator, used in logs and [`Backend::Accelerator`].
    fn name(&self) -> &str;

    /// Filter `src` with the given parameters.
    ///
    /// # Errors
    ///
    /// Returns [`BilateralError::Accelerator`] if the device fails.
    fn bilateral_filter(
        &self,
        src: &GrayImage,
        params: &BilateralParams,
    ) -> Result<GrayImage, BilateralError>;
}

/// Run the bilateral filter on an accelerator.
///
/// Without an accelerator the input is returned unchanged and tagged as
/// [`Backend::Passthrough`].
///
/// # Errors
///
/// Returns an error if the parameters are invalid, if the accelerator fails
/// or if it returns an image of a different size.
pub fn filter_accelerated(
    src: &GrayImage,
    params: &BilateralParams,
    accelerator: Option<&dyn BilateralAccelerator>,
) -> Result<FilterOutput, BilateralError> {
    params.validate()?;

    let Some(accelerator) = accelerator else {
        log::warn!(
            "no bilateral accelerator registered, returning the input ({}) unfiltered",
            src.size()
        );
        return Ok(FilterOutput {
            image: src.to_contiguous(),
            backend: Backend::Passthrough,
        });
    };

    log::debug!(
        "bilateral filter {} on accelerator {} diameter: {}",
        src.size(),
        accelerator.name(),
        params.diameter
    );

    let image = accelerator.bilateral_filter(src, params)?;
    if image.size() != src.size() {
        return Err(BilateralError::AcceleratorShapeMismatch(
            src.size(),
            image.size(),
        ));
    }

    Ok(FilterOutput {
        image,
        backend: Backend::Accelerator(accelerator.name().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{bilateral_filter, BilateralFilter, ExecutionMode};
    use crate::parallel::ExecutionStrategy;
    use bilateral_image::ImageSize;

    /// Runs the CPU filter behind the accelerator interface.
    struct HostAccelerator;

    impl BilateralAccelerator for HostAccelerator {
        fn name(&self) -> &str {
            "host"
        }

        fn bilateral_filter(
            &self,
            src: &GrayImage,
            params: &BilateralParams,
        ) -> Result<GrayImage, BilateralError> {
            let mut dst = GrayImage::from_size_val(src.size(), 0)?;
            bilateral_filter(src, &mut dst, params, ExecutionStrategy::Fixed(2))?;
            Ok(dst)
        }
    }

    /// Always returns a 1x1 image.
    struct ShrinkingAccelerator;

    impl BilateralAccelerator for ShrinkingAccelerator {
        fn name(&self) -> &str {
            "shrinking"
        }

        fn bilateral_filter(
            &self,
            _src: &GrayImage,
            _params: &BilateralParams,
        ) -> Result<GrayImage, BilateralError> {
            Ok(GrayImage::from_size_val(
                ImageSize {
                    width: 1,
                    height: 1,
                },
                0,
            )?)
        }
    }

    struct FailingAccelerator;

    impl BilateralAccelerator for FailingAccelerator {
        fn name(&self) -> &str {
            "failing"
        }

        fn bilateral_filter(
            &self,
            _src: &GrayImage,
            _params: &BilateralParams,
        ) -> Result<GrayImage, BilateralError> {
            Err(BilateralError::Accelerator("device lost".to_string()))
        }
    }

    fn make_step() -> Result<GrayImage, BilateralError> {
        Ok(GrayImage::new(
            ImageSize {
                width: 4,
                height: 2,
            },
            vec![0, 0, 255, 255, 0, 0, 255, 255],
        )?)
    }

    #[test]
    fn test_passthrough_without_accelerator() -> Result<(), BilateralError> {
        let src = make_step()?;
        let out = filter_accelerated(&src, &BilateralParams::new(3, 1.0, 1.0), None)?;

        assert_eq!(out.backend, Backend::Passthrough);
        assert!(!out.is_filtered());
        assert_eq!(out.image, src);
        Ok(())
    }

    #[test]
    fn test_passthrough_strided_input() -> Result<(), BilateralError> {
        let src = GrayImage::from_strided(
            ImageSize {
                width: 2,
                height: 2,
            },
            4,
            vec![1, 2, 0, 0, 3, 4, 0, 0],
        )?;
        let out = filter_accelerated(&src, &BilateralParams::default(), None)?;

        assert_eq!(out.image.as_slice(), &[1, 2, 3, 4]);
        Ok(())
    }

    #[test]
    fn test_registered_accelerator() -> Result<(), BilateralError> {
        let src = make_step()?;
        let params = BilateralParams::new(3, 30.0, 5.0);

        let accelerated = BilateralFilter::new(params)
            .with_mode(ExecutionMode::Accelerator)
            .with_accelerator(&HostAccelerator)
            .apply(&src)?;
        let cpu = BilateralFilter::new(params)
            .with_mode(ExecutionMode::Cpu(ExecutionStrategy::Serial))
            .apply(&src)?;

        assert_eq!(accelerated.backend, Backend::Accelerator("host".to_string()));
        assert_eq!(accelerated.image, cpu.image);
        Ok(())
    }

    #[test]
    fn test_accelerator_shape_mismatch() -> Result<(), BilateralError> {
        let src = make_step()?;
        let res = filter_accelerated(
            &src,
            &BilateralParams::default(),
            Some(&ShrinkingAccelerator),
        );

        assert_eq!(
            res,
            Err(BilateralError::AcceleratorShapeMismatch(
                src.size(),
                ImageSize {
                    width: 1,
                    height: 1
                }
            ))
        );
        Ok(())
    }

    #[test]
    fn test_accelerator_error() -> Result<(), BilateralError> {
        let src = make_step()?;
        let res = filter_accelerated(&src, &BilateralParams::default(), Some(&FailingAccelerator));

        assert_eq!(
            res,
            Err(BilateralError::Accelerator("device lost".to_string()))
        );
        Ok(())
    }

    #[test]
    fn test_accelerator_invalid_params() -> Result<(), BilateralError> {
        let src = make_step()?;
        let res = filter_accelerated(
            &src,
            &BilateralParams::default().with_diameter(2),
            Some(&HostAccelerator),
        );

        assert_eq!(res, Err(BilateralError::InvalidDiameter(2)));
        Ok(())
    }
}
