//! Frame validator: encoding, geometry and buffer-layout checks.

use contracts::Image;

use crate::{FrameError, ImageRole};

/// Validates the cameras of one group against camera 0
///
/// The first camera checked becomes the dimension reference for the rest.
#[derive(Debug, Default)]
pub struct FrameValidator {
    reference: Option<(u32, u32)>,
}

impl FrameValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimensions every camera must share, once the first camera passed.
    pub fn reference(&self) -> Option<(u32, u32)> {
        self.reference
    }

    /// Check one camera's color and depth images.
    pub fn check(&mut self, camera: usize, color: &Image, depth: &Image) -> Result<(), FrameError> {
        validate_camera(camera, color, depth)?;

        match self.reference {
            None => self.reference = Some(color.dimensions()),
            Some(expected) if expected != color.dimensions() => {
                return Err(FrameError::DimensionMismatch {
                    camera,
                    role: ImageRole::Color,
                    expected,
                    actual: color.dimensions(),
                });
            }
            Some(_) => {}
        }
        Ok(())
    }
}

/// Check a single camera in isolation.
pub fn validate_camera(camera: usize, color: &Image, depth: &Image) -> Result<(), FrameError> {
    if !color.encoding.is_supported_color() {
        return Err(FrameError::UnsupportedEncoding {
            camera,
            role: ImageRole::Color,
            encoding: color.encoding.clone(),
        });
    }
    if !depth.encoding.is_supported_depth() {
        return Err(FrameError::UnsupportedEncoding {
            camera,
            role: ImageRole::Depth,
            encoding: depth.encoding.clone(),
        });
    }
    if color.dimensions() != depth.dimensions() {
        return Err(FrameError::DimensionMismatch {
            camera,
            role: ImageRole::Depth,
            expected: color.dimensions(),
            actual: depth.dimensions(),
        });
    }

    check_layout(camera, ImageRole::Color, color)?;
    check_layout(camera, ImageRole::Depth, depth)
}

/// `step` must cover a full row and the payload must cover `step * height`.
fn check_layout(camera: usize, role: ImageRole, image: &Image) -> Result<(), FrameError> {
    let row_len = image.row_len().unwrap_or(0);
    let needed = (image.step as usize).checked_mul(image.height as usize);

    let well_formed = (image.step as usize) >= row_len
        && needed.is_some_and(|needed| image.data.len() >= needed);
    if well_formed {
        Ok(())
    } else {
        Err(FrameError::MalformedBuffer {
            camera,
            role,
            step: image.step,
            height: image.height,
            len: image.data.len(),
            row_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Header, ImageEncoding};

    fn image(width: u32, height: u32, encoding: ImageEncoding) -> Image {
        let len = (width * height) as usize * encoding.bytes_per_pixel().unwrap_or(1);
        Image::new(Header::default(), width, height, encoding, vec![0u8; len])
    }

    #[test]
    fn test_accepts_supported_pair() {
        let color = image(4, 3, ImageEncoding::Bgr8);
        let depth = image(4, 3, ImageEncoding::Type32FC1);
        assert!(validate_camera(0, &color, &depth).is_ok());
    }

    #[test]
    fn test_rejects_four_channel_color() {
        let color = image(4, 3, ImageEncoding::Rgba8);
        let depth = image(4, 3, ImageEncoding::Type16UC1);
        let err = validate_camera(0, &color, &depth).unwrap_err();
        assert_eq!(
            err,
            FrameError::UnsupportedEncoding {
                camera: 0,
                role: ImageRole::Color,
                encoding: ImageEncoding::Rgba8,
            }
        );
    }

    #[test]
    fn test_rejects_color_encoding_as_depth() {
        let color = image(4, 3, ImageEncoding::Mono8);
        let depth = image(4, 3, ImageEncoding::Rgb8);
        let err = validate_camera(2, &color, &depth).unwrap_err();
        assert_eq!(err.kind(), "unsupported_encoding");
        assert_eq!(err.camera(), Some(2));
    }

    #[test]
    fn test_rejects_color_depth_size_mismatch() {
        let color = image(4, 3, ImageEncoding::Mono8);
        let depth = image(4, 2, ImageEncoding::Type16UC1);
        assert!(matches!(
            validate_camera(0, &color, &depth),
            Err(FrameError::DimensionMismatch { role: ImageRole::Depth, .. })
        ));
    }

    #[test]
    fn test_rejects_truncated_payload() {
        let color = image(4, 3, ImageEncoding::Mono8);
        let mut depth = image(4, 3, ImageEncoding::Type16UC1);
        depth.data = depth.data.slice(..10);
        let err = validate_camera(0, &color, &depth).unwrap_err();
        assert!(matches!(
            err,
            FrameError::MalformedBuffer { role: ImageRole::Depth, len: 10, row_len: 8, .. }
        ));
    }

    #[test]
    fn test_rejects_short_step() {
        let mut color = image(4, 3, ImageEncoding::Rgb8);
        color.step = 6;
        let depth = image(4, 3, ImageEncoding::Mono16);
        assert_eq!(
            validate_camera(0, &color, &depth).unwrap_err().kind(),
            "malformed_buffer"
        );
    }

    #[test]
    fn test_batch_uses_first_camera_as_reference() {
        let mut validator = FrameValidator::new();
        validator
            .check(0, &image(4, 3, ImageEncoding::Mono8), &image(4, 3, ImageEncoding::Type16UC1))
            .unwrap();
        assert_eq!(validator.reference(), Some((4, 3)));

        let err = validator
            .check(1, &image(5, 3, ImageEncoding::Mono8), &image(5, 3, ImageEncoding::Type16UC1))
            .unwrap_err();
        assert_eq!(
            err,
            FrameError::DimensionMismatch {
                camera: 1,
                role: ImageRole::Color,
                expected: (4, 3),
                actual: (5, 3),
            }
        );
    }
}
