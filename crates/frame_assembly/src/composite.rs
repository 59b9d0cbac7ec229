//! Composite frame assembler: side-by-side multi-camera canvases.

use contracts::{CompositeFrame, Image, PixelBuffer, PixelType, ResolvedCameraFrame};

use crate::{FrameError, ImageRole};

/// Merge resolved cameras, in the given order, into one composite frame.
///
/// Camera 0 fixes the slot size and the canonical color and depth pixel
/// types; every other camera must agree with it.
pub fn assemble(
    sequence: u64,
    cameras: Vec<ResolvedCameraFrame>,
) -> Result<CompositeFrame, FrameError> {
    let first = cameras.first().ok_or(FrameError::EmptyGroup)?;
    let (width, height) = first.color.dimensions();
    let color_type = pixel_type(first.index, ImageRole::Color, &first.color)?;
    let depth_type = pixel_type(first.index, ImageRole::Depth, &first.depth)?;

    for camera in &cameras {
        check_member(camera, (width, height), color_type, depth_type)?;
    }

    let canvas_width = u32::try_from(cameras.len())
        .ok()
        .and_then(|count| width.checked_mul(count))
        .ok_or_else(|| malformed(first.index, ImageRole::Color, &first.color))?;
    let mut color = PixelBuffer::zeroed(color_type, canvas_width, height);
    let mut depth = PixelBuffer::zeroed(depth_type, canvas_width, height);
    let mut camera_models = Vec::with_capacity(cameras.len());
    let mut stamp = first.stamp;

    for (slot, camera) in cameras.into_iter().enumerate() {
        if !color.copy_into_slot(slot as u32, &camera.color) {
            return Err(malformed(camera.index, ImageRole::Color, &camera.color));
        }
        if !depth.copy_into_slot(slot as u32, &camera.depth) {
            return Err(malformed(camera.index, ImageRole::Depth, &camera.depth));
        }
        stamp = stamp.max(camera.stamp);
        camera_models.push(camera.model);
    }

    Ok(CompositeFrame {
        sequence,
        stamp,
        color,
        depth,
        camera_models,
    })
}

fn pixel_type(camera: usize, role: ImageRole, image: &Image) -> Result<PixelType, FrameError> {
    image
        .encoding
        .pixel_type()
        .ok_or_else(|| FrameError::UnsupportedEncoding {
            camera,
            role,
            encoding: image.encoding.clone(),
        })
}

fn check_member(
    camera: &ResolvedCameraFrame,
    size: (u32, u32),
    color_type: PixelType,
    depth_type: PixelType,
) -> Result<(), FrameError> {
    for (role, image, expected) in [
        (ImageRole::Color, &camera.color, color_type),
        (ImageRole::Depth, &camera.depth, depth_type),
    ] {
        if image.dimensions() != size {
            return Err(FrameError::DimensionMismatch {
                camera: camera.index,
                role,
                expected: size,
                actual: image.dimensions(),
            });
        }
        let actual = pixel_type(camera.index, role, image)?;
        if actual != expected {
            return Err(FrameError::PixelTypeMismatch {
                camera: camera.index,
                role,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

fn malformed(camera: usize, role: ImageRole, image: &Image) -> FrameError {
    FrameError::MalformedBuffer {
        camera,
        role,
        step: image.step,
        height: image.height,
        len: image.data.len(),
        row_len: image.row_len().unwrap_or(0),
    }
}
