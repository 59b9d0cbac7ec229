//! # Frame Assembly
//!
//! Turns one synchronized group of raw camera inputs into a
//! [`CompositeFrame`]:
//!
//! 1. [`validate`]: encodings, color/depth geometry, buffer layout
//! 2. [`normalize`]: color to 8-bit intensity
//! 3. [`resolve`]: effective stamp and camera-to-base transform
//! 4. [`composite`]: side-by-side canvases and ordered camera models
//!
//! Per-group processing has no side effects; the first error abandons the
//! group and nothing partial escapes.

pub mod composite;
mod error;
pub mod normalize;
pub mod resolve;
pub mod validate;

use contracts::{CameraInput, CompositeFrame, TransformLookup};
use tracing::instrument;

pub use composite::assemble;
pub use error::{FrameError, ImageRole};
pub use normalize::to_mono8;
pub use resolve::{effective_stamp, resolve_camera};
pub use validate::{validate_camera, FrameValidator};

/// Run the full pipeline over one group, cameras in placement order.
#[instrument(
    level = "debug",
    name = "assemble_group",
    skip(cameras, lookup),
    fields(cameras = cameras.len())
)]
pub fn assemble_group<L>(
    sequence: u64,
    cameras: Vec<CameraInput>,
    base_frame: &str,
    lookup: &L,
) -> Result<CompositeFrame, FrameError>
where
    L: TransformLookup + ?Sized,
{
    let mut validator = FrameValidator::new();
    let mut resolved = Vec::with_capacity(cameras.len());

    for (index, camera) in cameras.into_iter().enumerate() {
        validator.check(index, &camera.color, &camera.depth)?;

        let color = to_mono8(&camera.color).ok_or_else(|| FrameError::UnsupportedEncoding {
            camera: index,
            role: ImageRole::Color,
            encoding: camera.color.encoding.clone(),
        })?;

        resolved.push(resolve_camera(
            index,
            color,
            camera.depth,
            &camera.info,
            base_frame,
            lookup,
        )?);
    }

    assemble(sequence, resolved)
}
