//! Stamp resolver: effective capture time and camera-to-base transform.

use contracts::{CameraInfo, CameraModel, Image, ResolvedCameraFrame, Stamp, TransformLookup};
use tracing::warn;

use crate::FrameError;

/// Effective capture time of a camera: the later of its two images.
#[inline]
pub fn effective_stamp(color: &Image, depth: &Image) -> Stamp {
    color.stamp().max(depth.stamp())
}

/// Resolve one camera's stamp and geometry.
///
/// `color` is the already normalized intensity image. The transform maps the
/// color image's frame into `base_frame` at the effective stamp, followed by
/// the calibration's fixed sensor offset when it carries one.
pub fn resolve_camera<L>(
    camera: usize,
    color: Image,
    depth: Image,
    info: &CameraInfo,
    base_frame: &str,
    lookup: &L,
) -> Result<ResolvedCameraFrame, FrameError>
where
    L: TransformLookup + ?Sized,
{
    let stamp = effective_stamp(&color, &depth);
    let source = color.frame_id().normalized();
    let target = base_frame.strip_prefix('/').unwrap_or(base_frame);

    let Some(base_from_frame) = lookup.lookup(target, source, stamp) else {
        warn!(
            camera,
            target_frame = target,
            source_frame = source,
            %stamp,
            "transform unavailable, dropping group"
        );
        return Err(FrameError::TransformUnavailable {
            camera,
            target_frame: target.to_string(),
            source_frame: source.to_string(),
            stamp,
        });
    };

    let local_transform = match info.sensor_to_rig {
        Some(sensor_to_rig) => base_from_frame * sensor_to_rig,
        None => base_from_frame,
    };

    Ok(ResolvedCameraFrame {
        index: camera,
        model: CameraModel::from_camera_info(info, local_transform),
        color,
        depth,
        stamp,
    })
}
