//! Camera calibration and the geometric model attached to composite frames.

use nalgebra::Isometry3;
use serde::{Deserialize, Serialize};

use crate::Header;

const IDENTITY_3X3: [f64; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

fn identity_rectification() -> [f64; 9] {
    IDENTITY_3X3
}

/// Calibration message
///
/// Intrinsics plus resolution, as published next to every color image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraInfo {
    pub header: Header,

    pub width: u32,

    pub height: u32,

    #[serde(default)]
    pub distortion_model: String,

    /// Distortion coefficients
    #[serde(default)]
    pub d: Vec<f64>,

    /// Intrinsic matrix, row-major 3x3
    pub k: [f64; 9],

    /// Rectification matrix, row-major 3x3
    #[serde(default = "identity_rectification")]
    pub r: [f64; 9],

    /// Projection matrix, row-major 3x4. All zeros when uncalibrated.
    #[serde(default)]
    pub p: [f64; 12],

    /// Fixed transform from the optical sensor to the frame named in the
    /// image header, when the rig publishes one.
    #[serde(default)]
    pub sensor_to_rig: Option<Isometry3<f64>>,
}

impl CameraInfo {
    /// Pinhole calibration without distortion, with `P` mirroring `K`.
    pub fn pinhole(
        header: Header,
        width: u32,
        height: u32,
        fx: f64,
        fy: f64,
        cx: f64,
        cy: f64,
    ) -> Self {
        Self {
            header,
            width,
            height,
            distortion_model: "plumb_bob".to_string(),
            d: vec![0.0; 5],
            k: [fx, 0.0, cx, 0.0, fy, cy, 0.0, 0.0, 1.0],
            r: IDENTITY_3X3,
            p: [fx, 0.0, cx, 0.0, 0.0, fy, cy, 0.0, 0.0, 0.0, 1.0, 0.0],
            sensor_to_rig: None,
        }
    }
}

/// Geometric model of one camera inside a composite frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraModel {
    /// Source frame id of the camera
    pub name: String,

    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,

    pub width: u32,
    pub height: u32,

    /// Sensor-to-robot-base transform resolved at the camera's effective stamp
    pub local_transform: Isometry3<f64>,
}

impl CameraModel {
    /// Build from calibration.
    ///
    /// Uses the projection matrix when it is populated (rectified images),
    /// otherwise the raw intrinsic matrix.
    pub fn from_camera_info(info: &CameraInfo, local_transform: Isometry3<f64>) -> Self {
        let (fx, fy, cx, cy) = if info.p[0] != 0.0 {
            (info.p[0], info.p[5], info.p[2], info.p[6])
        } else {
            (info.k[0], info.k[4], info.k[2], info.k[5])
        };
        Self {
            name: info.header.frame_id.to_string(),
            fx,
            fy,
            cx,
            cy,
            width: info.width,
            height: info.height,
            local_transform,
        }
    }

    /// True when the intrinsics can be used to project points.
    pub fn is_valid_for_projection(&self) -> bool {
        self.fx > 0.0 && self.fy > 0.0 && self.cx > 0.0 && self.cy > 0.0
    }
}
