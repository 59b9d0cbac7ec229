//! Per-camera input units.

use serde::{Deserialize, Serialize};

use crate::{CameraInfo, Header, Image, Stamp};

/// Combined rig message: one camera's color, depth and calibration in one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RgbdImage {
    pub header: Header,

    pub rgb: Image,

    pub depth: Image,

    pub camera_info: CameraInfo,
}

impl RgbdImage {
    #[inline]
    pub fn stamp(&self) -> Stamp {
        self.header.stamp
    }

    pub fn into_camera_input(self) -> CameraInput {
        CameraInput {
            color: self.rgb,
            depth: self.depth,
            info: self.camera_info,
        }
    }
}

/// One camera's raw input after synchronization, however it was delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraInput {
    pub color: Image,

    pub depth: Image,

    pub info: CameraInfo,
}
