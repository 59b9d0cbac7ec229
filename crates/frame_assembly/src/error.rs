//! Frame assembly errors.
//!
//! Every variant abandons the current group only; none is fatal.

use std::fmt;

use contracts::{ImageEncoding, PixelType, Stamp};
use thiserror::Error;

/// Which image of a camera an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Color,
    Depth,
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color => f.write_str("color"),
            Self::Depth => f.write_str("depth"),
        }
    }
}

/// Group assembly failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("camera {camera}: unsupported {role} encoding '{encoding}'")]
    UnsupportedEncoding {
        camera: usize,
        role: ImageRole,
        encoding: ImageEncoding,
    },

    /// Color and depth of one camera differ, or a camera differs from camera 0
    #[error(
        "camera {camera}: {role} image is {}x{}, expected {}x{}",
        .actual.0, .actual.1, .expected.0, .expected.1
    )]
    DimensionMismatch {
        camera: usize,
        role: ImageRole,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error(
        "camera {camera}: malformed {role} buffer (step {step}, height {height}, {len} bytes, row needs {row_len})"
    )]
    MalformedBuffer {
        camera: usize,
        role: ImageRole,
        step: u32,
        height: u32,
        len: usize,
        row_len: usize,
    },

    #[error("camera {camera}: no transform from '{source_frame}' to '{target_frame}' at {stamp}")]
    TransformUnavailable {
        camera: usize,
        target_frame: String,
        source_frame: String,
        stamp: Stamp,
    },

    /// A camera's pixel layout differs from camera 0's
    #[error("camera {camera}: {role} pixel type {actual} differs from {expected}")]
    PixelTypeMismatch {
        camera: usize,
        role: ImageRole,
        expected: PixelType,
        actual: PixelType,
    },

    #[error("cannot assemble a frame from zero cameras")]
    EmptyGroup,
}

impl FrameError {
    /// Stable label for metrics and drop statistics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedEncoding { .. } => "unsupported_encoding",
            Self::DimensionMismatch { .. } => "dimension_mismatch",
            Self::MalformedBuffer { .. } => "malformed_buffer",
            Self::TransformUnavailable { .. } => "transform_unavailable",
            Self::PixelTypeMismatch { .. } => "pixel_type_mismatch",
            Self::EmptyGroup => "empty_group",
        }
    }

    /// Camera the failure refers to, if any
    pub fn camera(&self) -> Option<usize> {
        match self {
            Self::UnsupportedEncoding { camera, .. }
            | Self::DimensionMismatch { camera, .. }
            | Self::MalformedBuffer { camera, .. }
            | Self::TransformUnavailable { camera, .. }
            | Self::PixelTypeMismatch { camera, .. } => Some(*camera),
            Self::EmptyGroup => None,
        }
    }
}
