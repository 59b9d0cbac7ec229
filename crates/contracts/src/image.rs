//! Image - raw 2D pixel buffers as delivered by the transport.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{FrameId, Stamp};

/// Message header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Capture time
    pub stamp: Stamp,

    /// Coordinate frame the data is expressed in
    pub frame_id: FrameId,
}

impl Header {
    pub fn new(stamp: Stamp, frame_id: impl Into<FrameId>) -> Self {
        Self {
            stamp,
            frame_id: frame_id.into(),
        }
    }
}

/// Per-pixel encoding tag, serialized by its conventional name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageEncoding {
    /// `mono8`
    Mono8,
    /// `8UC1`
    Type8UC1,
    /// `mono16`
    Mono16,
    /// `bgr8`
    Bgr8,
    /// `rgb8`
    Rgb8,
    /// `rgba8`
    Rgba8,
    /// `bgra8`
    Bgra8,
    /// `16UC1`, fixed-point depth in millimeters
    Type16UC1,
    /// `32FC1`, floating-point depth in meters
    Type32FC1,
    /// Anything else; never accepted by the validator
    Other(String),
}

impl ImageEncoding {
    pub fn from_name(name: &str) -> Self {
        match name {
            "mono8" => Self::Mono8,
            "8UC1" => Self::Type8UC1,
            "mono16" => Self::Mono16,
            "bgr8" => Self::Bgr8,
            "rgb8" => Self::Rgb8,
            "rgba8" => Self::Rgba8,
            "bgra8" => Self::Bgra8,
            "16UC1" => Self::Type16UC1,
            "32FC1" => Self::Type32FC1,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Mono8 => "mono8",
            Self::Type8UC1 => "8UC1",
            Self::Mono16 => "mono16",
            Self::Bgr8 => "bgr8",
            Self::Rgb8 => "rgb8",
            Self::Rgba8 => "rgba8",
            Self::Bgra8 => "bgra8",
            Self::Type16UC1 => "16UC1",
            Self::Type32FC1 => "32FC1",
            Self::Other(name) => name,
        }
    }

    /// Element layout, or `None` for encodings this crate does not know.
    pub fn pixel_type(&self) -> Option<PixelType> {
        match self {
            Self::Mono8 | Self::Type8UC1 => Some(PixelType::U8C1),
            Self::Bgr8 | Self::Rgb8 => Some(PixelType::U8C3),
            Self::Rgba8 | Self::Bgra8 => Some(PixelType::U8C4),
            Self::Mono16 | Self::Type16UC1 => Some(PixelType::U16C1),
            Self::Type32FC1 => Some(PixelType::F32C1),
            Self::Other(_) => None,
        }
    }

    pub fn bytes_per_pixel(&self) -> Option<usize> {
        self.pixel_type().map(PixelType::bytes_per_pixel)
    }

    /// Accepted color encodings: mono8, 8UC1, mono16, bgr8, rgb8.
    pub fn is_supported_color(&self) -> bool {
        matches!(
            self,
            Self::Mono8 | Self::Type8UC1 | Self::Mono16 | Self::Bgr8 | Self::Rgb8
        )
    }

    /// Accepted depth encodings: 16UC1, 32FC1, mono16.
    pub fn is_supported_depth(&self) -> bool {
        matches!(self, Self::Type16UC1 | Self::Type32FC1 | Self::Mono16)
    }

    /// Already single-channel 8-bit, i.e. usable as intensity without conversion.
    pub fn is_mono8(&self) -> bool {
        matches!(self, Self::Mono8 | Self::Type8UC1)
    }
}

impl From<String> for ImageEncoding {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<ImageEncoding> for String {
    fn from(encoding: ImageEncoding) -> Self {
        encoding.name().to_string()
    }
}

impl fmt::Display for ImageEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Element layout of a pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelType {
    U8C1,
    U8C3,
    U8C4,
    U16C1,
    F32C1,
}

impl PixelType {
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::U8C1 => 1,
            Self::U8C3 => 3,
            Self::U8C4 => 4,
            Self::U16C1 => 2,
            Self::F32C1 => 4,
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::U8C1 => "8UC1",
            Self::U8C3 => "8UC3",
            Self::U8C4 => "8UC4",
            Self::U16C1 => "16UC1",
            Self::F32C1 => "32FC1",
        };
        f.write_str(name)
    }
}

/// Image message
///
/// Pixel payload is a `Bytes` handle, so cloning an image or passing a mono8
/// image through the normalizer never copies pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub header: Header,

    pub width: u32,

    pub height: u32,

    pub encoding: ImageEncoding,

    /// Row stride in bytes
    pub step: u32,

    pub data: Bytes,
}

impl Image {
    /// Create a tightly packed image (`step = width * bytes_per_pixel`, saturating).
    pub fn new(
        header: Header,
        width: u32,
        height: u32,
        encoding: ImageEncoding,
        data: impl Into<Bytes>,
    ) -> Self {
        let bpp = encoding.bytes_per_pixel().unwrap_or(1) as u32;
        Self {
            header,
            width,
            height,
            encoding,
            step: width.saturating_mul(bpp),
            data: data.into(),
        }
    }

    #[inline]
    pub fn stamp(&self) -> Stamp {
        self.header.stamp
    }

    #[inline]
    pub fn frame_id(&self) -> &FrameId {
        &self.header.frame_id
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Meaningful bytes per row, excluding stride padding.
    pub fn row_len(&self) -> Option<usize> {
        self.encoding
            .bytes_per_pixel()
            .map(|bpp| bpp * self.width as usize)
    }

    /// Iterate over pixel rows with padding stripped.
    ///
    /// Yields at most `height` rows; a truncated payload simply yields fewer
    /// or shorter rows, which the frame validator rejects beforehand.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        let row_len = self.row_len().unwrap_or(0);
        let step = (self.step as usize).max(1);
        self.data
            .chunks(step)
            .take(self.height as usize)
            .map(move |row| &row[..row_len.min(row.len())])
    }
}
