//! CompositeFrame - assembly output handed to the odometry engine.

use serde::{Deserialize, Serialize};

use crate::{CameraModel, Image, PixelType, Stamp};

/// Tightly packed, owned pixel canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelBuffer {
    pub width: u32,

    pub height: u32,

    pub pixel_type: PixelType,

    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a zero-filled canvas.
    pub fn zeroed(pixel_type: PixelType, width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * pixel_type.bytes_per_pixel();
        Self {
            width,
            height,
            pixel_type,
            data: vec![0u8; len],
        }
    }

    #[inline]
    pub fn row_len(&self) -> usize {
        self.width as usize * self.pixel_type.bytes_per_pixel()
    }

    /// Mutable bytes of row `y`, or `None` past the last row.
    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u8]> {
        let row_len = self.row_len();
        let start = y as usize * row_len;
        self.data.get_mut(start..start + row_len)
    }

    /// Raw bytes of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.pixel_type.bytes_per_pixel();
        let start = y as usize * self.row_len() + x as usize * bpp;
        self.data.get(start..start + bpp)
    }

    /// Copy `image` into horizontal slot `slot`, slots being `image.width` wide.
    ///
    /// Returns `false`, leaving the canvas partially written, when the image
    /// does not fit the slot or its payload is shorter than its geometry.
    pub fn copy_into_slot(&mut self, slot: u32, image: &Image) -> bool {
        let bpp = self.pixel_type.bytes_per_pixel();
        let slot_len = image.width as usize * bpp;
        let offset = slot as usize * slot_len;
        if image.height != self.height || offset + slot_len > self.row_len() {
            return false;
        }

        let mut copied = 0u32;
        for (y, src) in image.rows().enumerate() {
            if src.len() != slot_len {
                return false;
            }
            match self.row_mut(y as u32) {
                Some(dst) => dst[offset..offset + slot_len].copy_from_slice(src),
                None => return false,
            }
            copied += 1;
        }
        copied == self.height
    }
}

/// One camera after validation, color normalization and stamp resolution.
///
/// Invariant: `color` and `depth` share width and height.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCameraFrame {
    /// Placement index inside the composite frame
    pub index: usize,

    /// Single-channel 8-bit intensity image
    pub color: Image,

    /// Depth image, untouched
    pub depth: Image,

    pub model: CameraModel,

    /// Effective capture time, the later of the color and depth stamps
    pub stamp: Stamp,
}

/// Multi-camera frame consumed by the odometry engine
///
/// Camera `i` occupies columns `[i * w, (i + 1) * w)` of both canvases, and
/// `camera_models[i]` describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeFrame {
    /// Monotonically increasing per node
    pub sequence: u64,

    /// Latest effective stamp over all member cameras
    pub stamp: Stamp,

    pub color: PixelBuffer,

    pub depth: PixelBuffer,

    pub camera_models: Vec<CameraModel>,
}

impl CompositeFrame {
    #[inline]
    pub fn camera_count(&self) -> usize {
        self.camera_models.len()
    }

    /// Width of a single camera slot.
    pub fn camera_width(&self) -> u32 {
        match self.camera_models.len() {
            0 => 0,
            n => self.color.width / n as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_size() {
        let buffer = PixelBuffer::zeroed(PixelType::U16C1, 4, 3);
        assert_eq!(buffer.data.len(), 24);
        assert_eq!(buffer.row_len(), 8);
    }

    #[test]
    fn test_row_mut_bounds() {
        let mut buffer = PixelBuffer::zeroed(PixelType::U8C1, 2, 2);
        buffer.row_mut(1).unwrap().copy_from_slice(&[7, 9]);
        assert!(buffer.row_mut(2).is_none());
        assert_eq!(buffer.pixel(1, 1), Some(&[9u8][..]));
        assert_eq!(buffer.pixel(2, 0), None);
    }

    #[test]
    fn test_copy_into_slot() {
        let image = Image::new(
            crate::Header::default(),
            2,
            2,
            crate::ImageEncoding::Mono8,
            vec![1u8, 2, 3, 4],
        );
        let mut canvas = PixelBuffer::zeroed(PixelType::U8C1, 4, 2);
        assert!(canvas.copy_into_slot(1, &image));
        assert_eq!(canvas.data, vec![0, 0, 1, 2, 0, 0, 3, 4]);
        assert!(!canvas.copy_into_slot(2, &image));
    }

    #[test]
    fn test_copy_into_slot_rejects_short_payload() {
        let image = Image::new(
            crate::Header::default(),
            2,
            2,
            crate::ImageEncoding::Mono8,
            vec![1u8, 2, 3],
        );
        let mut canvas = PixelBuffer::zeroed(PixelType::U8C1, 2, 2);
        assert!(!canvas.copy_into_slot(0, &image));
    }
}
