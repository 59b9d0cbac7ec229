//! Color normalizer: any supported color encoding to 8-bit intensity.

use bytes::Bytes;
use contracts::{Image, ImageEncoding};

// ITU-R BT.601 luma weights in 14-bit fixed point
const LUMA_SHIFT: u32 = 14;
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_ROUND: u32 = 1 << (LUMA_SHIFT - 1);

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * LUMA_R + g as u32 * LUMA_G + b as u32 * LUMA_B + LUMA_ROUND) >> LUMA_SHIFT) as u8
}

/// Convert a color image to `mono8`.
///
/// `mono8`/`8UC1` pass through sharing the payload. Returns `None` for
/// encodings outside the supported color set.
pub fn to_mono8(image: &Image) -> Option<Image> {
    let data: Vec<u8> = match image.encoding {
        ImageEncoding::Mono8 | ImageEncoding::Type8UC1 => {
            return Some(Image {
                encoding: ImageEncoding::Mono8,
                ..image.clone()
            });
        }
        ImageEncoding::Rgb8 => convert_rows(image, 3, |px| luma(px[0], px[1], px[2])),
        ImageEncoding::Bgr8 => convert_rows(image, 3, |px| luma(px[2], px[1], px[0])),
        // Keep the most significant byte
        ImageEncoding::Mono16 => convert_rows(image, 2, |px| {
            (bytemuck::pod_read_unaligned::<u16>(px) >> 8) as u8
        }),
        _ => return None,
    };

    Some(Image::new(
        image.header.clone(),
        image.width,
        image.height,
        ImageEncoding::Mono8,
        Bytes::from(data),
    ))
}

/// Map every `bpp`-byte pixel to one output byte, dropping row padding.
fn convert_rows(image: &Image, bpp: usize, f: impl Fn(&[u8]) -> u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(image.width as usize * image.height as usize);
    for row in image.rows() {
        out.extend(row.chunks_exact(bpp).map(&f));
    }
    out
}
