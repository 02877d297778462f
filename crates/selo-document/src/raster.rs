// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster codec helpers — conversions between the pipeline's `RasterImage`
// value and the `image` crate's types, plus PNG encode/decode for bridges
// whose rasterizer hands back encoded bytes.

use image::{DynamicImage, ImageFormat, RgbaImage};
use selo_core::error::SeloError;
use selo_core::types::RasterImage;

/// Decode an encoded image (PNG, JPEG, …) into a `RasterImage`.
pub fn decode(data: &[u8]) -> Result<RasterImage, SeloError> {
    let img = image::load_from_memory(data)
        .map_err(|err| SeloError::Image(format!("failed to decode raster: {err}")))?;
    Ok(from_dynamic(&img))
}

/// Encode a `RasterImage` as PNG bytes.
pub fn encode_png(raster: &RasterImage) -> Result<Vec<u8>, SeloError> {
    let img = to_dynamic(raster)?;
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    img.write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| SeloError::Image(format!("PNG encoding failed: {err}")))?;
    Ok(buffer)
}

/// Convert a decoded `image` crate value into the pipeline's raster type.
pub fn from_dynamic(img: &DynamicImage) -> RasterImage {
    let rgba = img.to_rgba8();
    RasterImage {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    }
}

/// Reinterpret a `RasterImage` as an `image` crate value.
pub fn to_dynamic(raster: &RasterImage) -> Result<DynamicImage, SeloError> {
    let buffer = RgbaImage::from_raw(raster.width, raster.height, raster.pixels.clone())
        .ok_or_else(|| {
            SeloError::Image(format!(
                "raster buffer does not match {}x{} RGBA8",
                raster.width, raster.height
            ))
        })?;
    Ok(DynamicImage::ImageRgba8(buffer))
}

/// Build a solid-colour raster. Used by benches and synthetic tests.
pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RasterImage {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for _ in 0..(width as usize * height as usize) {
        pixels.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
    }
    RasterImage {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_round_trip_preserves_pixels() {
        let original = solid(4, 3, [200, 10, 30]);
        let png = encode_png(&original).expect("encode");
        let decoded = decode(&png).expect("decode");
        assert_eq!(decoded, original);
    }

    #[test]
    fn to_dynamic_rejects_short_buffer() {
        let broken = RasterImage {
            width: 4,
            height: 4,
            pixels: vec![0u8; 10],
        };
        assert!(to_dynamic(&broken).is_err());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode(b"not an image").is_err());
    }
}
