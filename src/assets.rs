use std::path::Path;

use anyhow::{Context, Result};
use image::ImageReader;

/// Packs channels into the `0xRRGGBBAA` layout used for map cells and
/// texture pixels. The framebuffer uses a different word layout; see the
/// renderer.
#[inline]
pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    ((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32)
}

#[inline]
pub const fn red(color: u32) -> u8 {
    (color >> 24) as u8
}

#[inline]
pub const fn green(color: u32) -> u8 {
    (color >> 16) as u8
}

#[inline]
pub const fn blue(color: u32) -> u8 {
    (color >> 8) as u8
}

/// A decoded image: row-major packed RGBA, `pixels.len() == width * height`.
///
/// Map and texture files share one on-disk format, PPM in either the ASCII
/// ("P3") or binary ("P6") variant, and both loaders come through here.
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
}

pub fn load_image(path: &Path) -> Result<DecodedImage> {
    let decoded = ImageReader::open(path)
        .with_context(|| format!("open {}", path.display()))?
        .decode()
        .with_context(|| format!("decode {}", path.display()))?
        .to_rgba8();

    let (width, height) = decoded.dimensions();
    let pixels = decoded.pixels().map(|p| rgba(p[0], p[1], p[2], p[3])).collect();

    Ok(DecodedImage {
        width,
        height,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_round_trips_channels() {
        let c = rgba(10, 20, 30, 255);
        assert_eq!(red(c), 10);
        assert_eq!(green(c), 20);
        assert_eq!(blue(c), 30);
    }
}
