use std::path::Path;

use log::{debug, error};

use crate::assets::{self, DecodedImage, blue, green, red, rgba};

pub const SLOT_COUNT: usize = 8;

/// Slots whose colors carry gameplay meaning: green walls break, the blue
/// wall is the exit. Interaction reuses the same classifier as texturing.
pub const GREEN_SLOT: usize = 2;
pub const BLUE_SLOT: usize = 3;

/// Returned when a sample index falls outside the pixel array. Loud on
/// purpose: a clamping bug shows up on screen instead of crashing.
const SAMPLE_SENTINEL: u32 = rgba(255, 0, 255, 255);

/// Immutable wall texture, row-major packed RGBA.
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Texture {
    pub fn from_image(image: DecodedImage) -> Self {
        Self {
            width: image.width,
            height: image.height,
            pixels: image.pixels,
        }
    }

    /// Samples at normalized coordinates, clamped to [0, 0.9999] on both
    /// axes before indexing.
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        let u = u.clamp(0.0, 0.9999);
        let v = v.clamp(0.0, 0.9999);
        let tx = (u * self.width as f32) as usize;
        let ty = (v * self.height as f32) as usize;
        let index = ty * self.width as usize + tx;
        match self.pixels.get(index) {
            Some(&color) => color,
            None => {
                error!(
                    "texture sample out of range: u={u} v={v} index={index} len={}",
                    self.pixels.len()
                );
                SAMPLE_SENTINEL
            }
        }
    }
}

/// Maps a wall color to a texture slot by fixed brightness thresholds,
/// first match wins. The order and thresholds decide which walls get which
/// texture and are kept exactly as shipped maps expect them.
pub fn slot_for_color(color: u32) -> usize {
    let (r, g, b) = (red(color), green(color), blue(color));
    if r > 200 && g > 200 && b > 200 {
        0 // white/gray
    } else if r > 200 && g < 100 && b < 100 {
        1 // red
    } else if r < 100 && g > 200 && b < 100 {
        2 // green
    } else if r < 100 && g < 100 && b > 200 {
        3 // blue
    } else if r > 200 && g > 200 && b < 100 {
        4 // yellow
    } else if r < 100 && g > 200 && b > 200 {
        5 // cyan
    } else if r > 200 && g < 100 && b > 200 {
        6 // magenta
    } else if r > 150 && g > 75 && g < 150 && b < 100 {
        7 // orange/brown
    } else {
        0
    }
}

/// Eight independently optional texture slots. An absent slot means the
/// wall renders flat-shaded in its own color.
pub struct TextureBank {
    slots: [Option<Texture>; SLOT_COUNT],
}

impl TextureBank {
    pub fn empty() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Loads the conventional `tex0.ppm` .. `tex7.ppm` set from a
    /// directory. Missing or undecodable files leave their slot empty; that
    /// is expected, not an error.
    pub fn load_conventional(dir: &Path) -> Self {
        let mut bank = Self::empty();
        for (slot, entry) in bank.slots.iter_mut().enumerate() {
            let path = dir.join(format!("tex{slot}.ppm"));
            match assets::load_image(&path) {
                Ok(image) => *entry = Some(Texture::from_image(image)),
                Err(err) => debug!("texture slot {slot} unpopulated: {err:#}"),
            }
        }
        bank
    }

    #[cfg(test)]
    pub fn with_slot(slot: usize, texture: Texture) -> Self {
        let mut bank = Self::empty();
        bank.slots[slot] = Some(texture);
        bank
    }

    pub fn resolve(&self, color: u32) -> Option<&Texture> {
        self.slots[slot_for_color(color)].as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_bucket_resolves_in_priority_order() {
        let cases = [
            (rgba(255, 255, 255, 255), 0),
            (rgba(255, 0, 0, 255), 1),
            (rgba(0, 255, 0, 255), 2),
            (rgba(0, 0, 255, 255), 3),
            (rgba(255, 255, 0, 255), 4),
            (rgba(0, 255, 255, 255), 5),
            (rgba(255, 0, 255, 255), 6),
            (rgba(200, 100, 50, 255), 7),
            // No bucket matches: mid-gray falls back to slot 0.
            (rgba(150, 150, 150, 255), 0),
        ];
        for (color, slot) in cases {
            assert_eq!(slot_for_color(color), slot, "color {color:#010x}");
        }
    }

    #[test]
    fn earlier_buckets_win_on_overlap() {
        // Bright red with a warm green channel satisfies both the red and
        // the orange/brown tests; red comes first.
        assert_eq!(slot_for_color(rgba(255, 80, 50, 255)), 1);
        // Dimmer red only matches orange/brown.
        assert_eq!(slot_for_color(rgba(180, 80, 50, 255)), 7);
    }

    #[test]
    fn alpha_is_ignored() {
        assert_eq!(slot_for_color(rgba(255, 0, 0, 0)), 1);
        assert_eq!(slot_for_color(rgba(255, 0, 0, 255)), 1);
    }

    #[test]
    fn resolve_returns_none_for_empty_slot() {
        let bank = TextureBank::empty();
        assert!(bank.resolve(rgba(255, 0, 0, 255)).is_none());
    }

    #[test]
    fn resolve_finds_the_loaded_slot() {
        let texture = Texture::from_image(crate::assets::DecodedImage {
            width: 2,
            height: 2,
            pixels: vec![1, 2, 3, 4],
        });
        let bank = TextureBank::with_slot(1, texture);
        assert!(bank.resolve(rgba(255, 0, 0, 255)).is_some());
        assert!(bank.resolve(rgba(0, 255, 0, 255)).is_none());
    }

    #[test]
    fn sampling_clamps_to_the_texture_edge() {
        let texture = Texture::from_image(crate::assets::DecodedImage {
            width: 2,
            height: 2,
            pixels: vec![10, 20, 30, 40],
        });
        assert_eq!(texture.sample(0.0, 0.0), 10);
        assert_eq!(texture.sample(1.0, 0.0), 20);
        assert_eq!(texture.sample(0.0, 1.0), 30);
        assert_eq!(texture.sample(5.0, 5.0), 40);
        assert_eq!(texture.sample(-1.0, -1.0), 10);
    }
}
