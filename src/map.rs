use std::path::Path;

use log::warn;

use crate::assets::{self, DecodedImage, blue, green, red, rgba};

/// A cell is floor when all of R, G, B sit below this.
const FLOOR_THRESHOLD: u8 = 32;

/// Written into a cell when a wall tile is broken.
pub const FLOOR_COLOR: u32 = rgba(0, 0, 0, 255);

/// Legacy floor marker some maps carry; classified as floor even though its
/// blue channel clears the near-black threshold.
pub const BROKEN_FLOOR_COLOR: u32 = rgba(0, 0, 64, 255);

/// What `color_at` reports for out-of-bounds queries: the boundary wall.
const BOUNDARY_COLOR: u32 = rgba(255, 255, 255, 255);

/// Rectangular grid of packed RGBA cells. Wall/floor classification is
/// derived from the stored color on every query, never cached, so breaking
/// a tile is observably consistent with a single source of truth.
pub struct GridMap {
    width: u32,
    height: u32,
    cells: Vec<u32>,
}

fn is_floor_color(color: u32) -> bool {
    if color == BROKEN_FLOOR_COLOR {
        return true;
    }
    red(color) < FLOOR_THRESHOLD && green(color) < FLOOR_THRESHOLD && blue(color) < FLOOR_THRESHOLD
}

impl GridMap {
    pub fn from_image(image: DecodedImage) -> Self {
        Self {
            width: image.width,
            height: image.height,
            cells: image.pixels,
        }
    }

    /// Loads a map image, falling back to the built-in map when the file
    /// cannot be decoded. Never fails: a missing map is a diagnostic, not a
    /// startup error.
    pub fn load(path: &Path) -> Self {
        match assets::load_image(path) {
            Ok(image) => Self::from_image(image),
            Err(err) => {
                warn!(
                    "failed to load map {}: {err:#}; using built-in map",
                    path.display()
                );
                Self::default_map()
            }
        }
    }

    /// A bordered 32x32 room with two internal partitions, one of them
    /// holding the blue exit tile.
    pub fn default_map() -> Self {
        const SIZE: u32 = 32;
        let mut map = Self {
            width: SIZE,
            height: SIZE,
            cells: vec![FLOOR_COLOR; (SIZE * SIZE) as usize],
        };

        let border = rgba(255, 255, 255, 255);
        let partition = rgba(255, 0, 0, 255);
        let breakable = rgba(0, 255, 0, 255);
        let exit = rgba(0, 0, 255, 255);

        for x in 0..SIZE {
            map.put(x, 0, border);
            map.put(x, SIZE - 1, border);
        }
        for y in 0..SIZE {
            map.put(0, y, border);
            map.put(SIZE - 1, y, border);
        }

        // Vertical partition with a doorway.
        for y in 2..=24 {
            if !(12..=14).contains(&y) {
                map.put(10, y, partition);
            }
        }
        // Horizontal breakable partition with a doorway and the exit tile.
        for x in 14..=29 {
            if !(22..=23).contains(&x) {
                map.put(x, 20, breakable);
            }
        }
        map.put(26, 20, exit);

        map
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn put(&mut self, x: u32, y: u32, color: u32) {
        let i = y as usize * self.width as usize + x as usize;
        self.cells[i] = color;
    }

    /// Out-of-bounds counts as wall: the world is closed.
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        match self.index(x, y) {
            Some(i) => !is_floor_color(self.cells[i]),
            None => true,
        }
    }

    /// Out-of-bounds reads as opaque white, the boundary wall color.
    pub fn color_at(&self, x: i32, y: i32) -> u32 {
        match self.index(x, y) {
            Some(i) => self.cells[i],
            None => BOUNDARY_COLOR,
        }
    }

    /// Turns a wall cell into floor. Out-of-bounds is a logged no-op rather
    /// than a caller contract.
    pub fn break_tile(&mut self, x: i32, y: i32) {
        match self.index(x, y) {
            Some(i) => self.cells[i] = FLOOR_COLOR,
            None => warn!("break_tile out of bounds at ({x}, {y})"),
        }
    }
}
