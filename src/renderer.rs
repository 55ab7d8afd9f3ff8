use crate::assets::{blue, green, red};
use crate::map::GridMap;
use crate::player::Player;
use crate::raycaster::{self, Side};
use crate::textures::TextureBank;

/// Horizontal field of view: 60 degrees.
const FOV: f32 = std::f32::consts::FRAC_PI_3;

/// Rays are abandoned past this many map units.
pub const MAX_RANGE: f32 = 10.0;

/// Keeps the projected height finite when a wall sits on the camera plane.
const NEAR_EPSILON: f32 = 0.1;

/// Darkening for horizontal (y-stepping) faces.
const SIDE_SHADE: f32 = 0.7;

#[inline]
fn pack_bgra(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory, alpha at 0
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
}

/// Ray heading for screen column `x`. This is a rectilinear projection
/// through the camera plane, not a linear angle sweep; sweeping linearly
/// fisheyes the walls.
#[inline]
pub fn ray_angle(player_angle: f32, x: usize, width: usize) -> f32 {
    let cx = 2.0 * x as f32 / width as f32 - 1.0;
    player_angle + (cx * (FOV * 0.5).tan()).atan()
}

#[inline]
fn shade_channel(channel: u8, light: f32) -> u8 {
    let v = channel as f32 * light;
    // Degenerate distances can poison the lighting term; black it out
    // rather than trusting the cast.
    let v = if v.is_finite() { v } else { 0.0 };
    v.clamp(0.0, 255.0) as u8
}

#[inline]
fn shade(color: u32, light: f32) -> u32 {
    pack_bgra(
        shade_channel(red(color), light),
        shade_channel(green(color), light),
        shade_channel(blue(color), light),
    )
}

/// Draws one full frame into `frame` (row-major BGRA words). Columns whose
/// ray misses stay black.
pub fn render_frame(
    frame: &mut [u32],
    width: usize,
    height: usize,
    map: &GridMap,
    textures: &TextureBank,
    player: &Player,
) {
    frame.fill(0);

    let mid = height as f32 * 0.5;

    for x in 0..width {
        let angle = ray_angle(player.angle, x, width);
        let ray = raycaster::cast(map, player.x, player.y, angle, MAX_RANGE);
        if !ray.hit {
            continue;
        }

        let wall_height = height as f32 / (ray.distance + NEAR_EPSILON);
        let y0 = ((mid - wall_height * 0.5) as i32).max(0);
        let y1 = ((mid + wall_height * 0.5) as i32).min(height as i32 - 1);
        if y1 < y0 {
            continue;
        }

        let mut light = 1.0 - (ray.distance / MAX_RANGE).min(1.0) * 0.8;
        if ray.side == Side::Y {
            light *= SIDE_SHADE;
        }

        let cell_color = map.color_at(ray.cell_x, ray.cell_y);
        let texture = textures.resolve(cell_color);

        for y in y0..=y1 {
            let color = match texture {
                Some(tex) => {
                    let v = ((y as f32 - mid) + wall_height * 0.5) / wall_height;
                    tex.sample(ray.wall_x, v)
                }
                None => cell_color,
            };
            frame[y as usize * width + x] = shade(color, light);
        }
    }
}
