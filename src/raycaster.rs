use crate::map::GridMap;

/// Which axis-aligned face of a cell the ray entered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Vertical face, crossed while stepping along x.
    X,
    /// Horizontal face, crossed while stepping along y.
    Y,
}

/// Result of one ray walk. `distance` is perpendicular (camera-plane)
/// distance, not euclidean, so projecting with it does not fisheye.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub hit: bool,
    pub distance: f32,
    /// Fractional position along the struck face, in [0, 1); doubles as the
    /// horizontal texture coordinate.
    pub wall_x: f32,
    pub side: Side,
    pub cell_x: i32,
    pub cell_y: i32,
}

/// Stands in for 1/|d| when a direction component is exactly zero: that
/// axis never advances, and the division stays defined.
const AXIS_PARALLEL: f32 = 1e30;

#[inline]
fn frac(v: f32) -> f32 {
    v - v.floor()
}

/// Walks the grid cell-by-cell along whichever axis reaches its next
/// boundary soonest, until a wall is hit or `max_distance` is exceeded.
///
/// The origin cell is tested before the first step, so a ray starting
/// inside a wall reports a hit at distance zero.
pub fn cast(map: &GridMap, origin_x: f32, origin_y: f32, angle: f32, max_distance: f32) -> RayHit {
    let dir_x = angle.cos();
    let dir_y = angle.sin();

    let mut cell_x = origin_x.floor() as i32;
    let mut cell_y = origin_y.floor() as i32;

    // Ray length to cross one full cell on each axis.
    let delta_x = if dir_x == 0.0 {
        AXIS_PARALLEL
    } else {
        (1.0 / dir_x).abs()
    };
    let delta_y = if dir_y == 0.0 {
        AXIS_PARALLEL
    } else {
        (1.0 / dir_y).abs()
    };

    // Ray length from the origin to the first boundary on each axis.
    let (step_x, mut side_dist_x) = if dir_x < 0.0 {
        (-1, (origin_x - cell_x as f32) * delta_x)
    } else {
        (1, (cell_x as f32 + 1.0 - origin_x) * delta_x)
    };
    let (step_y, mut side_dist_y) = if dir_y < 0.0 {
        (-1, (origin_y - cell_y as f32) * delta_y)
    } else {
        (1, (cell_y as f32 + 1.0 - origin_y) * delta_y)
    };

    let mut side = Side::X;
    let mut distance = 0.0_f32;

    // Cap on boundary crossings; a heuristic safeguard against pathological
    // inputs, not a tight bound.
    let max_steps = (2.0 * max_distance) as u32;

    for _ in 0..=max_steps {
        if map.is_wall(cell_x, cell_y) {
            let wall_x = match side {
                Side::X => frac(origin_y + distance * dir_y),
                Side::Y => frac(origin_x + distance * dir_x),
            };
            return RayHit {
                hit: true,
                distance,
                wall_x,
                side,
                cell_x,
                cell_y,
            };
        }

        // Advance whichever axis has the nearer boundary. The perpendicular
        // distance to the cell being entered is the pre-increment side
        // distance of the advanced axis.
        if side_dist_x < side_dist_y {
            distance = side_dist_x;
            side_dist_x += delta_x;
            cell_x += step_x;
            side = Side::X;
        } else {
            distance = side_dist_y;
            side_dist_y += delta_y;
            cell_y += step_y;
            side = Side::Y;
        }

        if distance > max_distance {
            break;
        }
    }

    RayHit {
        hit: false,
        distance,
        wall_x: 0.0,
        side,
        cell_x,
        cell_y,
    }
}
