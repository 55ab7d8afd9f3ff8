use std::collections::HashSet;
use std::f32::consts::FRAC_PI_2;

use log::warn;
use winit::keyboard::KeyCode;

use crate::map::GridMap;
use crate::raycaster;
use crate::textures::{BLUE_SLOT, GREEN_SLOT, slot_for_color};

/// How far the use/break interaction reaches, in map units.
const REACH: f32 = 10.0;

/// Distance moved per tick while a movement command is active.
const MOVE_SPEED: f32 = 0.05;

/// Radians turned per tick while a rotation command is active.
const ROT_SPEED: f32 = 0.03;

/// Ticks a tapped key stays active without a repeat from the source.
const DEBOUNCE_TICKS: u8 = 2;

/// One discrete control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
    Interact,
}

pub const COMMAND_COUNT: usize = 7;

impl Command {
    /// Keys other than the recognized set map to nothing. Escape is not a
    /// command: quit short-circuits in the event handler.
    pub fn from_key(code: KeyCode) -> Option<Command> {
        match code {
            KeyCode::KeyW => Some(Command::Forward),
            KeyCode::KeyS => Some(Command::Backward),
            KeyCode::KeyA => Some(Command::StrafeLeft),
            KeyCode::KeyD => Some(Command::StrafeRight),
            KeyCode::KeyQ => Some(Command::TurnLeft),
            KeyCode::KeyE => Some(Command::TurnRight),
            KeyCode::KeyF => Some(Command::Interact),
            _ => None,
        }
    }
}

/// Which commands are live this tick. A press arms a short per-command
/// countdown so a single tap stays active across a couple of ticks even if
/// the input source never repeats it; holding the key keeps it active
/// directly.
pub struct InputState {
    held: HashSet<Command>,
    countdown: [u8; COMMAND_COUNT],
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            countdown: [0; COMMAND_COUNT],
        }
    }

    pub fn press(&mut self, command: Command) {
        self.held.insert(command);
        self.countdown[command as usize] = DEBOUNCE_TICKS;
    }

    pub fn release(&mut self, command: Command) {
        self.held.remove(&command);
    }

    pub fn is_active(&self, command: Command) -> bool {
        self.held.contains(&command) || self.countdown[command as usize] > 0
    }

    /// Called once per tick, after the tick consumed the commands.
    pub fn tick(&mut self) {
        for c in &mut self.countdown {
            *c = c.saturating_sub(1);
        }
    }
}

/// What an interact attempt did to the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Nothing,
    Broke,
    Won,
}

/// Camera pose plus the movement/collision/interaction rules that drive it.
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

impl Player {
    pub fn new(x: f32, y: f32, angle: f32) -> Self {
        Self { x, y, angle }
    }

    /// If the spawn point sits inside a wall, relocate to the center of the
    /// first floor cell in row-major order.
    pub fn correct_spawn(&mut self, map: &GridMap) {
        if !map.is_wall(self.x.floor() as i32, self.y.floor() as i32) {
            return;
        }
        for y in 0..map.height() {
            for x in 0..map.width() {
                if !map.is_wall(x as i32, y as i32) {
                    self.x = x as f32 + 0.5;
                    self.y = y as f32 + 0.5;
                    warn!("spawn inside a wall, relocated to ({}, {})", self.x, self.y);
                    return;
                }
            }
        }
    }

    /// Applies this tick's rotation and movement. Rotation always sticks;
    /// the translation is rejected wholesale if the proposed position lands
    /// in a wall cell.
    pub fn apply_movement(&mut self, input: &InputState, map: &GridMap) {
        if input.is_active(Command::TurnLeft) {
            self.angle -= ROT_SPEED;
        }
        if input.is_active(Command::TurnRight) {
            self.angle += ROT_SPEED;
        }

        let mut nx = self.x;
        let mut ny = self.y;
        if input.is_active(Command::Forward) {
            nx += self.angle.cos() * MOVE_SPEED;
            ny += self.angle.sin() * MOVE_SPEED;
        }
        if input.is_active(Command::Backward) {
            nx -= self.angle.cos() * MOVE_SPEED;
            ny -= self.angle.sin() * MOVE_SPEED;
        }
        if input.is_active(Command::StrafeLeft) {
            let a = self.angle - FRAC_PI_2;
            nx += a.cos() * MOVE_SPEED;
            ny += a.sin() * MOVE_SPEED;
        }
        if input.is_active(Command::StrafeRight) {
            let a = self.angle + FRAC_PI_2;
            nx += a.cos() * MOVE_SPEED;
            ny += a.sin() * MOVE_SPEED;
        }

        if map.is_wall(nx.floor() as i32, ny.floor() as i32) {
            return;
        }
        self.x = nx;
        self.y = ny;
    }

    /// Casts along the current heading and breaks the struck tile if its
    /// color classifies as green (breakable) or blue (the exit). Breaking
    /// the exit wins the run.
    pub fn interact(&self, map: &mut GridMap) -> Interaction {
        let ray = raycaster::cast(map, self.x, self.y, self.angle, REACH);
        if !ray.hit {
            return Interaction::Nothing;
        }
        match slot_for_color(map.color_at(ray.cell_x, ray.cell_y)) {
            GREEN_SLOT => {
                map.break_tile(ray.cell_x, ray.cell_y);
                Interaction::Broke
            }
            BLUE_SLOT => {
                map.break_tile(ray.cell_x, ray.cell_y);
                Interaction::Won
            }
            _ => Interaction::Nothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{DecodedImage, rgba};
    use crate::map::{FLOOR_COLOR, GridMap};

    const WHITE: u32 = rgba(255, 255, 255, 255);
    const GREEN: u32 = rgba(0, 255, 0, 255);
    const BLUE: u32 = rgba(0, 0, 255, 255);

    fn room(colors: &[(i32, i32, u32)], size: u32) -> GridMap {
        let mut pixels = vec![FLOOR_COLOR; (size * size) as usize];
        for &(x, y, c) in colors {
            pixels[(y as u32 * size + x as u32) as usize] = c;
        }
        GridMap::from_image(DecodedImage {
            width: size,
            height: size,
            pixels,
        })
    }

    fn active_input(commands: &[Command]) -> InputState {
        let mut input = InputState::new();
        for &c in commands {
            input.press(c);
        }
        input
    }

    #[test]
    fn movement_into_a_wall_rolls_back_translation_only() {
        // Wall directly east of the player.
        let map = room(&[(2, 1, WHITE)], 4);
        let mut player = Player::new(1.99, 1.5, 0.0);
        let input = active_input(&[Command::Forward, Command::TurnRight]);

        let (x0, y0) = (player.x, player.y);
        player.apply_movement(&input, &map);

        assert_eq!((player.x, player.y), (x0, y0));
        assert!((player.angle - ROT_SPEED).abs() < 1e-6);
    }

    #[test]
    fn movement_in_the_open_advances() {
        let map = room(&[], 4);
        let mut player = Player::new(1.5, 1.5, 0.0);
        let input = active_input(&[Command::Forward]);

        player.apply_movement(&input, &map);
        assert!((player.x - (1.5 + MOVE_SPEED)).abs() < 1e-6);
        assert!((player.y - 1.5).abs() < 1e-6);
    }

    #[test]
    fn strafing_moves_perpendicular_to_the_heading() {
        let map = room(&[], 8);
        let mut player = Player::new(4.0, 4.0, 0.0);
        player.apply_movement(&active_input(&[Command::StrafeRight]), &map);
        assert!((player.x - 4.0).abs() < 1e-5);
        assert!((player.y - (4.0 + MOVE_SPEED)).abs() < 1e-5);
    }

    #[test]
    fn tapped_key_stays_active_for_two_ticks() {
        let mut input = InputState::new();
        input.press(Command::Forward);
        input.release(Command::Forward);

        assert!(input.is_active(Command::Forward));
        input.tick();
        assert!(input.is_active(Command::Forward));
        input.tick();
        assert!(!input.is_active(Command::Forward));
    }

    #[test]
    fn held_key_outlives_the_countdown() {
        let mut input = InputState::new();
        input.press(Command::Interact);
        input.tick();
        input.tick();
        input.tick();
        assert!(input.is_active(Command::Interact));
        input.release(Command::Interact);
        assert!(!input.is_active(Command::Interact));
    }

    #[test]
    fn interacting_with_green_breaks_without_winning() {
        let mut map = room(&[(2, 1, GREEN)], 4);
        let player = Player::new(1.5, 1.5, 0.0);

        assert_eq!(player.interact(&mut map), Interaction::Broke);
        assert!(!map.is_wall(2, 1));
        assert_eq!(map.color_at(2, 1), FLOOR_COLOR);
    }

    #[test]
    fn interacting_with_blue_breaks_and_wins() {
        let mut map = room(&[(2, 1, BLUE)], 4);
        let player = Player::new(1.5, 1.5, 0.0);

        assert_eq!(player.interact(&mut map), Interaction::Won);
        assert!(!map.is_wall(2, 1));
    }

    #[test]
    fn interacting_with_other_walls_does_nothing() {
        let mut map = room(&[(2, 1, WHITE)], 4);
        let player = Player::new(1.5, 1.5, 0.0);

        assert_eq!(player.interact(&mut map), Interaction::Nothing);
        assert!(map.is_wall(2, 1));
    }

    #[test]
    fn interact_out_of_reach_does_nothing() {
        // Nothing but floor within reach of the heading.
        let mut map = room(&[], 64);
        let player = Player::new(2.5, 2.5, 0.0);
        assert_eq!(player.interact(&mut map), Interaction::Nothing);
    }

    #[test]
    fn spawn_inside_a_wall_relocates_to_first_floor_cell() {
        // Wall everywhere except (2, 1).
        let size = 4u32;
        let mut pixels = vec![WHITE; (size * size) as usize];
        pixels[(1 * size + 2) as usize] = FLOOR_COLOR;
        let map = GridMap::from_image(DecodedImage {
            width: size,
            height: size,
            pixels,
        });

        let mut player = Player::new(0.5, 0.5, 1.0);
        player.correct_spawn(&map);
        assert_eq!((player.x, player.y), (2.5, 1.5));
        assert_eq!(player.angle, 1.0);
    }

    #[test]
    fn spawn_on_floor_is_left_alone() {
        let map = room(&[], 4);
        let mut player = Player::new(1.5, 2.5, 0.0);
        player.correct_spawn(&map);
        assert_eq!((player.x, player.y), (1.5, 2.5));
    }
}
