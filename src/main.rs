use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::map::GridMap;
use crate::player::{Command, InputState, Interaction, Player};
use crate::scaler::Upscaler;
use crate::textures::TextureBank;

mod assets;
mod map;
mod player;
mod raycaster;
mod renderer;
mod scaler;
mod textures;

/// Frame-rate cap, roughly 120 Hz.
const TICK: Duration = Duration::from_micros(8_333);

#[derive(Parser)]
#[command(about = "Grid-based raycasting engine with breakable walls")]
struct Args {
    /// Initial x position in map units
    #[arg(long, default_value_t = 16.0)]
    x: f32,

    /// Initial y position in map units
    #[arg(long, default_value_t = 16.0)]
    y: f32,

    /// Initial heading in radians
    #[arg(long, default_value_t = 0.0)]
    angle: f32,

    /// Map image path (PPM)
    #[arg(long, default_value = "map.ppm")]
    map: PathBuf,

    /// Directory holding tex0.ppm .. tex7.ppm; each file optional
    #[arg(long, default_value = ".")]
    textures: PathBuf,
}

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,

    map: GridMap,
    textures: TextureBank,
    player: Player,
    input: InputState,
    won: bool,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,

    // Internal render target, upscaled to the window per frame
    fb: Vec<u32>,
    fb_w: usize,
    fb_h: usize,
    upscaler: Option<Upscaler>,

    next_tick: Instant,
}

impl App {
    fn new(args: &Args) -> Self {
        let map = GridMap::load(&args.map);
        let textures = TextureBank::load_conventional(&args.textures);
        let mut player = Player::new(args.x, args.y, args.angle);
        player.correct_spawn(&map);

        Self {
            window: None,
            surface: None,
            map,
            textures,
            player,
            input: InputState::new(),
            won: false,

            frame_counter: 0,
            last_fps_print: Instant::now(),

            fb: vec![0; 640 * 480],
            fb_w: 640,
            fb_h: 480,
            upscaler: None,

            next_tick: Instant::now(),
        }
    }

    /// One fixed-rate tick: movement with collision, then interaction, then
    /// the debounce countdowns. Winning exits the loop once this tick's
    /// frame has been presented.
    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        self.player.apply_movement(&self.input, &self.map);

        if self.input.is_active(Command::Interact)
            && self.player.interact(&mut self.map) == Interaction::Won
        {
            info!("exit tile broken, run complete");
            self.won = true;
        }

        self.input.tick();

        if self.won {
            event_loop.exit();
        }
    }

    fn rebuild_render_target(&mut self, dst_w: usize, dst_h: usize) {
        // Internal height is fixed; width follows the window aspect.
        let target_h = 480usize;
        let aspect = if dst_h > 0 {
            dst_w as f32 / dst_h as f32
        } else {
            1.0
        };

        let mut target_w = (target_h as f32 * aspect).round() as usize;
        if target_w < 160 {
            target_w = 160;
        }
        if target_w % 2 != 0 {
            target_w += 1;
        }

        if target_w != self.fb_w || target_h != self.fb_h {
            self.fb_w = target_w;
            self.fb_h = target_h;
            self.fb = vec![0u32; self.fb_w * self.fb_h];
        }

        self.upscaler = Some(Upscaler::new(self.fb_w, self.fb_h, dst_w, dst_h));
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title("Gridcaster")
            .with_inner_size(LogicalSize::new(800.0, 600.0));

        let window = Rc::new(event_loop.create_window(attributes).expect("create window"));

        let context = softbuffer::Context::new(window.clone()).expect("softbuffer context");
        let surface =
            softbuffer::Surface::new(&context, window.clone()).expect("softbuffer surface");

        let size = window.inner_size();
        self.rebuild_render_target(size.width as usize, size.height as usize);

        self.surface = Some(surface);
        self.window = Some(window);

        self.next_tick = Instant::now();
        self.window.as_ref().unwrap().request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("close requested, stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state,
                        ..
                    },
                ..
            } => {
                if let PhysicalKey::Code(code) = physical_key {
                    // Quit short-circuits; everything else feeds the
                    // per-tick command state.
                    if code == KeyCode::Escape && state == ElementState::Pressed {
                        event_loop.exit();
                        return;
                    }
                    if let Some(command) = Command::from_key(code) {
                        match state {
                            ElementState::Pressed => self.input.press(command),
                            ElementState::Released => self.input.release(command),
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                self.tick(event_loop);

                let (window, surface) = match (&self.window, &mut self.surface) {
                    (Some(w), Some(s)) if w.id() == id => (w, s),
                    _ => return,
                };

                let size = window.inner_size();
                let (dw, dh) = (size.width as usize, size.height as usize);
                if dw == 0 || dh == 0 {
                    return; // Minimized window, skip drawing
                }

                surface
                    .resize(
                        NonZeroU32::new(dw as u32).unwrap(),
                        NonZeroU32::new(dh as u32).unwrap(),
                    )
                    .unwrap();

                renderer::render_frame(
                    &mut self.fb,
                    self.fb_w,
                    self.fb_h,
                    &self.map,
                    &self.textures,
                    &self.player,
                );

                let mut buf = surface.buffer_mut().expect("buffer_mut");
                if let Some(upscaler) = &self.upscaler {
                    upscaler.blit(&mut buf, dw, &self.fb);
                }
                buf.present().unwrap();

                self.frame_counter += 1;
                let now = Instant::now();
                if now.duration_since(self.last_fps_print).as_secs_f32() >= 1.0 {
                    let fps = self.frame_counter as f32
                        / now.duration_since(self.last_fps_print).as_secs_f32();
                    debug!("fps: {fps:.1}");
                    self.frame_counter = 0;
                    self.last_fps_print = now;
                }
            }

            WindowEvent::Resized(new_size) => {
                let (dw, dh) = (new_size.width as usize, new_size.height as usize);
                self.rebuild_render_target(dw, dh);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Fixed-rate cap: redraw when the tick boundary has passed, sleep
        // until it otherwise.
        let now = Instant::now();
        if now >= self.next_tick {
            self.next_tick = now + TICK;
            event_loop.set_control_flow(ControlFlow::Poll);
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(&args);
    event_loop.run_app(&mut app)?;

    if app.won {
        info!("you win");
    }
    Ok(())
}
