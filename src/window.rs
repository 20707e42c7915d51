use image::GrayImage;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

pub const WINDOW_WIDTH: u32 = 1024;
pub const WINDOW_HEIGHT: u32 = 512;
pub const FPS: u64 = 60;
pub const FRAME_TARGET_TIME: f64 = 1000.0 / FPS as f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    None,
    Quit,
    Resize(u32, u32),
    /// B: switch between the box test strategies.
    ToggleBoxTest,
    /// C: toggle conservative occluder rounding.
    ToggleConservative,
    /// P: write the depth buffer to disk.
    SaveDepth,
}

pub struct FrameLimiter {
    previous_frame_time: u64,
}

impl FrameLimiter {
    pub fn new(window: &Window) -> Self {
        Self {
            previous_frame_time: window.timer().ticks64(),
        }
    }

    /// Waits if necessary to maintain frame rate and returns the delta time in milliseconds.
    pub fn wait_and_get_delta(&mut self, window: &Window) -> u64 {
        let mut current_time = window.timer().ticks64();
        let mut delta_time = current_time - self.previous_frame_time;

        if delta_time < FRAME_TARGET_TIME as u64 {
            let time_to_wait = (FRAME_TARGET_TIME as u64) - delta_time;
            std::thread::sleep(std::time::Duration::from_millis(time_to_wait));
            current_time = window.timer().ticks64();
            delta_time = current_time - self.previous_frame_time;
        }

        self.previous_frame_time = current_time;
        delta_time
    }
}

/// SDL window showing the depth buffer, stretched to the window size.
pub struct Window {
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    // declared before _texture_creator so it is dropped first
    texture: sdl2::render::Texture<'static>,
    _texture_creator: Box<sdl2::render::TextureCreator<sdl2::video::WindowContext>>,
    event_pump: sdl2::EventPump,
    timer_subsystem: sdl2::TimerSubsystem,
    width: u32,
    height: u32,
    buffer_width: u32,
    buffer_height: u32,
    pixels: Vec<u8>,
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32, buffer: (u32, u32)) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let timer_subsystem = sdl_context.timer()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump()?;

        // SAFETY: texture_creator is heap-allocated and lives as long as Window.
        // We ensure texture is dropped before texture_creator by struct field order.
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(texture_creator.as_ref() as *const _) };
        let texture = texture_creator_ref
            .create_texture_streaming(PixelFormatEnum::ARGB8888, buffer.0, buffer.1)
            .map_err(|e| e.to_string())?;

        Ok(Self {
            canvas,
            texture,
            _texture_creator: texture_creator,
            event_pump,
            timer_subsystem,
            width,
            height,
            buffer_width: buffer.0,
            buffer_height: buffer.1,
            pixels: vec![0; (buffer.0 * buffer.1 * 4) as usize],
        })
    }

    pub fn poll_events(&mut self) -> WindowEvent {
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => return WindowEvent::Quit,
                Event::KeyDown {
                    keycode: Some(Keycode::B),
                    ..
                } => return WindowEvent::ToggleBoxTest,
                Event::KeyDown {
                    keycode: Some(Keycode::C),
                    ..
                } => return WindowEvent::ToggleConservative,
                Event::KeyDown {
                    keycode: Some(Keycode::P),
                    ..
                } => return WindowEvent::SaveDepth,
                Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(w, h),
                    ..
                } => return WindowEvent::Resize(w as u32, h as u32),
                _ => {}
            }
        }
        WindowEvent::None
    }

    /// Uploads a grayscale depth image and draws it over the whole window.
    pub fn present(&mut self, depth: &GrayImage) -> Result<(), String> {
        if depth.dimensions() != (self.buffer_width, self.buffer_height) {
            return Err(format!(
                "depth image is {:?}, texture is {}x{}",
                depth.dimensions(),
                self.buffer_width,
                self.buffer_height
            ));
        }
        // ARGB8888 is stored as B, G, R, A in memory
        for (out, luma) in self.pixels.chunks_exact_mut(4).zip(depth.pixels()) {
            let v = luma[0];
            out.copy_from_slice(&[v, v, v, 0xFF]);
        }

        self.texture
            .update(None, &self.pixels, (self.buffer_width * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, Some(Rect::new(0, 0, self.width, self.height)))?;
        self.canvas.present();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), String> {
        self.canvas
            .window_mut()
            .set_title(title)
            .map_err(|e| e.to_string())
    }

    pub fn timer(&self) -> &sdl2::TimerSubsystem {
        &self.timer_subsystem
    }
}
