use super::device::{Device, DeviceError};
use super::Framebuffer;
use log::info;
use sdl2::event::Event;
use sdl2::pixels::Color;
use sdl2::rect::Rect;

/// Simulated output: each pixel is drawn as a `scale`-sized square
/// in an SDL window. SDL must be driven from the thread that created it,
/// which is the serving thread.
pub struct Window {
    title: String,
    width: u32,
    height: u32,
    scale: u32,
    sdl: Option<sdl2::Sdl>,
    canvas: Option<sdl2::render::Canvas<sdl2::video::Window>>,
    events: Option<sdl2::EventPump>,
}

fn sdl_error(e: impl ToString) -> DeviceError {
    DeviceError::Sdl(e.to_string())
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32, scale: u32) -> Window {
        Window {
            title: title.to_string(),
            width,
            height,
            scale: scale.max(1),
            sdl: None,
            canvas: None,
            events: None,
        }
    }
}

impl Device for Window {
    fn init(&mut self) -> Result<(), DeviceError> {
        let sdl_context = sdl2::init().map_err(sdl_error)?;
        let video_subsystem = sdl_context.video().map_err(sdl_error)?;

        let window = video_subsystem
            .window(
                &self.title,
                self.width * self.scale,
                self.height * self.scale,
            )
            .position_centered()
            .build()
            .map_err(sdl_error)?;
        let mut canvas = window.into_canvas().build().map_err(sdl_error)?;
        canvas.set_draw_color(Color::RGB(0, 0, 0));
        canvas.clear();
        canvas.present();

        self.events = Some(sdl_context.event_pump().map_err(sdl_error)?);
        self.sdl = Some(sdl_context);
        self.canvas = Some(canvas);
        Ok(())
    }

    fn update_display(&mut self, framebuffer: &Framebuffer) -> Result<(), DeviceError> {
        // Keep the window responsive; quitting is left to the server's signal handling.
        if let Some(events) = self.events.as_mut() {
            for event in events.poll_iter() {
                if let Event::Quit { .. } = event {
                    info!("{}: window close requested, ignoring", self.title);
                }
            }
        }

        let canvas = self
            .canvas
            .as_mut()
            .ok_or_else(|| DeviceError::Sdl("window not initialized".to_string()))?;

        for (x, y, color) in framebuffer {
            canvas.set_draw_color(Color::RGB(color.r, color.g, color.b));
            let rect = Rect::new(
                (x * self.scale) as i32,
                (y * self.scale) as i32,
                self.scale,
                self.scale,
            );
            canvas.fill_rect(rect).map_err(sdl_error)?;
        }

        canvas.present();
        Ok(())
    }

    fn close(&mut self) {
        self.canvas = None;
        self.events = None;
        self.sdl = None;
    }
}
