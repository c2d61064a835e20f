//! SDL window used as the mirror surface.

use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::pixels::{Color, PixelFormatEnum};
use sdl2::rect::Rect;
use sdl2::render::{Texture, TextureCreator, WindowCanvas};
use sdl2::video::WindowContext;
use sdl2::EventPump;

use super::{DisplayError, DisplaySink};
use crate::camera::{ChannelOrder, Frame, Resolution};

/// Window settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    /// Cover the whole desktop instead of opening a `width` x `height` window
    pub fullscreen: bool,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Video Mirror".to_string(),
            fullscreen: true,
            width: 1280,
            height: 720,
        }
    }
}

/// Owns the window, its renderer and the event queue.
///
/// Frames are drawn through an [`SdlSurface`] borrowed from this value,
/// which keeps the streaming texture tied to the renderer that created it.
pub struct SdlDisplay {
    canvas: WindowCanvas,
    textures: TextureCreator<WindowContext>,
    events: EventPump,
}

impl SdlDisplay {
    /// Open the mirror window, cleared to black.
    pub fn open(
        sdl: &sdl2::Sdl,
        video: &sdl2::VideoSubsystem,
        config: &WindowConfig,
    ) -> Result<Self, DisplayError> {
        let mut builder = video.window(&config.title, config.width, config.height);
        builder.position_centered().resizable().allow_highdpi();
        if config.fullscreen {
            builder.fullscreen_desktop();
            sdl.mouse().show_cursor(false);
        }
        let window = builder
            .build()
            .map_err(|e| DisplayError::Window(e.to_string()))?;

        let mut canvas = window
            .into_canvas()
            .build()
            .map_err(|e| DisplayError::Renderer(e.to_string()))?;
        canvas.set_draw_color(Color::BLACK);
        canvas.clear();
        canvas.present();

        let textures = canvas.texture_creator();
        let events = sdl.event_pump().map_err(DisplayError::Sdl)?;

        log::debug!(
            "Opened window '{}' ({})",
            config.title,
            if config.fullscreen {
                "full screen".to_string()
            } else {
                format!("{}x{}", config.width, config.height)
            }
        );

        Ok(Self {
            canvas,
            textures,
            events,
        })
    }

    /// Borrow a drawable surface for the render loop.
    pub fn surface(&mut self) -> SdlSurface<'_> {
        SdlSurface {
            canvas: &mut self.canvas,
            textures: &self.textures,
            events: &mut self.events,
            texture: None,
            closed: false,
            needs_redraw: false,
        }
    }
}

/// [`DisplaySink`] over an [`SdlDisplay`].
///
/// The streaming texture is recreated only when the presented frame size or
/// channel order changes, which happens on window resize. The last texture is
/// repainted whenever the window is exposed or resized, so a stalled camera
/// leaves its last frame on screen.
pub struct SdlSurface<'a> {
    canvas: &'a mut WindowCanvas,
    textures: &'a TextureCreator<WindowContext>,
    events: &'a mut EventPump,
    texture: Option<(Texture<'a>, Resolution, PixelFormatEnum)>,
    closed: bool,
    /// The window was exposed or resized since the last draw
    needs_redraw: bool,
}

impl SdlSurface<'_> {
    /// Clear to black and copy the current texture, centered.
    fn redraw(&mut self) -> Result<(), DisplayError> {
        let bounds = self.bounds();
        self.canvas.set_draw_color(Color::BLACK);
        self.canvas.clear();
        if let Some((texture, size, _)) = self.texture.as_ref() {
            // a frame larger than the window (not laid out yet) is clipped
            let x = (i64::from(bounds.width) - i64::from(size.width)) / 2;
            let y = (i64::from(bounds.height) - i64::from(size.height)) / 2;
            let target = Rect::new(x as i32, y as i32, size.width, size.height);
            self.canvas
                .copy(texture, None, target)
                .map_err(DisplayError::Sdl)?;
        }
        self.canvas.present();
        self.needs_redraw = false;
        Ok(())
    }
}

impl DisplaySink for SdlSurface<'_> {
    fn bounds(&self) -> Resolution {
        match self.canvas.output_size() {
            Ok((width, height)) => Resolution::new(width, height),
            Err(_) => Resolution::new(0, 0),
        }
    }

    fn poll(&mut self) -> bool {
        for event in self.events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => self.closed = true,
                Event::Window {
                    win_event:
                        WindowEvent::Exposed
                        | WindowEvent::Resized(..)
                        | WindowEvent::SizeChanged(..),
                    ..
                } => self.needs_redraw = true,
                _ => {}
            }
        }
        // repaint the last frame now; a resized one follows from the pipeline
        if self.needs_redraw && !self.closed {
            if let Err(e) = self.redraw() {
                log::debug!("Redraw after window event failed: {}", e);
            }
        }
        !self.closed
    }

    fn present(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        let size = frame.resolution();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        let format = match frame.order {
            ChannelOrder::Rgb => PixelFormatEnum::RGB24,
            ChannelOrder::Bgr => PixelFormatEnum::BGR24,
        };
        let reusable = matches!(&self.texture, Some((_, s, f)) if *s == size && *f == format);
        if !reusable {
            let texture = self
                .textures
                .create_texture_streaming(format, size.width, size.height)
                .map_err(|e| DisplayError::Texture(e.to_string()))?;
            self.texture = Some((texture, size, format));
        }
        let Some((texture, _, _)) = self.texture.as_mut() else {
            return Ok(());
        };

        texture
            .update(None, &frame.data, frame.stride())
            .map_err(|e| DisplayError::Texture(e.to_string()))?;
        self.redraw()
    }
}
