//! Headless platform
//!
//! `RecordingSurface` keeps every draw call instead of rasterizing, and
//! `ImmediateFetcher` answers fetches synchronously from a closure.

use crate::renderer::{Color, Surface};
use crate::resources::{Completion, Fetch};
use crate::sprites::SpriteRegion;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    FillCircle {
        x: f32,
        y: f32,
        radius: f32,
        color: Color,
    },
    DrawImage {
        image: String,
        src: SpriteRegion,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

/// Surface whose "images" are just their names
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    device_pixel_ratio: f32,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
            commands: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Commands since the most recent full clear
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear { .. }))
            .unwrap_or(0);
        &self.commands[start..]
    }
}

impl Surface for RecordingSurface {
    type Image = String;

    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.commands.push(DrawCommand::Clear {
            x,
            y,
            width,
            height,
        });
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle { x, y, radius, color });
    }

    fn draw_image_region(
        &mut self,
        image: &String,
        src: &SpriteRegion,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) {
        self.commands.push(DrawCommand::DrawImage {
            image: image.clone(),
            src: *src,
            x,
            y,
            width,
            height,
        });
    }
}

type FetchFn<T> = Box<dyn Fn(&str) -> Result<T, String>>;

/// Fetcher that completes before `fetch` returns
pub struct ImmediateFetcher<T> {
    source: FetchFn<T>,
}

impl<T> ImmediateFetcher<T> {
    pub fn new(source: impl Fn(&str) -> Result<T, String> + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }
}

impl ImmediateFetcher<String> {
    /// Every URL loads as its own string
    pub fn echo() -> Self {
        Self::new(|url| Ok(url.to_string()))
    }
}

impl<T> Fetch<T> for ImmediateFetcher<T> {
    fn fetch(&self, url: &str, completion: Completion<T>) {
        match (self.source)(url) {
            Ok(value) => completion.resolve(value),
            Err(reason) => completion.reject(reason),
        }
    }
}
