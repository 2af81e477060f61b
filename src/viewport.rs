//! Mapping from the fixed render resolution to the output surface
//!
//! The simulation always works in `render_width x render_height` logical
//! units. The viewport locks the output height to the canvas height, derives
//! the width from the aspect ratio and centres the result. All canvas and
//! output values are CSS pixels (physical size divided by the device pixel
//! ratio).
//!
//! Canvas and output sizes are unset until the first `on_resize`. Reading
//! them before that is a bug and panics; use the `try_*` accessors to check.

use glam::Vec2;

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    render_width: f32,
    render_height: f32,
    aspect_ratio: f32,
    canvas: Option<Vec2>,
    output: Option<Vec2>,
}

impl Viewport {
    pub fn new(render_width: f32, render_height: f32) -> Self {
        let aspect_ratio = render_width / render_height;
        log::info!(
            "Viewport initialized: render {}x{}, aspect ratio {}",
            render_width,
            render_height,
            aspect_ratio
        );
        Self {
            render_width,
            render_height,
            aspect_ratio,
            canvas: None,
            output: None,
        }
    }

    #[inline]
    pub fn render_width(&self) -> f32 {
        self.render_width
    }

    #[inline]
    pub fn render_height(&self) -> f32 {
        self.render_height
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Record a new physical canvas size. Returns true if anything changed.
    pub fn on_resize(&mut self, canvas_width: f32, canvas_height: f32, device_pixel_ratio: f32) -> bool {
        let dpr = if device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            log::warn!("Ignoring device pixel ratio {}, using 1.0", device_pixel_ratio);
            1.0
        };

        let canvas = Vec2::new(canvas_width / dpr, canvas_height / dpr);
        let output = Vec2::new(canvas.y * self.aspect_ratio, canvas.y);
        let mut changed = false;

        if self.canvas != Some(canvas) {
            self.canvas = Some(canvas);
            changed = true;
            log::info!("Viewport canvas {}x{} (dpr {})", canvas.x, canvas.y, dpr);
        }

        if self.output != Some(output) {
            self.output = Some(output);
            changed = true;
            log::info!("Viewport output {}x{}", output.x, output.y);
        }

        changed
    }

    /// True once `on_resize` has been called
    pub fn is_sized(&self) -> bool {
        self.output.is_some()
    }

    pub fn try_canvas_size(&self) -> Option<Vec2> {
        self.canvas
    }

    pub fn try_output_size(&self) -> Option<Vec2> {
        self.output
    }

    pub fn canvas_width(&self) -> f32 {
        self.canvas_size().x
    }

    pub fn canvas_height(&self) -> f32 {
        self.canvas_size().y
    }

    pub fn output_width(&self) -> f32 {
        self.output_size().x
    }

    pub fn output_height(&self) -> f32 {
        self.output_size().y
    }

    pub fn output_offset_x(&self) -> f32 {
        (self.canvas_width() - self.output_width()) / 2.0
    }

    pub fn output_offset_y(&self) -> f32 {
        (self.canvas_height() - self.output_height()) / 2.0
    }

    /// Output pixels per logical unit
    pub fn scale(&self) -> f32 {
        self.output_height() / self.render_height
    }

    /// Map a logical point to output (CSS pixel) coordinates
    pub fn to_output(&self, point: Vec2) -> Vec2 {
        Vec2::new(self.output_offset_x(), self.output_offset_y()) + point * self.scale()
    }

    fn canvas_size(&self) -> Vec2 {
        self.canvas
            .unwrap_or_else(|| panic!("viewport canvas size read before the first resize"))
    }

    fn output_size(&self) -> Vec2 {
        self.output
            .unwrap_or_else(|| panic!("viewport output size read before the first resize"))
    }
}
