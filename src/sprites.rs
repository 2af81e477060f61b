//! Sprite regions inside an image atlas

/// Pixel rectangle of one sprite in an atlas image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteRegion {
    /// Left-most pixel column
    pub x: f32,
    /// Top-most pixel row
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub name: Option<&'static str>,
}

impl SpriteRegion {
    pub const fn named(x: f32, y: f32, width: f32, height: f32, name: &'static str) -> Self {
        Self {
            x,
            y,
            width,
            height,
            name: Some(name),
        }
    }
}
