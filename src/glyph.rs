// Pure geometry: turns a frame + config into the list of triangles to paint.
// Nothing here touches a surface, so every step can be checked in isolation.
//
// Visual: each grid point becomes a triangle in its own color; brighter pixels
// give bigger triangles, and neighbouring cells flip up/down like a checkerboard.

use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::types::{Frame, Point};
use image::Rgb;

/// Samples whose glyph would be this size or smaller are skipped entirely.
/// Visual: dark regions stay plain background.
pub const SIZE_FLOOR: f32 = 1.0;

const HALF_SQRT_3: f32 = 0.866_025_4; // sqrt(3) / 2

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Up,
    Down,
}

/// Arithmetic mean of the three channels, in [0, 255].
#[inline]
pub fn brightness(color: Rgb<u8>) -> f32 {
    let [r, g, b] = color.0;
    (r as u32 + g as u32 + b as u32) as f32 / 3.0
}

/// Linear map of brightness [0, 255] onto [0, max_size].
#[inline]
pub fn glyph_size(brightness: f32, max_size: f32) -> f32 {
    (brightness / 255.0) * max_size
}

/// Checkerboard on grid indices: even (x/spacing + y/spacing) points up.
#[inline]
pub fn orientation_at(x: u32, y: u32, spacing: u32) -> Orientation {
    if ((x / spacing) + (y / spacing)) % 2 == 0 {
        Orientation::Up
    } else {
        Orientation::Down
    }
}

/// Equilateral triangle of side `size` centered on (cx, cy).
/// Up: apex on top, base below. Down: the same shape flipped vertically.
pub fn triangle(cx: f32, cy: f32, size: f32, orientation: Orientation) -> [Point; 3] {
    let h = size * HALF_SQRT_3;
    let half = size / 2.0;
    match orientation {
        Orientation::Up => [
            Point::new(cx, cy - h / 2.0),
            Point::new(cx - half, cy + h / 2.0),
            Point::new(cx + half, cy + h / 2.0),
        ],
        Orientation::Down => [
            Point::new(cx, cy + h / 2.0),
            Point::new(cx - half, cy - h / 2.0),
            Point::new(cx + half, cy - h / 2.0),
        ],
    }
}

/// Unsigned area via the shoelace formula.
pub fn triangle_area(v: &[Point; 3]) -> f32 {
    let [a, b, c] = v;
    ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)).abs() / 2.0
}

/// One visited grid point, with everything derived from its source pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplePoint {
    pub x: u32,
    pub y: u32,
    pub orientation: Orientation,
    pub color: Rgb<u8>,
    pub brightness: f32,
    pub size: f32,
}

impl SamplePoint {
    /// False for samples at or under [`SIZE_FLOOR`].
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.size > SIZE_FLOOR
    }

    pub fn glyph(&self) -> Glyph {
        Glyph {
            vertices: triangle(self.x as f32, self.y as f32, self.size, self.orientation),
            color: self.color,
        }
    }
}

/// A filled triangle ready to paint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glyph {
    pub vertices: [Point; 3],
    pub color: Rgb<u8>,
}

/// Walk the sampling grid in raster order: rows by `grid_spacing`, then columns.
/// Both bounds are exclusive, so a 10 px wide frame with spacing 8 visits x = 0 and 8.
/// Fails with `InvalidConfiguration` before walking anything if `config` is invalid.
pub fn sample_points<'a, F: Frame + ?Sized>(
    frame: &'a F,
    config: &RendererConfig,
) -> Result<impl Iterator<Item = SamplePoint> + use<'a, F>, RenderError> {
    config.validate()?;
    let step = config.grid_spacing as usize;
    let max_size = config.max_glyph_size;
    let (width, height) = (frame.width(), frame.height());

    Ok((0..height).step_by(step).flat_map(move |y| {
        (0..width).step_by(step).map(move |x| {
            let color = frame.pixel(x, y);
            let brightness = brightness(color);
            SamplePoint {
                x,
                y,
                orientation: orientation_at(x, y, step as u32),
                color,
                brightness,
                size: glyph_size(brightness, max_size),
            }
        })
    }))
}

/// Every glyph a frame produces, in paint order.
pub fn glyphs<'a, F: Frame + ?Sized>(
    frame: &'a F,
    config: &RendererConfig,
) -> Result<impl Iterator<Item = Glyph> + use<'a, F>, RenderError> {
    Ok(sample_points(frame, config)?
        .filter(SamplePoint::is_visible)
        .map(|s| s.glyph()))
}
