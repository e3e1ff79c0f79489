// Core types shared by the renderer, the rasterizer and the camera glue.

use crate::error::RenderError;
use image::{Rgb, RgbImage};

/// A packed 0x00RRGGBB screen buffer (the layout minifb presents directly).
/// Used both as the destination surface and, in tests, as a source frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,     // pixels per row
    pub height: usize,    // rows
    pub pixels: Vec<u32>, // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// An all-black buffer of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u32; width * height],
        }
    }

    /// A buffer where every pixel has the same color.
    pub fn filled(width: usize, height: usize, color: Rgb<u8>) -> Self {
        Self {
            width,
            height,
            pixels: vec![pack_rgb(color); width * height],
        }
    }

    /// Color at (x,y). Panics when out of bounds, like slice indexing.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgb<u8> {
        unpack_rgb(self.pixels[y * self.width + x])
    }

    /// Copy into an `image` buffer so it can be saved to disk.
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            self.pixel(x as usize, y as usize)
        })
    }
}

#[inline]
pub fn pack_rgb(color: Rgb<u8>) -> u32 {
    let [r, g, b] = color.0;
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline]
pub fn unpack_rgb(px: u32) -> Rgb<u8> {
    Rgb([
        ((px >> 16) & 0xFF) as u8,
        ((px >> 8) & 0xFF) as u8,
        (px & 0xFF) as u8,
    ])
}

/// A vertex in surface coordinates. Pixel (x,y) covers [x, x+1) x [y, y+1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Read-only view of one source frame.
pub trait Frame {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Color at (x,y); callers keep coordinates in bounds.
    fn pixel(&self, x: u32, y: u32) -> Rgb<u8>;
}

impl Frame for RgbImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        *self.get_pixel(x, y)
    }
}

impl Frame for FrameBuffer {
    fn width(&self) -> u32 {
        self.width as u32
    }

    fn height(&self) -> u32 {
        self.height as u32
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        FrameBuffer::pixel(self, x as usize, y as usize)
    }
}

/// Mutable raster sink the renderer paints into.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Reallocate to a new size; contents afterwards are unspecified.
    fn resize(&mut self, width: u32, height: u32);
    fn clear(&mut self, color: Rgb<u8>);
    /// Fill a simple polygon with an opaque color.
    fn fill_polygon(&mut self, vertices: &[Point], color: Rgb<u8>) -> Result<(), RenderError>;
}
