// Window + software drawing utilities.
// Visual effects provided here:
// 1) A window that shows the stylized camera image.
// 2) Solid clears and filled polygons on a FrameBuffer (the triangles you see).

use crate::error::{Error, RenderError};
use crate::frame_loop::Host;
use crate::types::{FrameBuffer, Point, Surface, pack_rgb};
use image::Rgb;
use minifb::{Key, Window, WindowOptions};

const TARGET_FPS: usize = 60;

pub struct Drawer {
    window: Window,  // the on-screen window you see
    presented: bool, // whether this tick already pumped window events
}

impl Drawer {
    /// Create a window sized to the camera feed.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(TARGET_FPS);
        Ok(Self {
            window,
            presented: true,
        })
    }

    /// Push the pixels for this frame to the screen.
    /// Visual: the window immediately displays the new image.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        self.presented = true;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// True while ESC is held down (we'll exit when this is pressed).
    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }
}

impl Host for Drawer {
    fn next_tick(&mut self) -> bool {
        // Nothing was presented last tick (camera not ready): still pump events
        // so closing the window keeps working.
        if !self.presented {
            self.window.update();
        }
        self.presented = false;
        self.is_open() && !self.esc_pressed()
    }

    fn present(&mut self, surface: &FrameBuffer) -> Result<(), Error> {
        Drawer::present(self, surface)
    }
}

/* ---------- Software drawing: clear + scanline polygon fill ---------- */

/// Fill pixels [x0, x1) of row y. Callers clip to the buffer first.
#[inline]
fn fill_span(fb: &mut FrameBuffer, y: usize, x0: usize, x1: usize, color: u32) {
    let row = y * fb.width;
    fb.pixels[row + x0..row + x1].fill(color);
}

/// Scanline fill of a simple polygon, even-odd rule.
/// A pixel is painted when its center (x + 0.5, y + 0.5) lies inside.
/// Visual: a hard-edged solid shape; anything off-screen is clipped away.
pub fn fill_polygon(fb: &mut FrameBuffer, vertices: &[Point], color: u32) -> Result<(), RenderError> {
    if vertices.len() < 3 {
        return Err(RenderError::SurfaceWriteFailed(format!(
            "polygon needs at least 3 vertices, got {}",
            vertices.len()
        )));
    }
    if vertices.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(RenderError::SurfaceWriteFailed(
            "polygon has a non-finite vertex".into(),
        ));
    }
    if fb.width == 0 || fb.height == 0 {
        return Ok(());
    }

    // Vertical extent of the shape, clipped to the buffer rows.
    let (min_y, max_y) = vertices
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.y), hi.max(p.y))
        });
    let first_row = (min_y - 0.5).ceil().max(0.0) as usize;
    let last_row = ((max_y - 0.5).floor().min(fb.height as f32 - 1.0)).max(-1.0);
    if last_row < 0.0 {
        return Ok(());
    }
    let last_row = last_row as usize;

    let max_x = fb.width as f32;
    let mut crossings: Vec<f32> = Vec::with_capacity(vertices.len());

    for y in first_row..=last_row {
        let sy = y as f32 + 0.5;

        // Where does this scanline cross each edge? Half-open in y so shared
        // vertices count once.
        crossings.clear();
        for (i, a) in vertices.iter().enumerate() {
            let b = &vertices[(i + 1) % vertices.len()];
            if (a.y <= sy && b.y > sy) || (b.y <= sy && a.y > sy) {
                let t = (sy - a.y) / (b.y - a.y);
                crossings.push(a.x + t * (b.x - a.x));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));

        // Inside between each pair of crossings.
        for pair in crossings.chunks_exact(2) {
            let x0 = (pair[0] - 0.5).ceil().clamp(0.0, max_x) as usize;
            let x1 = (pair[1] - 0.5).ceil().clamp(0.0, max_x) as usize;
            if x0 < x1 {
                fill_span(fb, y, x0, x1, color);
            }
        }
    }
    Ok(())
}

impl Surface for FrameBuffer {
    fn width(&self) -> u32 {
        self.width as u32
    }

    fn height(&self) -> u32 {
        self.height as u32
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width as usize;
        self.height = height as usize;
        self.pixels.resize(self.width * self.height, 0);
    }

    /// Visual: the whole image turns one flat color.
    fn clear(&mut self, color: Rgb<u8>) {
        self.pixels.fill(pack_rgb(color));
    }

    fn fill_polygon(&mut self, vertices: &[Point], color: Rgb<u8>) -> Result<(), RenderError> {
        fill_polygon(self, vertices, pack_rgb(color))
    }
}
