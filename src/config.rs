// Renderer settings. Defaults reproduce the classic look: 15 px triangles on an 8 px grid over black.

use crate::error::RenderError;
use image::Rgb;

pub const DEFAULT_MAX_GLYPH_SIZE: f32 = 15.0;
pub const DEFAULT_GRID_SPACING: u32 = 8;
pub const DEFAULT_BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RendererConfig {
    /// Side length of a glyph drawn for a pure white sample.
    pub max_glyph_size: f32,
    /// Pixel stride between sampled grid points on both axes.
    pub grid_spacing: u32,
    /// Color the surface is cleared to before each frame.
    pub background: Rgb<u8>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_glyph_size: DEFAULT_MAX_GLYPH_SIZE,
            grid_spacing: DEFAULT_GRID_SPACING,
            background: DEFAULT_BACKGROUND,
        }
    }
}

impl RendererConfig {
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.grid_spacing == 0 {
            return Err(RenderError::InvalidConfiguration(
                "grid_spacing must be greater than 0".into(),
            ));
        }
        if !self.max_glyph_size.is_finite() || self.max_glyph_size <= 0.0 {
            return Err(RenderError::InvalidConfiguration(format!(
                "max_glyph_size must be a positive number, got {}",
                self.max_glyph_size
            )));
        }
        Ok(())
    }
}

/// Parse `RRGGBB` (optionally prefixed with `#`) into a color.
/// Used as a clap value parser for `--background`.
pub fn parse_hex_color(s: &str) -> Result<Rgb<u8>, String> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("expected RRGGBB, got `{s}`"));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("bad color `{s}`: {e}"))
    };
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}
