// The stylizer: clear the surface, then paint one triangle per bright-enough grid point.
// Visual: the camera image rebuilt from small colored triangles on black.

use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::glyph::sample_points;
use crate::types::{Frame, Surface};

/// What one render call did, for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Grid points visited.
    pub samples: usize,
    /// Triangles painted.
    pub glyphs: usize,
}

/// Stateless frame-to-glyph renderer. Holds only its validated config.
#[derive(Clone, Debug)]
pub struct StylizedRenderer {
    config: RendererConfig,
}

impl StylizedRenderer {
    /// Rejects configs that can never draw anything sensible.
    pub fn new(config: RendererConfig) -> Result<Self, RenderError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Paint `frame` onto `surface`.
    ///
    /// Sizes must match; on mismatch nothing is touched. The surface is fully
    /// cleared first, so output never depends on what the previous frame left.
    /// If a fill fails the surface stays half drawn and the error is returned.
    pub fn render<F, S>(&self, frame: &F, surface: &mut S) -> Result<RenderStats, RenderError>
    where
        F: Frame + ?Sized,
        S: Surface + ?Sized,
    {
        let frame_dims = (frame.width(), frame.height());
        let surface_dims = (surface.width(), surface.height());
        if frame_dims != surface_dims {
            return Err(RenderError::DimensionMismatch {
                frame: frame_dims,
                surface: surface_dims,
            });
        }

        surface.clear(self.config.background);

        let mut stats = RenderStats::default();
        for sample in sample_points(frame, &self.config)? {
            stats.samples += 1;
            if !sample.is_visible() {
                continue;
            }
            let glyph = sample.glyph();
            surface.fill_polygon(&glyph.vertices, glyph.color)?;
            stats.glyphs += 1;
        }

        log::debug!(
            "rendered {}x{}: {} samples, {} glyphs",
            frame_dims.0,
            frame_dims.1,
            stats.samples,
            stats.glyphs
        );
        Ok(stats)
    }
}

/// One-shot form: validate `config`, then render.
pub fn render<F, S>(frame: &F, surface: &mut S, config: &RendererConfig) -> Result<RenderStats, RenderError>
where
    F: Frame + ?Sized,
    S: Surface + ?Sized,
{
    StylizedRenderer::new(*config)?.render(frame, surface)
}
