// Per-refresh driver: once per tick, if the source has a frame, stylize it.
// Visual: the window shows the newest stylized frame; slow ticks just drop frames.

use crate::camera::FrameSource;
use crate::error::{Error, RenderError};
use crate::render::{RenderStats, StylizedRenderer};
use crate::types::{FrameBuffer, Surface};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// The host side of the loop: hands out refresh ticks and shows results.
pub trait Host<T: ?Sized = FrameBuffer> {
    /// Wait for the next refresh. False once the host is shutting down.
    fn next_tick(&mut self) -> bool;
    fn present(&mut self, surface: &T) -> Result<(), Error>;
}

/// Revocation flag shared between a [`LoopHandle`] and anyone who may stop it.
#[derive(Clone, Debug, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new frame is on the surface.
    Rendered(RenderStats),
    /// The source had nothing yet; the renderer was not called.
    NotReady,
    /// The frame was dropped after a recoverable render error.
    Skipped,
    /// The loop has been stopped; nothing was done.
    Stopped,
}

/// Counters plus a once-a-second FPS log line.
#[derive(Debug)]
pub struct LoopStats {
    pub rendered: u64,
    pub skipped: u64,
    frames_this_second: u32,
    last_fps_time: Instant,
}

impl LoopStats {
    fn new() -> Self {
        Self {
            rendered: 0,
            skipped: 0,
            frames_this_second: 0,
            last_fps_time: Instant::now(),
        }
    }

    fn record_rendered(&mut self) {
        self.rendered += 1;
        self.frames_this_second += 1;

        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_time);
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames_this_second as f32 / elapsed.as_secs_f32();
            log::info!("FPS: {fps:.1} ({} dropped so far)", self.skipped);
            self.frames_this_second = 0;
            self.last_fps_time = now;
        }
    }
}

pub struct FrameLoop;

impl FrameLoop {
    /// Bind a source to a renderer, painting into a `FrameBuffer` sized to the
    /// source. Nothing runs until the handle is ticked.
    pub fn start<S: FrameSource>(source: S, renderer: StylizedRenderer) -> LoopHandle<S> {
        let (w, h) = source.resolution();
        Self::start_with_surface(source, renderer, FrameBuffer::new(w as usize, h as usize))
    }

    /// Same as [`FrameLoop::start`] with a caller-provided surface.
    pub fn start_with_surface<S: FrameSource, T: Surface>(
        source: S,
        renderer: StylizedRenderer,
        surface: T,
    ) -> LoopHandle<S, T> {
        log::debug!("frame loop started at {}x{}", surface.width(), surface.height());
        LoopHandle {
            source,
            renderer,
            surface,
            token: StopToken::default(),
            stats: LoopStats::new(),
        }
    }
}

/// A running loop. Owns the source, the renderer and the output surface.
pub struct LoopHandle<S: FrameSource, T: Surface = FrameBuffer> {
    source: S,
    renderer: StylizedRenderer,
    surface: T,
    token: StopToken,
    stats: LoopStats,
}

impl<S: FrameSource, T: Surface> LoopHandle<S, T> {
    /// Revoke all future ticks. The renderer is never called after this.
    pub fn stop(&self) {
        self.token.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_stopped()
    }

    /// A clone of the revocation flag, for stopping from elsewhere.
    pub fn stop_token(&self) -> StopToken {
        self.token.clone()
    }

    /// The most recently rendered image.
    pub fn surface(&self) -> &T {
        &self.surface
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    /// Render at most one frame.
    pub fn tick(&mut self) -> Result<TickOutcome, Error> {
        if self.is_stopped() {
            return Ok(TickOutcome::Stopped);
        }
        if !self.source.is_ready() {
            log::trace!("source not ready");
            return Ok(TickOutcome::NotReady);
        }

        let frame = self.source.current_frame()?;
        let (w, h) = frame.dimensions();
        if (self.surface.width(), self.surface.height()) != (w, h) {
            log::debug!("resizing surface to {w}x{h}");
            self.surface.resize(w, h);
        }

        // A stop requested while the frame was being fetched still wins.
        if self.is_stopped() {
            return Ok(TickOutcome::Stopped);
        }

        match self.renderer.render(&frame, &mut self.surface) {
            Ok(stats) => {
                self.stats.record_rendered();
                Ok(TickOutcome::Rendered(stats))
            }
            Err(e @ (RenderError::SurfaceWriteFailed(_) | RenderError::DimensionMismatch { .. })) => {
                log::warn!("dropping frame: {e}");
                self.stats.skipped += 1;
                Ok(TickOutcome::Skipped)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Tick until the host stops ticking or someone stops the handle.
    /// Only freshly rendered frames are presented.
    pub fn run<H: Host<T> + ?Sized>(&mut self, host: &mut H) -> Result<(), Error> {
        let result = self.drive(host);
        self.stop();
        log::info!(
            "frame loop finished: {} rendered, {} dropped",
            self.stats.rendered,
            self.stats.skipped
        );
        result
    }

    fn drive<H: Host<T> + ?Sized>(&mut self, host: &mut H) -> Result<(), Error> {
        while !self.is_stopped() && host.next_tick() {
            if let TickOutcome::Rendered(_) = self.tick()? {
                host.present(&self.surface)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::StillImage;
    use crate::config::RendererConfig;
    use image::{Rgb, RgbImage};

    /// A white source whose readiness and size the test controls.
    struct ScriptedSource {
        ready: bool,
        frames_served: u32,
        size: (u32, u32),
    }

    impl ScriptedSource {
        fn new(ready: bool, size: (u32, u32)) -> Self {
            Self {
                ready,
                frames_served: 0,
                size,
            }
        }
    }

    impl FrameSource for ScriptedSource {
        fn resolution(&self) -> (u32, u32) {
            self.size
        }

        fn is_ready(&self) -> bool {
            self.ready
        }

        fn current_frame(&mut self) -> Result<RgbImage, Error> {
            self.frames_served += 1;
            Ok(RgbImage::from_pixel(self.size.0, self.size.1, Rgb([255, 255, 255])))
        }
    }

    /// Ticks a fixed number of times, counting presents.
    struct CountingHost {
        ticks_left: u32,
        presented: u32,
        on_tick: Option<Box<dyn FnMut(u32)>>,
    }

    impl CountingHost {
        fn new(ticks: u32) -> Self {
            Self {
                ticks_left: ticks,
                presented: 0,
                on_tick: None,
            }
        }
    }

    impl Host for CountingHost {
        fn next_tick(&mut self) -> bool {
            if self.ticks_left == 0 {
                return false;
            }
            self.ticks_left -= 1;
            if let Some(f) = self.on_tick.as_mut() {
                f(self.ticks_left);
            }
            true
        }

        fn present(&mut self, surface: &FrameBuffer) -> Result<(), Error> {
            assert!(!surface.pixels.is_empty());
            self.presented += 1;
            Ok(())
        }
    }

    fn renderer() -> StylizedRenderer {
        StylizedRenderer::new(RendererConfig::default()).unwrap()
    }

    #[test]
    fn test_not_ready_source_is_never_rendered() {
        let mut handle = FrameLoop::start(ScriptedSource::new(false, (16, 16)), renderer());
        assert_eq!(handle.tick().unwrap(), TickOutcome::NotReady);
        assert_eq!(handle.source.frames_served, 0);
        assert_eq!(handle.stats().rendered, 0);
    }

    #[test]
    fn test_tick_renders_once() {
        let mut handle = FrameLoop::start(ScriptedSource::new(true, (16, 16)), renderer());
        let outcome = handle.tick().unwrap();
        assert_eq!(
            outcome,
            TickOutcome::Rendered(RenderStats {
                samples: 4,
                glyphs: 4
            })
        );
        assert_eq!(handle.source.frames_served, 1);
        assert_eq!(handle.surface().pixel(0, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_surface_follows_frame_size() {
        let mut handle = FrameLoop::start(ScriptedSource::new(true, (16, 16)), renderer());
        handle.tick().unwrap();
        handle.source.size = (24, 10);
        assert!(matches!(handle.tick().unwrap(), TickOutcome::Rendered(_)));
        assert_eq!((handle.surface().width, handle.surface().height), (24, 10));
        assert_eq!(handle.surface().pixels.len(), 240);
    }

    #[test]
    fn test_stop_revokes_future_ticks() {
        let mut handle = FrameLoop::start(ScriptedSource::new(true, (8, 8)), renderer());
        let token = handle.stop_token();
        token.stop();
        assert!(handle.is_stopped());
        assert_eq!(handle.tick().unwrap(), TickOutcome::Stopped);
        assert_eq!(handle.source.frames_served, 0);
    }

    #[test]
    fn test_run_presents_each_rendered_frame() {
        let mut handle = FrameLoop::start(StillImage::new(RgbImage::new(16, 16)), renderer());
        let mut host = CountingHost::new(5);
        handle.run(&mut host).unwrap();
        assert_eq!(host.presented, 5);
        assert_eq!(handle.stats().rendered, 5);
        assert!(handle.is_stopped());
    }

    #[test]
    fn test_run_stops_when_token_fires() {
        let mut handle = FrameLoop::start(StillImage::new(RgbImage::new(8, 8)), renderer());
        let token = handle.stop_token();
        let mut host = CountingHost::new(100);
        host.on_tick = Some(Box::new(move |left| {
            if left == 97 {
                token.stop();
            }
        }));
        handle.run(&mut host).unwrap();
        // ticks 1 and 2 render; on tick 3 the stop lands before rendering
        assert_eq!(host.presented, 2);
        assert_eq!(handle.stats().rendered, 2);
    }

    #[test]
    fn test_run_never_presents_without_a_ready_frame() {
        let mut handle = FrameLoop::start(ScriptedSource::new(false, (8, 8)), renderer());
        let mut host = CountingHost::new(4);
        handle.run(&mut host).unwrap();
        assert_eq!(host.presented, 0);
        assert_eq!(handle.source.frames_served, 0);
        assert_eq!(host.ticks_left, 0);
    }

    /// A `FrameBuffer` that rejects fills for the first `failures_left` frames,
    /// and optionally refuses to resize.
    struct FlakySurface {
        inner: FrameBuffer,
        failures_left: u32,
        fixed_size: bool,
    }

    impl FlakySurface {
        fn new(width: usize, height: usize, failures: u32) -> Self {
            Self {
                inner: FrameBuffer::new(width, height),
                failures_left: failures,
                fixed_size: false,
            }
        }
    }

    impl Surface for FlakySurface {
        fn width(&self) -> u32 {
            Surface::width(&self.inner)
        }

        fn height(&self) -> u32 {
            Surface::height(&self.inner)
        }

        fn resize(&mut self, width: u32, height: u32) {
            if !self.fixed_size {
                Surface::resize(&mut self.inner, width, height);
            }
        }

        fn clear(&mut self, color: Rgb<u8>) {
            self.inner.clear(color);
        }

        fn fill_polygon(
            &mut self,
            vertices: &[crate::types::Point],
            color: Rgb<u8>,
        ) -> Result<(), RenderError> {
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(RenderError::SurfaceWriteFailed("device lost".into()));
            }
            self.inner.fill_polygon(vertices, color)
        }
    }

    #[test]
    fn test_failed_write_drops_frame_and_next_tick_retries() {
        let surface = FlakySurface::new(16, 16, 1);
        let mut handle =
            FrameLoop::start_with_surface(ScriptedSource::new(true, (16, 16)), renderer(), surface);

        assert_eq!(handle.tick().unwrap(), TickOutcome::Skipped);
        assert_eq!(handle.stats().skipped, 1);
        assert_eq!(handle.stats().rendered, 0);

        assert!(matches!(handle.tick().unwrap(), TickOutcome::Rendered(_)));
        assert_eq!(handle.stats().skipped, 1);
        assert_eq!(handle.stats().rendered, 1);
        assert_eq!(handle.surface().inner.pixel(0, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_unresizable_surface_skips_mismatched_frames() {
        let mut surface = FlakySurface::new(8, 8, 0);
        surface.fixed_size = true;
        let mut handle =
            FrameLoop::start_with_surface(ScriptedSource::new(true, (16, 16)), renderer(), surface);

        assert_eq!(handle.tick().unwrap(), TickOutcome::Skipped);
        assert_eq!(handle.stats().skipped, 1);
        // untouched: the mismatch is caught before the clear
        assert!(handle.surface().inner.pixels.iter().all(|&p| p == 0));

        handle.source.size = (8, 8);
        assert!(matches!(handle.tick().unwrap(), TickOutcome::Rendered(_)));
        assert_eq!(handle.stats().rendered, 1);
    }

    #[test]
    fn test_run_presents_only_rendered_frames_after_a_drop() {
        let surface = FlakySurface::new(16, 16, 1);
        let mut handle =
            FrameLoop::start_with_surface(ScriptedSource::new(true, (16, 16)), renderer(), surface);
        let mut host = FlakyHost { ticks_left: 3, presented: 0 };
        handle.run(&mut host).unwrap();
        assert_eq!(host.presented, 2);
        assert_eq!(handle.stats().skipped, 1);
    }

    struct FlakyHost {
        ticks_left: u32,
        presented: u32,
    }

    impl Host<FlakySurface> for FlakyHost {
        fn next_tick(&mut self) -> bool {
            if self.ticks_left == 0 {
                return false;
            }
            self.ticks_left -= 1;
            true
        }

        fn present(&mut self, _surface: &FlakySurface) -> Result<(), Error> {
            self.presented += 1;
            Ok(())
        }
    }
}
