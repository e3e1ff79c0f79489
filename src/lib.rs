//! Live triangle-glyph stylizer.
//!
//! Each frame is sampled on a regular grid; every sample becomes an equilateral
//! triangle in the sampled color, sized by brightness and flipped up/down in a
//! checkerboard. [`glyph`] holds the pure geometry, [`render`] paints it onto a
//! [`types::Surface`], and [`frame_loop`] drives one render per display tick.

pub mod camera;
pub mod config;
pub mod draw;
pub mod error;
pub mod frame_loop;
pub mod glyph;
pub mod render;
pub mod types;

pub use camera::{CameraCapture, FrameSource, StillImage};
pub use config::RendererConfig;
pub use draw::Drawer;
pub use error::{Error, RenderError};
pub use frame_loop::{FrameLoop, Host, LoopHandle, StopToken, TickOutcome};
pub use glyph::{Glyph, Orientation, SamplePoint, glyphs, sample_points};
pub use render::{RenderStats, StylizedRenderer, render};
pub use types::{Frame, FrameBuffer, Point, Surface};
