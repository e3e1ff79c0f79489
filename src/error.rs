// Error types. Every variant states *where* things went wrong.
// `RenderError` belongs to the stylizer itself; `Error` wraps it together with
// the camera/window/image failures of the surrounding app.
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    /// Renderer settings that can never produce a picture (fix the config).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Frame and surface disagree on size; resize the surface and try again.
    #[error("Dimension mismatch: frame is {}x{}, surface is {}x{}", .frame.0, .frame.1, .surface.0, .surface.1)]
    DimensionMismatch {
        frame: (u32, u32),
        surface: (u32, u32),
    },
    /// The surface rejected a draw call; the frame is left half drawn.
    #[error("Surface write failed: {0}")]
    SurfaceWriteFailed(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String),
    #[error("Window update error: {0}")]
    WindowUpdate(String),
    #[error("Camera init error: {0}")]
    CameraInit(String),
    #[error("Camera frame error: {0}")]
    CameraFrame(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
