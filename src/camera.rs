// Frame sources: the live camera and a single still image.
// Visual expectation: when the loop asks for `current_frame()`, you get an
// RGB image of what the camera sees right now, ready to be stylized.

use crate::error::Error;
use image::RgbImage;
use std::path::Path;

// Bring in nokhwa types for camera control.
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

/// Anything that can hand the loop one frame at a time.
pub trait FrameSource {
    /// Current frame size in pixels.
    fn resolution(&self) -> (u32, u32);
    /// True once a frame can be read without waiting on device setup.
    fn is_ready(&self) -> bool;
    /// The most recent frame. Older frames are never queued.
    fn current_frame(&mut self) -> Result<RgbImage, Error>;
}

// A small wrapper around nokhwa::Camera so the frame loop stays clean.
pub struct CameraCapture {
    cam: Camera,
    width: u32,
    height: u32,
}

impl CameraCapture {
    /// Open camera `index` at a target resolution (falls back if not exact).
    /// On success, nothing is shown on screen yet; we just hold an open stream.
    pub fn new(index: u32, width: u32, height: u32) -> Result<Self, Error> {
        let idx = CameraIndex::Index(index);

        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            30,                // target FPS
        );

        // Ask for RGB frames, closest to the requested format.
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam =
            Camera::new(idx, req).map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;

        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

        // The actual stream might choose a slightly different resolution.
        let actual = cam.resolution();
        log::info!(
            "camera {index} streaming at {}x{} (asked for {width}x{height})",
            actual.width(),
            actual.height()
        );

        Ok(Self {
            cam,
            width: actual.width(),
            height: actual.height(),
        })
    }
}

impl FrameSource for CameraCapture {
    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn is_ready(&self) -> bool {
        self.cam.is_stream_open()
    }

    /// Grab one frame from the camera (blocks until the device delivers it).
    fn current_frame(&mut self) -> Result<RgbImage, Error> {
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;

        // Decode to ImageBuffer<Rgb<u8>, Vec<u8>> (handles the raw formats safely).
        let rgb = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;

        // The device may renegotiate mid-stream; the loop resizes to match.
        (self.width, self.height) = rgb.dimensions();
        Ok(rgb)
    }
}

/// One picture standing in for a camera. Always ready.
pub struct StillImage {
    image: RgbImage,
}

impl StillImage {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Load any format the `image` crate understands.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let image = image::open(path.as_ref())?.to_rgb8();
        log::debug!(
            "loaded {} ({}x{})",
            path.as_ref().display(),
            image.width(),
            image.height()
        );
        Ok(Self { image })
    }
}

impl FrameSource for StillImage {
    fn resolution(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn current_frame(&mut self) -> Result<RgbImage, Error> {
        Ok(self.image.clone())
    }
}
