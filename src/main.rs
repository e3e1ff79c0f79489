// What you SEE:
// • `live`: the camera feed redrawn as colored triangles on black. ESC quits.
// • `still`: one image file stylized the same way and written back to disk.

use clap::{Args, Parser, Subcommand};
use image::Rgb;
use std::path::{Path, PathBuf};
use triangle_cam::config::{DEFAULT_GRID_SPACING, DEFAULT_MAX_GLYPH_SIZE, parse_hex_color};
use triangle_cam::{
    CameraCapture, Drawer, Error, FrameBuffer, FrameLoop, FrameSource, RendererConfig, StillImage,
    StylizedRenderer,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Stylize a camera feed into triangle glyphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stylize the live camera feed in a window.
    Live {
        /// Camera device index (0 = default webcam).
        #[arg(long, default_value_t = 0)]
        camera: u32,
        /// Requested capture width; the device may pick something close.
        #[arg(long, default_value_t = 640)]
        width: u32,
        /// Requested capture height.
        #[arg(long, default_value_t = 480)]
        height: u32,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Stylize one image file and save the result.
    Still {
        /// Image to read.
        input: PathBuf,
        /// Where to write the result; the extension picks the format.
        output: PathBuf,
        #[command(flatten)]
        style: StyleArgs,
    },
}

#[derive(Args, Debug)]
struct StyleArgs {
    /// Pixels between sampled grid points.
    #[arg(long, default_value_t = DEFAULT_GRID_SPACING)]
    spacing: u32,
    /// Triangle side length for a pure white sample.
    #[arg(long, default_value_t = DEFAULT_MAX_GLYPH_SIZE)]
    size: f32,
    /// Background color as RRGGBB.
    #[arg(long, default_value = "000000", value_parser = parse_hex_color)]
    background: Rgb<u8>,
}

impl StyleArgs {
    fn renderer(&self) -> Result<StylizedRenderer, Error> {
        let config = RendererConfig {
            max_glyph_size: self.size,
            grid_spacing: self.spacing,
            background: self.background,
        };
        Ok(StylizedRenderer::new(config)?)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Commands::Live {
            camera,
            width,
            height,
            style,
        } => run_live(camera, width, height, &style),
        Commands::Still {
            input,
            output,
            style,
        } => run_still(&input, &output, &style),
    }
}

fn run_live(index: u32, width: u32, height: u32, style: &StyleArgs) -> Result<(), Error> {
    let renderer = style.renderer()?;
    log::info!("starting live mode with {:?}", renderer.config());

    /* --- Camera + window setup ---
       Visual: window opens sized to what the camera actually delivers. */
    let cam = CameraCapture::new(index, width, height)?;
    let (w, h) = cam.resolution();
    let mut drawer = Drawer::new("Triangle Cam", w as usize, h as usize)?;

    /* --- Main loop: one stylized frame per window refresh until ESC/close --- */
    let mut handle = FrameLoop::start(cam, renderer);
    handle.run(&mut drawer)
}

fn run_still(input: &Path, output: &Path, style: &StyleArgs) -> Result<(), Error> {
    let renderer = style.renderer()?;
    let mut source = StillImage::open(input)?;
    let frame = source.current_frame()?;

    let (w, h) = frame.dimensions();
    let mut surface = FrameBuffer::new(w as usize, h as usize);
    let stats = renderer.render(&frame, &mut surface)?;
    log::info!(
        "{} -> {}: {} of {} samples drawn",
        input.display(),
        output.display(),
        stats.glyphs,
        stats.samples
    );

    surface.to_rgb_image().save(output)?;
    Ok(())
}
