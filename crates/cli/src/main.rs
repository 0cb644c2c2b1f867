use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use firewatch_core::capture::domain::frame_source::FrameSource;
use firewatch_core::capture::infrastructure::opencv_source::OpencvFrameSource;
use firewatch_core::detection::infrastructure::onnx_detector::OnnxDetector;
use firewatch_core::pipeline::annotate_frame_use_case::AnnotateFrameUseCase;
use firewatch_core::shared::constants::{DEFAULT_CONFIDENCE, MODEL_NAME};
use firewatch_core::shared::frame::Frame;
use firewatch_core::shared::model_resolver;

/// Fire and smoke detection for a single image.
#[derive(Parser)]
#[command(name = "firewatch")]
struct Cli {
    /// Input image file (PNG or JPEG).
    input: PathBuf,

    /// Annotated output file. Defaults to `{stem}_annotated{ext}`.
    output: Option<PathBuf>,

    /// Detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Model weights file (overrides the default lookup).
    #[arg(long)]
    model: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!("confidence must be within 0.0-1.0, got {}", cli.confidence).into());
    }

    let model_path = match cli.model {
        Some(path) => path,
        None => model_resolver::resolve(MODEL_NAME, Some(Path::new("models")))?,
    };

    log::info!("using model {}", model_path.display());
    let detector = OnnxDetector::new(&model_path, cli.confidence)?;
    let mut pipeline = AnnotateFrameUseCase::new(Box::new(detector));

    let source = OpencvFrameSource::new();
    let frame = source.load_image(&cli.input)?;
    let annotated = pipeline.execute(frame)?;

    let output = cli
        .output
        .unwrap_or_else(|| default_output_path(&cli.input));
    save_frame(&annotated, &output)?;

    println!("Saved {}", output.display());
    Ok(())
}

/// `photo.jpg` → `photo_annotated.jpg`, next to the input.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let ext = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_annotated{ext}"))
}

fn save_frame(frame: &Frame, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or("Failed to create image from frame data")?;
    img.save(path)?;
    Ok(())
}
