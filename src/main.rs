use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dicom_mpr::{PlaneAxis, ViewerSession, VolumeLoader, config::ViewerConfig, render};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dicom-mpr", about = "Render orthogonal slices of a DICOM or image stack folder")]
#[command(version)]
struct Args {
    /// Folder containing .dcm files or a PNG/JPEG/TIFF/BMP stack
    folder: PathBuf,

    /// Plane shown in the secondary view
    #[arg(short, long, default_value = "axial")]
    plane: PlaneAxis,

    #[arg(long, allow_negative_numbers = true)]
    axial_index: Option<i64>,

    /// Index along the secondary plane, defaults to its center
    #[arg(long, allow_negative_numbers = true)]
    plane_index: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    center: Option<f32>,

    #[arg(long)]
    width: Option<f32>,

    #[arg(long, allow_negative_numbers = true)]
    brightness: Option<f32>,

    #[arg(long)]
    contrast: Option<f32>,

    #[arg(long)]
    gamma: Option<f32>,

    /// TOML file with canvas and window defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if args.verbose { "debug" } else { "warn" })
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &args.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => ViewerConfig::default(),
    };

    let (volume, metadata) = VolumeLoader::default()
        .load_from_directory(&args.folder)
        .with_context(|| format!("Failed to load {}", args.folder.display()))?;

    let mut session = ViewerSession::new();
    session.load(volume, metadata);
    if let Some(window) = config.window {
        session.set_window(window);
    }

    session.set_plane(args.plane);
    session.set_axial_index(args.axial_index.unwrap_or(session.axial_extent() as i64 / 2));
    session.set_plane_index(args.plane_index.unwrap_or(session.plane_extent() as i64 / 2));
    if let Some(center) = args.center {
        session.set_window_center(center);
    }
    if let Some(width) = args.width {
        session.set_window_width(width);
    }
    if let Some(brightness) = args.brightness {
        session.set_brightness(brightness);
    }
    if let Some(contrast) = args.contrast {
        session.set_contrast(contrast);
    }
    if let Some(gamma) = args.gamma {
        session.set_gamma(gamma);
    }

    let canvas = config.canvas.size();
    let frame = session
        .render(canvas)
        .context("No volume available to render")?;

    std::fs::create_dir_all(&args.output_dir)?;
    for (name, view) in [("primary.png", &frame.primary), ("secondary.png", &frame.secondary)] {
        let path = args.output_dir.join(name);
        render::compose(view, canvas)
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), label = %view.label, "View saved");
    }

    println!("{}", session.summary());
    Ok(())
}
