//! Tile render CLI.
//!
//! Loads a raster, optionally zooms it to a bounding box, renders one tile
//! and writes it as PNG.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use raster_backend::MemoryBackend;
use raster_common::{BoundingBox, CrsCode};
use raster_registry::{DatasetRegistry, LoadOptions, RegistryConfig, RenderStrategy};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "tile-render")]
#[command(about = "Render a raster tile to PNG")]
struct Args {
    /// Raster file to load
    #[arg(short, long)]
    input: PathBuf,

    /// Style file (.css or .json)
    #[arg(short, long)]
    style: Option<PathBuf>,

    /// Tile extent as minx,miny,maxx,maxy in the zoom extent CRS; the whole raster when omitted
    #[arg(short, long)]
    bbox: Option<String>,

    /// CRS to assume for the input instead of the one it declares
    #[arg(long)]
    source_crs: Option<String>,

    /// Output CRS of the zoomed tile
    #[arg(long, default_value = "EPSG:3857")]
    crs: String,

    #[arg(long, default_value_t = 256)]
    width: u32,

    #[arg(long, default_value_t = 256)]
    height: u32,

    /// Render strategy (warp or windowed)
    #[arg(long, env = "RASTER_RENDER_STRATEGY")]
    strategy: Option<String>,

    /// Output PNG path
    #[arg(short, long, default_value = "tile.png")]
    output: PathBuf,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = FmtSubscriber::builder().with_env_filter(filter);

    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args)?;

    let mut config = RegistryConfig::from_env();
    if let Some(strategy) = &args.strategy {
        config.render_strategy = match RenderStrategy::parse(strategy) {
            Some(strategy) => strategy,
            None => bail!("unknown render strategy '{}', expected warp or windowed", strategy),
        };
    }

    let input = args.input.to_str().context("input path is not valid UTF-8")?;
    let mut options = match &args.style {
        Some(style) => LoadOptions::new()
            .with_style_file(style)
            .with_context(|| format!("loading style {}", style.display()))?,
        None => LoadOptions::new(),
    };
    if let Some(crs) = &args.source_crs {
        options = options.with_source_crs(CrsCode::parse(crs)?);
    }

    let start = Instant::now();
    let registry = DatasetRegistry::new(Arc::new(MemoryBackend::new()), config)?;
    let source = registry
        .load(input, options)
        .with_context(|| format!("loading {}", args.input.display()))?;
    info!(name = %source.name(), elapsed_ms = start.elapsed().as_millis() as u64, "Raster loaded");

    let render_start = Instant::now();
    let image = match &args.bbox {
        Some(bbox) => {
            let bbox = BoundingBox::parse(bbox)?;
            let zoomed = source.zoom(&bbox, &args.crs)?;
            let image = zoomed.render(args.width, args.height);
            zoomed.release()?;
            image?
        }
        None => source.render(args.width, args.height)?,
    };
    info!(
        width = image.width(),
        height = image.height(),
        strategy = %registry.config().render_strategy,
        elapsed_ms = render_start.elapsed().as_millis() as u64,
        "Tile rendered"
    );

    let png = image.to_png()?;
    std::fs::write(&args.output, &png).with_context(|| format!("writing {}", args.output.display()))?;
    info!(output = %args.output.display(), bytes = png.len(), "Tile written");

    drop(source);
    registry.release(input)?;
    Ok(())
}
