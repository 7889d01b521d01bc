use std::path::PathBuf;
use std::sync::mpsc::channel;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::thread_rng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mosaic::render::{render, ThumbnailImages};
use mosaic::thumbnail::{ensure_cache_dir, load_image};
use mosaic::{
    save, ColorIndex, ComposeEvent, ImageIndexer, IndexEvent, IndexedLibrary, MosaicSpec,
    Pipeline, Rect, Settings, ThumbnailCache, Tile,
};

/// Create a mosaic
///
/// # Usage
///
/// mosaic --photos <dir> --output mosaic.jpg
#[derive(Debug, Parser)]
#[command(version, about = "Build a photo mosaic out of a folder of images")]
struct Cli {
    /// Settings file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of source images
    #[arg(long)]
    photos: Option<PathBuf>,

    /// Image to render as a mosaic; a random source image if not given
    #[arg(long)]
    target: Option<PathBuf>,

    /// Thumbnail cache directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Block width in pixels
    #[arg(long)]
    block_size: Option<u32>,

    /// Build style: "Scan Vertical", "Scan Horizontal" or anything else to shuffle
    #[arg(long)]
    style: Option<String>,

    /// Canvas width; defaults to the target's width
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Canvas height; defaults to the target's height
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Also cover the partial blocks at the right and bottom edges
    #[arg(long)]
    partial_edge: bool,

    /// Where to write the JPEG
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mosaic=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = settings(&cli)?;

    let photos = settings
        .photos_location
        .clone()
        .context("No photos directory given")?;
    let cache_root = cli
        .cache_dir
        .clone()
        .or_else(default_cache_dir)
        .context("Could not determine a thumbnail cache directory")?;
    ensure_cache_dir(&cache_root)
        .with_context(|| format!("Failed to create cache directory {}", cache_root.display()))?;

    let pipeline = Pipeline::new(ImageIndexer::new(ThumbnailCache::new(&cache_root)));
    let library = index(&pipeline, photos)?;

    let target_path = match &cli.target {
        Some(path) => path.clone(),
        None => library
            .choose_main(&mut thread_rng())
            .context("No source images to pick a target from")?
            .path()
            .to_path_buf(),
    };
    let target = load_image(&target_path)?.into_rgba8();

    let canvas = match (cli.width, cli.height) {
        (Some(w), Some(h)) => (w, h),
        _ => target.dimensions(),
    };
    let dest = Rect::aspect_fit(canvas, target.dimensions());
    let spec = MosaicSpec::new(
        settings.block_width_for(dest.width),
        dest,
        settings.traversal_order(),
    )?
    .with_partial_edge(cli.partial_edge);

    let tiles = compose(&pipeline, target, library.palette, spec)?;

    let mut images = ThumbnailImages::default();
    let output = render(&tiles, canvas, settings.background(), &mut images);
    save(&output, &cli.output)
        .with_context(|| format!("Failed to save {}", cli.output.display()))?;

    info!(
        target = %target_path.display(),
        tiles = tiles.len(),
        output = %cli.output.display(),
        "mosaic written"
    );
    Ok(())
}

/// Settings from the config file, overridden by command line flags.
fn settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(photos) = &cli.photos {
        settings.photos_location = Some(photos.clone());
    }
    if let Some(block_size) = cli.block_size {
        settings.block_size = block_size;
    }
    if let Some(style) = &cli.style {
        settings.build_style = style.clone();
    }
    Ok(settings)
}

fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("mosaic").join("thumbnails"))
}

/// Index in the background, drawing progress until the run finishes.
fn index(pipeline: &Pipeline, photos: PathBuf) -> Result<IndexedLibrary> {
    let (tx, rx) = channel();
    let (_, handle) = pipeline.start_indexing(photos.clone(), tx);

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("Indexing [{bar:40.cyan/blue}] {pos}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut result: Option<Result<IndexedLibrary>> = None;
    for envelope in rx {
        if !pipeline.is_current_index(envelope.generation) {
            continue;
        }
        match envelope.event {
            IndexEvent::Progress(p) => bar.set_position(p as u64),
            IndexEvent::Ready(library) => result = Some(Ok(library)),
            IndexEvent::Empty(Some(e)) => result = Some(Err(e.into())),
            IndexEvent::Empty(None) => {
                result = Some(Err(anyhow::anyhow!("No usable images in {}", photos.display())))
            }
        }
    }
    bar.finish_and_clear();

    if handle.join().is_err() {
        bail!("Indexing thread panicked");
    }
    result.unwrap_or_else(|| Err(anyhow::anyhow!("Indexing stopped without a result")))
}

fn compose(
    pipeline: &Pipeline,
    target: image::RgbaImage,
    palette: ColorIndex,
    spec: MosaicSpec,
) -> Result<Vec<Tile>> {
    let (tx, rx) = channel();
    let (generation, _) =
        pipeline.start_composing(Arc::new(target), Arc::new(palette), spec, tx);

    let envelope = rx
        .into_iter()
        .find(|e| e.generation == generation)
        .context("Composition stopped without a result")?;
    match envelope.event {
        ComposeEvent::Tiles(tiles) => Ok(tiles),
        ComposeEvent::Failed(e) => Err(e.into()),
    }
}
