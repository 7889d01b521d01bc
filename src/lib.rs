//! Photo mosaic builder.
//!
//! Indexes a directory of images into a palette of thumbnails keyed by
//! average color, then resolves a target image into a grid of tiles, each
//! assigned the thumbnail whose color best matches the block beneath it.

#![warn(missing_docs)]

pub mod analysis;
pub mod color;
pub mod composer;
pub mod core;
pub mod error;
pub mod indexer;
mod matching;
pub mod palette;
pub mod render;
pub mod settings;
pub mod thumbnail;
pub mod tiling;
pub mod worker;

use std::path::Path;

use image::ImageFormat::Jpeg;
use image::{ImageResult, RgbaImage};

pub use crate::color::{distance, Color};
pub use crate::composer::{compose, MosaicComposer, MosaicSpec, Tile};
pub use crate::core::{Dimensions, Rect};
pub use crate::error::{ComposeError, IndexError, SettingsError, ThumbnailError};
pub use crate::indexer::{ImageIndexer, IndexedLibrary};
pub use crate::palette::{ColorIndex, ThumbnailEntry};
pub use crate::settings::Settings;
pub use crate::thumbnail::{ImageRef, ThumbnailCache};
pub use crate::tiling::TraversalOrder;
pub use crate::worker::{ComposeEvent, Envelope, IndexEvent, Pipeline};

/// Save the given image as a JPEG
pub fn save(image: &RgbaImage, p: &Path) -> ImageResult<()> {
    image::DynamicImage::ImageRgba8(image.clone())
        .to_rgb8()
        .save_with_format(p, Jpeg)
}
