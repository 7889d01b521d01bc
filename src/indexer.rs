//! Turns a directory of source images into a [`ColorIndex`].

use std::fs::read_dir;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::analysis::average_color;
use crate::error::{IndexError, ThumbnailError};
use crate::palette::{ColorIndex, ThumbnailEntry};
use crate::thumbnail::{load_image, ImageRef, ThumbnailCache};

/// File extensions treated as images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "heic", "tif", "tiff", "gif"];

/// Whether the path has an allow-listed image extension.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// List the image files directly inside `dir`.
///
/// Sub-directories and files without an image extension are skipped without
/// being opened. Order follows the directory listing and is not stable.
///
/// # Errors
///
/// Fails if the directory is missing or unreadable.
pub fn find_images(dir: &Path) -> Result<Vec<ImageRef>, IndexError> {
    let path_reader = read_dir(dir).map_err(|source| IndexError::DirectoryUnavailable {
        path: dir.to_path_buf(),
        source,
    })?;
    let paths = path_reader
        .filter_map(Result::ok)
        .map(|f| f.path())
        .filter(|p| p.is_file() && is_image_path(p))
        .map(ImageRef::from);
    Ok(paths.collect())
}

/// Progress after handling the image at `index` of `total`, in `[0, 100)`.
///
/// The first image reports 0 and the last never reaches 100; completion is
/// signalled by the run's result rather than the progress value.
pub fn progress(index: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        index as f32 / total as f32 * 100.0
    }
}

/// The palette built from a directory, plus every image found there.
#[derive(Debug, Clone)]
pub struct IndexedLibrary {
    /// One thumbnail per distinct average color.
    pub palette: ColorIndex,
    /// Every allow-listed file found, indexed or not.
    pub sources: Vec<ImageRef>,
}

impl IndexedLibrary {
    /// Pick a random source image to render as the mosaic's main image.
    pub fn choose_main<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&ImageRef> {
        self.sources.choose(rng)
    }
}

/// Builds palettes, caching a thumbnail for every source image.
#[derive(Debug, Clone)]
pub struct ImageIndexer {
    cache: ThumbnailCache,
}

impl ImageIndexer {
    /// An indexer writing thumbnails into `cache`.
    pub fn new(cache: ThumbnailCache) -> ImageIndexer {
        ImageIndexer { cache }
    }

    /// The thumbnail cache in use.
    pub fn cache(&self) -> &ThumbnailCache {
        &self.cache
    }

    /// Index every image in `dir`, calling `on_progress` once per image.
    ///
    /// # Errors
    ///
    /// See [`ImageIndexer::index_until`].
    pub fn index<F>(&self, dir: &Path, on_progress: F) -> Result<IndexedLibrary, IndexError>
    where
        F: FnMut(f32),
    {
        self.index_until(dir, on_progress, || true)
    }

    /// Index every image in `dir`, stopping early once `keep_going` returns
    /// false.
    ///
    /// Sources are analysed in parallel batches, one per worker thread, then
    /// applied in listing order. Images whose thumbnail can't be built or
    /// decoded are skipped. Progress is still reported for them, once per
    /// image and in order. `keep_going` is checked before each image is
    /// applied.
    ///
    /// # Errors
    ///
    /// Fails if the directory is unavailable, holds no images, none of its
    /// images can be indexed, or the run was stopped.
    pub fn index_until<F, K>(
        &self,
        dir: &Path,
        mut on_progress: F,
        mut keep_going: K,
    ) -> Result<IndexedLibrary, IndexError>
    where
        F: FnMut(f32),
        K: FnMut() -> bool,
    {
        let sources = find_images(dir).inspect_err(|e| warn!(%e, "cannot index"))?;
        if sources.is_empty() {
            warn!(dir = %dir.display(), "no images to index");
            return Err(IndexError::NoImagesFound(dir.to_path_buf()));
        }

        let total = sources.len();
        let batch_size = rayon::current_num_threads().max(1);
        let mut palette = ColorIndex::new();
        for (batch_index, batch) in sources.chunks(batch_size).enumerate() {
            if !keep_going() {
                return Err(stopped(dir, batch_index * batch_size));
            }

            // Thumbnails for different sources never share a path
            let analysed: Vec<_> = batch
                .par_iter()
                .map(|source| self.analyse_source(source))
                .collect();

            for (offset, (source, result)) in batch.iter().zip(analysed).enumerate() {
                let index = batch_index * batch_size + offset;
                if offset > 0 && !keep_going() {
                    return Err(stopped(dir, index));
                }

                match result {
                    Ok(Some(entry)) => {
                        if let Some(previous) = palette.insert(entry) {
                            let replaced = previous.source().path().display();
                            debug!(%replaced, "duplicate average color");
                        }
                    }
                    Ok(None) => {
                        debug!(source = %source.path().display(), "empty thumbnail skipped")
                    }
                    Err(e) => debug!(%e, "image skipped"),
                }

                on_progress(progress(index, total));
            }
        }

        if palette.is_empty() {
            return Err(IndexError::NoUsableImages {
                path: dir.to_path_buf(),
                attempted: total,
            });
        }

        info!(
            dir = %dir.display(),
            images = total,
            colors = palette.len(),
            "indexing complete"
        );
        Ok(IndexedLibrary { palette, sources })
    }

    /// Thumbnail the source and average the thumbnail's pixels.
    fn analyse_source(&self, source: &ImageRef) -> Result<Option<ThumbnailEntry>, ThumbnailError> {
        let thumbnail = self.cache.get_or_create(source)?;
        let img = load_image(&thumbnail)?;
        Ok(average_color(&img).map(|color| ThumbnailEntry::new(source.clone(), thumbnail, color)))
    }
}

fn stopped(dir: &Path, index: usize) -> IndexError {
    debug!(dir = %dir.display(), index, "indexing stopped");
    IndexError::Superseded
}
