//! On-disk cache of downsized source images.
//!
//! A thumbnail lives at `<root>/<source file name>` and its presence alone is
//! the cache hit signal: existing entries are never re-encoded or replaced.

use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{io::Reader as ImageReader, ColorType, DynamicImage, GenericImageView};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ThumbnailError;

/// Bound on the longer edge of a thumbnail, in pixels.
pub const MAX_THUMBNAIL_SIZE: u32 = 250;

/// JPEG quality used for thumbnails (0-100).
pub const THUMBNAIL_QUALITY: u8 = 50;

/// A handle to a source image on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageRef(PathBuf);

impl ImageRef {
    /// Refer to the image at `path`.
    pub fn new(path: impl Into<PathBuf>) -> ImageRef {
        ImageRef(path.into())
    }

    /// Location of the image.
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for ImageRef {
    fn from(path: PathBuf) -> Self {
        ImageRef(path)
    }
}

impl AsRef<Path> for ImageRef {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Creates and finds thumbnails under a cache root owned by the caller.
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    root: PathBuf,
    max_size: u32,
    quality: u8,
}

impl ThumbnailCache {
    /// A cache under `root` with the default size bound and quality.
    pub fn new(root: impl Into<PathBuf>) -> ThumbnailCache {
        ThumbnailCache {
            root: root.into(),
            max_size: MAX_THUMBNAIL_SIZE,
            quality: THUMBNAIL_QUALITY,
        }
    }

    /// Bound the longer edge to `max_size` pixels instead.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    /// Encode at `quality` (1-100) instead.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// The cache directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the thumbnail for the given source lives, whether or not it
    /// exists yet.
    pub fn thumbnail_path(&self, source: &ImageRef) -> Result<PathBuf, ThumbnailError> {
        source
            .path()
            .file_name()
            .map(|name| self.root.join(name))
            .ok_or_else(|| ThumbnailError::NoFileName(source.path().to_path_buf()))
    }

    /// Return the cached thumbnail for the source, creating it if absent.
    ///
    /// # Errors
    ///
    /// Fails if the cache root is missing, or if the source can't be decoded
    /// or the thumbnail can't be encoded or written.
    pub fn get_or_create(&self, source: &ImageRef) -> Result<PathBuf, ThumbnailError> {
        let destination = self.thumbnail_path(source)?;
        if destination.exists() {
            return Ok(destination);
        }
        if !self.root.is_dir() {
            return Err(ThumbnailError::MissingCacheDir(self.root.clone()));
        }

        let thumbnail = build_thumbnail(source.path(), self.max_size)?;
        self.write(&thumbnail, &destination)?;
        debug!(
            source = %source.path().display(),
            thumbnail = %destination.display(),
            "created thumbnail"
        );

        Ok(destination)
    }

    /// Encode and move into place without replacing an existing entry.
    fn write(&self, thumbnail: &DynamicImage, destination: &Path) -> Result<(), ThumbnailError> {
        let write_err = |source: std::io::Error| ThumbnailError::Write {
            path: destination.to_path_buf(),
            source,
        };

        let temp = NamedTempFile::new_in(&self.root).map_err(write_err)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            encode_jpeg(thumbnail, &mut writer, self.quality).map_err(|source| {
                ThumbnailError::Encode {
                    path: destination.to_path_buf(),
                    source,
                }
            })?;
            writer.flush().map_err(write_err)?;
        }

        match temp.persist_noclobber(destination) {
            Ok(_) => Ok(()),
            // Another pass created it first: that copy is just as good
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(write_err(e.error)),
        }
    }
}

/// Decode an image whose extension may not match its content.
pub fn load_image(path: &Path) -> Result<DynamicImage, ThumbnailError> {
    let decode_err = |source: image::ImageError| ThumbnailError::Decode {
        path: path.to_path_buf(),
        source,
    };
    ImageReader::open(path)
        .map_err(|e| decode_err(e.into()))?
        .with_guessed_format()
        .map_err(|e| decode_err(e.into()))?
        .decode()
        .map_err(decode_err)
}

/// Load the source and shrink it so its longer edge fits `max_size`.
fn build_thumbnail(path: &Path, max_size: u32) -> Result<DynamicImage, ThumbnailError> {
    let img = load_image(path)?;
    let (width, height) = img.dimensions();
    if width.max(height) <= max_size {
        Ok(img)
    } else {
        Ok(img.thumbnail(max_size, max_size))
    }
}

fn encode_jpeg<W: Write>(
    img: &DynamicImage,
    writer: &mut W,
    quality: u8,
) -> image::ImageResult<()> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    JpegEncoder::new_with_quality(writer, quality).encode(
        rgb.as_raw(),
        width,
        height,
        ColorType::Rgb8,
    )
}

/// Make sure the cache root exists.
///
/// # Errors
///
/// Fails if the directory can't be created.
pub fn ensure_cache_dir(root: &Path) -> std::io::Result<()> {
    fs::create_dir_all(root)
}
