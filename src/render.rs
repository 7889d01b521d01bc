//! Draws a tile sequence onto a still image.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{imageops, Rgba, RgbaImage};
use lru::LruCache;
use tracing::debug;

use crate::composer::Tile;
use crate::core::{Dimensions, Rect};
use crate::thumbnail::load_image;

/// Decoded thumbnails kept by default.
pub const DEFAULT_CAPACITY: usize = 256;

/// Bounded cache of decoded thumbnails, keyed by thumbnail path.
pub struct ThumbnailImages {
    images: LruCache<PathBuf, RgbaImage>,
}

impl Default for ThumbnailImages {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ThumbnailImages {
    /// A cache holding at most `capacity` images (at least one).
    pub fn new(capacity: usize) -> ThumbnailImages {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        ThumbnailImages {
            images: LruCache::new(capacity),
        }
    }

    /// Number of decoded images held.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether no image is held.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Hold an already decoded thumbnail, evicting the least recently used
    /// one when full.
    pub fn insert(&mut self, path: PathBuf, img: RgbaImage) {
        self.images.put(path, img);
    }

    /// The decoded thumbnail, loading it on a miss. `None` if it can't be
    /// decoded.
    pub fn get(&mut self, path: &Path) -> Option<&RgbaImage> {
        if !self.images.contains(path) {
            match load_image(path) {
                Ok(img) => {
                    self.images.put(path.to_path_buf(), img.into_rgba8());
                }
                Err(e) => {
                    debug!(%e, "thumbnail unavailable");
                    return None;
                }
            }
        }
        self.images.get(path)
    }
}

trait Drawable {
    /// Draw this drawable onto the given target image.
    fn draw_onto(&self, target: &mut RgbaImage, images: &mut ThumbnailImages);
}

impl Drawable for Tile {
    fn draw_onto(&self, target: &mut RgbaImage, images: &mut ThumbnailImages) {
        let Rect { x, y, width, height } = self.rect;
        if width == 0 || height == 0 {
            return;
        }
        let Some(thumb) = images.get(&self.thumbnail) else {
            return;
        };
        if thumb.width() == 0 || thumb.height() == 0 {
            return;
        }
        let cropped = aspect_fill(thumb, width, height);
        let fitted = imageops::resize(&cropped, width, height, FilterType::Triangle);
        imageops::overlay(target, &fitted, x as i64, y as i64);
    }
}

/// Centre-crop the image to the aspect ratio of `width` x `height`.
fn aspect_fill(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (iw, ih) = img.dimensions();
    if iw == 0 || ih == 0 {
        return img.clone();
    }
    let target_aspect = width as f64 / height as f64;
    let (cw, ch) = if iw as f64 / ih as f64 > target_aspect {
        (((ih as f64 * target_aspect).round() as u32).clamp(1, iw), ih)
    } else {
        (iw, ((iw as f64 / target_aspect).round() as u32).clamp(1, ih))
    };
    imageops::crop_imm(img, (iw - cw) / 2, (ih - ch) / 2, cw, ch).to_image()
}

/// Render the tiles over a canvas filled with the background color.
///
/// Tiles whose thumbnail can't be loaded leave the background showing.
pub fn render(
    tiles: &[Tile],
    (width, height): Dimensions,
    background: Rgba<u8>,
    images: &mut ThumbnailImages,
) -> RgbaImage {
    let mut output = RgbaImage::from_pixel(width, height, background);
    for t in tiles {
        t.draw_onto(&mut output, images);
    }
    output
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::color::Color;
    use tempfile::TempDir;

    fn thumbnail(dir: &TempDir, name: &str, pixel: Rgba<u8>) -> PathBuf {
        let path = dir.path().join(name);
        RgbaImage::from_pixel(30, 20, pixel).save(&path).unwrap();
        path
    }

    fn tile(rect: Rect, thumbnail: PathBuf) -> Tile {
        Tile {
            column: 0,
            row: 0,
            rect,
            thumbnail,
            color: Color::BLACK,
        }
    }

    #[test]
    fn test_tiles_are_drawn_into_their_rects() {
        let dir = tempfile::tempdir().unwrap();
        let white = Rgba([255, 255, 255, 255]);
        let path = thumbnail(&dir, "white.png", white);
        let tiles = vec![tile(Rect::new(10, 10, 20, 13), path)];
        let mut images = ThumbnailImages::default();

        let img = render(&tiles, (50, 50), Rgba([0, 0, 0, 255]), &mut images);

        assert_eq!(*img.get_pixel(15, 15), white);
        assert_eq!(*img.get_pixel(5, 5), Rgba([0, 0, 0, 255]));
        assert_eq!(*img.get_pixel(30, 15), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_missing_thumbnail_leaves_background() {
        let dir = tempfile::tempdir().unwrap();
        let background = Rgba([9, 8, 7, 255]);
        let tiles = vec![tile(Rect::new(0, 0, 10, 10), dir.path().join("gone.png"))];
        let mut images = ThumbnailImages::default();

        let img = render(&tiles, (10, 10), background, &mut images);

        assert!(img.pixels().all(|p| *p == background));
        assert!(images.is_empty());
    }

    #[test]
    fn test_cache_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let mut images = ThumbnailImages::new(2);
        for name in ["a.png", "b.png", "c.png"] {
            let path = thumbnail(&dir, name, Rgba([1, 1, 1, 255]));
            assert!(images.get(&path).is_some());
        }
        assert_eq!(images.len(), 2);
    }

    #[test]
    fn test_aspect_fill_crops_to_target_shape() {
        let img = RgbaImage::new(30, 20);
        assert_eq!(aspect_fill(&img, 10, 10).dimensions(), (20, 20));
        assert_eq!(aspect_fill(&img, 30, 10).dimensions(), (30, 10));
    }

    #[test]
    fn test_aspect_fill_of_empty_image_is_empty() {
        let img = RgbaImage::new(0, 0);
        assert_eq!(aspect_fill(&img, 10, 10).dimensions(), (0, 0));
    }

    #[test]
    fn test_empty_thumbnail_leaves_background() {
        let dir = tempfile::tempdir().unwrap();
        let background = Rgba([4, 5, 6, 255]);
        let path = dir.path().join("empty.png");
        let tiles = vec![tile(Rect::new(0, 0, 10, 10), path.clone())];
        let mut images = ThumbnailImages::default();
        images.insert(path, RgbaImage::new(0, 0));

        let img = render(&tiles, (10, 10), background, &mut images);

        assert!(img.pixels().all(|p| *p == background));
    }
}
