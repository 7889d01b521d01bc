use image::RgbaImage;

use crate::analysis::sample;
use crate::color::Color;
use crate::core::Rect;
use crate::palette::{ColorIndex, ThumbnailEntry};
use crate::tiling::Grid;

/// Reads the target image's color under each block.
///
/// Blocks are laid out in destination coordinates but sampled against the
/// image's native resolution: the block midpoint is scaled by the ratio of
/// image size to destination size. One pixel per block, no averaging.
pub struct BlockSampler<'a> {
    img: &'a RgbaImage,
    horizontal_ratio: f64,
    vertical_ratio: f64,
}

impl<'a> BlockSampler<'a> {
    pub fn new(img: &'a RgbaImage, dest: &Rect) -> BlockSampler<'a> {
        let (width, height) = img.dimensions();
        let ratio = |image: u32, dest: u32| match dest {
            0 => 0.0,
            _ => image as f64 / dest as f64,
        };

        BlockSampler {
            img,
            horizontal_ratio: ratio(width, dest.width),
            vertical_ratio: ratio(height, dest.height),
        }
    }

    /// Image pixel sampled for cell `(x, y)`.
    pub fn sample_point(&self, grid: &Grid, x: u32, y: u32) -> (u32, u32) {
        let (mid_x, mid_y) = grid.midpoint(x, y);
        (
            (mid_x * self.horizontal_ratio) as u32,
            (mid_y * self.vertical_ratio) as u32,
        )
    }

    /// Color under cell `(x, y)`, or `None` when the sample point falls
    /// outside the image.
    pub fn sample(&self, grid: &Grid, x: u32, y: u32) -> Option<Color> {
        let (px, py) = self.sample_point(grid, x, y);
        sample(self.img, px, py)
    }
}

/// Best palette entry for a block color.
pub fn match_block<'a>(palette: &'a ColorIndex, color: &Color) -> Option<&'a ThumbnailEntry> {
    palette.nearest(color)
}

#[cfg(test)]
mod test {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_samples_block_midpoint_at_native_resolution() {
        // Image is twice the destination size in both directions
        let img = RgbaImage::new(200, 100);
        let dest = Rect::new(0, 0, 100, 50);
        let grid = Grid::new(&dest, 20, false);

        let sampler = BlockSampler::new(&img, &dest);

        assert_eq!(sampler.sample_point(&grid, 0, 0), (20, 12));
        assert_eq!(sampler.sample_point(&grid, 2, 1), (100, 38));
    }

    #[test]
    fn test_partial_edge_sample_can_fall_outside() {
        let img = RgbaImage::from_pixel(50, 20, Rgba([1, 2, 3, 255]));
        let dest = Rect::new(0, 0, 50, 20);
        let grid = Grid::new(&dest, 20, true);
        let sampler = BlockSampler::new(&img, &dest);

        assert!(sampler.sample(&grid, 1, 0).is_some());
        // Third column midpoint is x = 50, one past the last pixel
        assert!(sampler.sample(&grid, 2, 0).is_none());
    }

    #[test]
    fn test_empty_destination_samples_origin() {
        let img = RgbaImage::new(10, 10);
        let dest = Rect::new(0, 0, 0, 0);
        let grid = Grid::new(&Rect::new(0, 0, 40, 40), 20, false);
        let sampler = BlockSampler::new(&img, &dest);
        assert_eq!(sampler.sample_point(&grid, 1, 1), (0, 0));
    }
}
