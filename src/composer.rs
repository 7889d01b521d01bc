//! Resolves a target image into a sequence of thumbnail tiles.

use std::path::PathBuf;

use image::RgbaImage;
use rand::thread_rng;
use rand::Rng;
use tracing::debug;

use crate::color::Color;
use crate::core::Rect;
use crate::error::ComposeError;
use crate::matching::{match_block, BlockSampler};
use crate::palette::ColorIndex;
use crate::tiling::{block_height, Grid, TraversalOrder, MIN_BLOCK_WIDTH};

/// Tiling parameters for one composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicSpec {
    block_width: u32,
    dest: Rect,
    order: TraversalOrder,
    include_partial_edge: bool,
}

impl MosaicSpec {
    /// Blocks `block_width` pixels wide over `dest`, emitted in `order`.
    ///
    /// # Errors
    ///
    /// Fails if `block_width` is less than 2.
    pub fn new(
        block_width: u32,
        dest: Rect,
        order: TraversalOrder,
    ) -> Result<Self, ComposeError> {
        if block_width < MIN_BLOCK_WIDTH {
            return Err(ComposeError::InvalidBlockWidth(block_width));
        }
        Ok(MosaicSpec {
            block_width,
            dest,
            order,
            include_partial_edge: false,
        })
    }

    /// Also lay blocks over the uncovered remainder at the right and bottom
    /// edges. Their samples may fall outside the image, dropping those tiles.
    pub fn with_partial_edge(mut self, include: bool) -> Self {
        self.include_partial_edge = include;
        self
    }

    /// Block width in destination pixels.
    pub fn block_width(&self) -> u32 {
        self.block_width
    }

    /// Block height, two thirds of the width.
    pub fn block_height(&self) -> u32 {
        block_height(self.block_width)
    }

    /// Where the target is drawn.
    pub fn dest(&self) -> Rect {
        self.dest
    }

    /// Order tiles are emitted in.
    pub fn order(&self) -> TraversalOrder {
        self.order
    }

    /// The block layout over the destination.
    pub fn grid(&self) -> Grid {
        Grid::new(&self.dest, self.block_width, self.include_partial_edge)
    }
}

/// One block of the mosaic and the thumbnail chosen for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// Grid column.
    pub column: u32,
    /// Grid row.
    pub row: u32,
    /// Destination pixel rect to draw the thumbnail into.
    pub rect: Rect,
    /// Cached thumbnail chosen for the block.
    pub thumbnail: PathBuf,
    /// Palette color the block was matched to.
    pub color: Color,
}

/// Matches target image blocks against a palette.
pub struct MosaicComposer<'a> {
    palette: &'a ColorIndex,
}

impl<'a> MosaicComposer<'a> {
    /// A composer drawing from `palette`.
    ///
    /// # Errors
    ///
    /// Fails if the palette is empty.
    pub fn new(palette: &'a ColorIndex) -> Result<Self, ComposeError> {
        if palette.is_empty() {
            return Err(ComposeError::EmptyPalette);
        }
        Ok(MosaicComposer { palette })
    }

    /// Tiles for every resolvable block, in the order the `MosaicSpec` asks for.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        target: &RgbaImage,
        spec: &MosaicSpec,
        rng: &mut R,
    ) -> Vec<Tile> {
        let grid = spec.grid();
        let sampler = BlockSampler::new(target, &spec.dest);

        let tiles: Vec<Tile> = grid
            .cells(spec.order, rng)
            .into_iter()
            .filter_map(|(x, y)| self.resolve(&sampler, &grid, &spec.dest, x, y))
            .collect();

        debug!(
            blocks = grid.len(),
            tiles = tiles.len(),
            palette = self.palette.len(),
            "composed mosaic"
        );
        tiles
    }

    /// The tile for cell `(x, y)`, or `None` if it can't be resolved.
    fn resolve(
        &self,
        sampler: &BlockSampler<'_>,
        grid: &Grid,
        dest: &Rect,
        x: u32,
        y: u32,
    ) -> Option<Tile> {
        let block_color = sampler.sample(grid, x, y)?;
        let entry = match_block(self.palette, &block_color)?;
        Some(Tile {
            column: x,
            row: y,
            rect: grid.block_rect(dest, x, y),
            thumbnail: entry.thumbnail().to_path_buf(),
            color: entry.color(),
        })
    }
}

/// Compose with a thread-local random source for shuffled ordering.
///
/// # Errors
///
/// Fails if the palette is empty.
pub fn compose(
    target: &RgbaImage,
    palette: &ColorIndex,
    spec: &MosaicSpec,
) -> Result<Vec<Tile>, ComposeError> {
    let composer = MosaicComposer::new(palette)?;
    Ok(composer.compose(target, spec, &mut thread_rng()))
}
