//! Grid layout and traversal orders over a destination rectangle.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::Rect;

/// Destinations narrower than this use half the configured block width.
pub const NARROW_DESTINATION_WIDTH: u32 = 500;

/// Smallest usable block width.
pub const MIN_BLOCK_WIDTH: u32 = 2;

/// Order in which tiles are emitted. Never affects which thumbnail a block
/// gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalOrder {
    /// Column by column: outer loop over x, inner over y.
    #[default]
    RowMajor,
    /// Row by row: outer loop over y, inner over x.
    ColumnMajor,
    /// Every cell once, in a uniformly random order.
    Shuffled,
}

/// Block height for a block width, keeping a fixed 3:2 aspect.
pub const fn block_height(block_width: u32) -> u32 {
    block_width * 2 / 3
}

/// Block width to use for a destination of the given width.
///
/// Narrow destinations halve the configured width so they still get a
/// reasonable number of blocks.
pub fn effective_block_width(configured: u32, dest_width: u32) -> u32 {
    let width = if dest_width < NARROW_DESTINATION_WIDTH {
        configured / 2
    } else {
        configured
    };
    width.max(MIN_BLOCK_WIDTH)
}

/// The block layout over a destination rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    /// Number of blocks across.
    pub columns: u32,
    /// Number of blocks down.
    pub rows: u32,
    /// Block width in destination pixels.
    pub block_width: u32,
    /// Block height in destination pixels.
    pub block_height: u32,
}

impl Grid {
    /// Lay out whole blocks over `dest`; any remainder is left uncovered
    /// unless `include_partial_edge` adds one more row and column.
    pub fn new(dest: &Rect, block_width: u32, include_partial_edge: bool) -> Grid {
        let block_height = block_height(block_width);
        let count = |extent: u32, size: u32| match size {
            0 => 0,
            _ => extent / size + u32::from(include_partial_edge && extent > 0),
        };

        Grid {
            columns: count(dest.width, block_width),
            rows: count(dest.height, block_height),
            block_width,
            block_height,
        }
    }

    /// Number of cells.
    pub const fn len(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Whether the grid has no cells.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grid coordinates of every cell, in the given order.
    pub fn cells<R: Rng + ?Sized>(&self, order: TraversalOrder, rng: &mut R) -> Vec<(u32, u32)> {
        let xs = 0..self.columns;
        let ys = 0..self.rows;

        match order {
            TraversalOrder::RowMajor => itertools::iproduct!(xs, ys).collect(),
            TraversalOrder::ColumnMajor => {
                itertools::iproduct!(ys, xs).map(|(y, x)| (x, y)).collect()
            }
            TraversalOrder::Shuffled => {
                let mut cells: Vec<_> = itertools::iproduct!(xs, ys).collect();
                cells.shuffle(rng);
                cells
            }
        }
    }

    /// Where cell `(x, y)` is drawn, relative to the destination's origin.
    pub fn block_rect(&self, dest: &Rect, x: u32, y: u32) -> Rect {
        Rect::new(
            dest.x + x * self.block_width,
            dest.y + y * self.block_height,
            self.block_width,
            self.block_height,
        )
    }

    /// Midpoint of cell `(x, y)` in the destination's own coordinates.
    pub fn midpoint(&self, x: u32, y: u32) -> (f64, f64) {
        (
            (x * self.block_width) as f64 + (self.block_width / 2) as f64,
            (y * self.block_height) as f64 + (self.block_height / 2) as f64,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use itertools::Itertools;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grid(width: u32, height: u32, block_width: u32) -> Grid {
        Grid::new(&Rect::new(0, 0, width, height), block_width, false)
    }

    #[test]
    fn test_block_height_is_two_thirds_of_width() {
        assert_eq!(block_height(20), 13);
        assert_eq!(block_height(3), 2);
        assert_eq!(block_height(2), 1);
    }

    #[test]
    fn test_counts_whole_blocks_only() {
        assert_eq!(grid(500, 100, 20).columns, 25);
        assert_eq!(grid(499, 100, 20).columns, 24);
        assert_eq!(grid(500, 130, 20).rows, 10);
        assert_eq!(grid(500, 129, 20).rows, 9);
    }

    #[test]
    fn test_partial_edge_adds_a_row_and_column() {
        let g = Grid::new(&Rect::new(0, 0, 500, 130), 20, true);
        assert_eq!((g.columns, g.rows), (26, 11));
    }

    #[test]
    fn test_empty_destination_has_no_cells() {
        assert!(grid(0, 100, 20).is_empty());
        assert!(Grid::new(&Rect::new(0, 0, 0, 0), 20, true).is_empty());
    }

    #[test]
    fn test_row_major_goes_down_each_column_first() {
        let mut rng = StdRng::seed_from_u64(1);
        let cells = grid(40, 26, 20).cells(TraversalOrder::RowMajor, &mut rng);
        assert_eq!(cells, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_column_major_goes_along_each_row_first() {
        let mut rng = StdRng::seed_from_u64(1);
        let cells = grid(40, 26, 20).cells(TraversalOrder::ColumnMajor, &mut rng);
        assert_eq!(cells, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_shuffled_visits_every_cell_once() {
        let mut rng = StdRng::seed_from_u64(42);
        let g = grid(200, 130, 20);

        let cells = g.cells(TraversalOrder::Shuffled, &mut rng);

        assert_eq!(cells.len(), g.len());
        let sorted: Vec<_> = cells.iter().copied().sorted().collect();
        let expected: Vec<_> = g.cells(TraversalOrder::RowMajor, &mut rng);
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_block_rect_is_offset_by_destination_origin() {
        let dest = Rect::new(10, 5, 100, 100);
        let g = Grid::new(&dest, 20, false);
        assert_eq!(g.block_rect(&dest, 2, 3), Rect::new(50, 44, 20, 13));
    }

    #[test]
    fn test_narrow_destinations_halve_block_width() {
        assert_eq!(effective_block_width(20, 499), 10);
        assert_eq!(effective_block_width(20, 500), 20);
        assert_eq!(effective_block_width(3, 100), MIN_BLOCK_WIDTH);
    }
}
