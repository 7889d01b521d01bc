//! The palette of thumbnails available to a mosaic.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::color::Color;
use crate::thumbnail::ImageRef;

/// A source image, its cached thumbnail and the thumbnail's average color.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailEntry {
    source: ImageRef,
    thumbnail: PathBuf,
    color: Color,
}

impl ThumbnailEntry {
    /// Bundle a source with its thumbnail and that thumbnail's color.
    pub fn new(source: ImageRef, thumbnail: PathBuf, color: Color) -> ThumbnailEntry {
        ThumbnailEntry {
            source,
            thumbnail,
            color,
        }
    }

    /// The original image.
    pub fn source(&self) -> &ImageRef {
        &self.source
    }

    /// The cached thumbnail file.
    pub fn thumbnail(&self) -> &Path {
        &self.thumbnail
    }

    /// Average color of the thumbnail.
    pub fn color(&self) -> Color {
        self.color
    }
}

/// Map from average color to thumbnail.
///
/// Entries keep insertion order, which is also the order [`nearest`] scans
/// them in. When two thumbnails share an average color the later insert
/// wins: it replaces the earlier entry, keeping that entry's position. One
/// representative per distinct color is all matching needs.
///
/// [`nearest`]: ColorIndex::nearest
#[derive(Debug, Clone, Default)]
pub struct ColorIndex {
    entries: Vec<ThumbnailEntry>,
    slots: HashMap<Color, usize>,
}

impl ColorIndex {
    /// An empty index.
    pub fn new() -> ColorIndex {
        Self::default()
    }

    /// Insert an entry, returning the one it replaced if the color was
    /// already present.
    pub fn insert(&mut self, entry: ThumbnailEntry) -> Option<ThumbnailEntry> {
        match self.slots.get(&entry.color).copied() {
            Some(slot) => Some(std::mem::replace(&mut self.entries[slot], entry)),
            None => {
                self.slots.insert(entry.color, self.entries.len());
                self.entries.push(entry);
                None
            }
        }
    }

    /// Entry with exactly this color.
    pub fn get(&self, color: &Color) -> Option<&ThumbnailEntry> {
        self.slots.get(color).and_then(|&slot| self.entries.get(slot))
    }

    /// Number of distinct colors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &ThumbnailEntry> {
        self.entries.iter()
    }

    /// Colors in scan order.
    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.entries.iter().map(ThumbnailEntry::color)
    }

    /// Palette color closest to the target.
    ///
    /// Linear scan in insertion order; on a tie the first candidate seen is
    /// kept.
    pub fn nearest_color(&self, target: &Color) -> Option<Color> {
        let mut colors = self.colors();
        let first = colors.next()?;
        let (best, _) = colors.fold((first, first.distance(target)), |(best, best_dist), c| {
            let dist = c.distance(target);
            if dist < best_dist {
                (c, dist)
            } else {
                (best, best_dist)
            }
        });
        Some(best)
    }

    /// Entry whose color is closest to the target.
    pub fn nearest(&self, target: &Color) -> Option<&ThumbnailEntry> {
        self.nearest_color(target).and_then(|c| self.get(&c))
    }
}

impl FromIterator<ThumbnailEntry> for ColorIndex {
    fn from_iter<I: IntoIterator<Item = ThumbnailEntry>>(iter: I) -> Self {
        let mut index = ColorIndex::new();
        for entry in iter {
            index.insert(entry);
        }
        index
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(name: &str, color: Color) -> ThumbnailEntry {
        ThumbnailEntry::new(
            ImageRef::new(format!("/photos/{name}")),
            PathBuf::from(format!("/cache/{name}")),
            color,
        )
    }

    fn primaries() -> ColorIndex {
        [
            entry("red.png", Color::new(1.0, 0.0, 0.0)),
            entry("green.png", Color::new(0.0, 1.0, 0.0)),
            entry("blue.png", Color::new(0.0, 0.0, 1.0)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_nearest_picks_closest_color() {
        let index = primaries();

        let best = index.nearest(&Color::new(0.9, 0.1, 0.1)).unwrap();

        assert_eq!(best.thumbnail(), Path::new("/cache/red.png"));
    }

    #[test]
    fn test_nearest_keeps_first_on_tie() {
        let index = primaries();

        // Equidistant from all three primaries
        let best = index.nearest(&Color::new(0.0, 0.0, 0.0)).unwrap();

        assert_eq!(best.thumbnail(), Path::new("/cache/red.png"));
    }

    #[test]
    fn test_nearest_in_empty_index_is_none() {
        assert!(ColorIndex::new().nearest(&Color::BLACK).is_none());
    }

    #[test]
    fn test_duplicate_color_last_write_wins() {
        let grey = Color::new(0.5, 0.5, 0.5);
        let mut index = ColorIndex::new();
        index.insert(entry("first.png", grey));
        index.insert(entry("other.png", Color::BLACK));

        let replaced = index.insert(entry("second.png", grey));

        assert_eq!(index.len(), 2);
        assert_eq!(replaced.unwrap().thumbnail(), Path::new("/cache/first.png"));
        assert_eq!(
            index.get(&grey).unwrap().thumbnail(),
            Path::new("/cache/second.png")
        );
        // The replacement keeps the earlier scan position
        assert_eq!(index.colors().collect::<Vec<_>>(), vec![grey, Color::BLACK]);
    }
}
