//! Plain configuration values, read from a TOML settings file.
//!
//! The crate only reads settings; storing them is the caller's business.

use std::fs;
use std::path::{Path, PathBuf};

use image::Rgba;
use serde::Deserialize;

use crate::error::SettingsError;
use crate::tiling::{effective_block_width, TraversalOrder};

/// Default block width in pixels.
pub const DEFAULT_BLOCK_SIZE: u32 = 20;

/// Default seconds to hold a finished mosaic before the next cycle.
pub const DEFAULT_HOLD_DURATION: f64 = 5.0;

/// Build style naming [`TraversalOrder::RowMajor`].
pub const SCAN_VERTICAL: &str = "Scan Vertical";

/// Build style naming [`TraversalOrder::ColumnMajor`].
pub const SCAN_HORIZONTAL: &str = "Scan Horizontal";

/// Presentation and tiling settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory of source images.
    pub photos_location: Option<PathBuf>,
    /// Configured block width in pixels.
    pub block_size: u32,
    /// Tile order by name, see [`traversal_order`].
    pub build_style: String,
    /// Fill behind and between tiles, as RGB bytes.
    pub background_color: [u8; 3],
    /// Seconds between revealing consecutive tiles.
    pub reveal_interval: f64,
    /// Seconds to hold a finished mosaic.
    pub hold_duration: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            photos_location: None,
            block_size: DEFAULT_BLOCK_SIZE,
            build_style: SCAN_VERTICAL.to_string(),
            background_color: [0, 0, 0],
            reveal_interval: 0.0,
            hold_duration: DEFAULT_HOLD_DURATION,
        }
    }
}

impl Settings {
    /// Read settings from a TOML file; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file can't be read or isn't valid settings TOML.
    pub fn load(path: &Path) -> Result<Settings, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse settings from TOML text.
    ///
    /// # Errors
    ///
    /// Fails if the text isn't valid settings TOML.
    pub fn parse(text: &str) -> Result<Settings, SettingsError> {
        Ok(toml::from_str(text)?)
    }

    /// Order named by [`Settings::build_style`].
    pub fn traversal_order(&self) -> TraversalOrder {
        traversal_order(&self.build_style)
    }

    /// Opaque background pixel.
    pub fn background(&self) -> Rgba<u8> {
        let [r, g, b] = self.background_color;
        Rgba([r, g, b, 255])
    }

    /// Block width to use for a destination of the given width.
    pub fn block_width_for(&self, dest_width: u32) -> u32 {
        effective_block_width(self.block_size, dest_width)
    }
}

/// Map a build style name to a traversal order; unknown names shuffle.
pub fn traversal_order(build_style: &str) -> TraversalOrder {
    match build_style {
        SCAN_VERTICAL => TraversalOrder::RowMajor,
        SCAN_HORIZONTAL => TraversalOrder::ColumnMajor,
        _ => TraversalOrder::Shuffled,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_build_styles_map_to_orders() {
        assert_eq!(traversal_order("Scan Vertical"), TraversalOrder::RowMajor);
        assert_eq!(traversal_order("Scan Horizontal"), TraversalOrder::ColumnMajor);
        assert_eq!(traversal_order("Random"), TraversalOrder::Shuffled);
        assert_eq!(traversal_order(""), TraversalOrder::Shuffled);
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.block_size, 20);
        assert_eq!(settings.traversal_order(), TraversalOrder::RowMajor);
        assert_eq!(settings.background(), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_parses_all_keys() {
        let settings = Settings::parse(
            r#"
            photos_location = "/home/me/Pictures"
            block_size = 32
            build_style = "Scan Horizontal"
            background_color = [10, 20, 30]
            reveal_interval = 0.01
            hold_duration = 8.5
            "#,
        )
        .unwrap();

        assert_eq!(
            settings.photos_location,
            Some(PathBuf::from("/home/me/Pictures"))
        );
        assert_eq!(settings.block_size, 32);
        assert_eq!(settings.traversal_order(), TraversalOrder::ColumnMajor);
        assert_eq!(settings.background(), Rgba([10, 20, 30, 255]));
        assert_eq!(settings.hold_duration, 8.5);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            Settings::parse("block_size = \"big\""),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mosaic.toml");
        fs::write(&path, "block_size = 40").unwrap();

        assert_eq!(Settings::load(&path).unwrap().block_size, 40);
        assert!(matches!(
            Settings::load(&dir.path().join("missing.toml")),
            Err(SettingsError::Read { .. })
        ));
    }

    #[test]
    fn test_block_width_halves_for_narrow_destinations() {
        let settings = Settings::default();
        assert_eq!(settings.block_width_for(1920), 20);
        assert_eq!(settings.block_width_for(320), 10);
    }
}
