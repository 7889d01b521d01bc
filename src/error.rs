//! Error types for each stage of the pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to produce a thumbnail for a single source image.
///
/// These never abort an indexing run; the image is skipped.
#[derive(Debug, Error)]
pub enum ThumbnailError {
    /// The cache root does not exist.
    #[error("Thumbnail cache directory missing: {}", .0.display())]
    MissingCacheDir(PathBuf),

    /// The source path ends without a file name.
    #[error("Source path has no file name: {}", .0.display())]
    NoFileName(PathBuf),

    /// The image couldn't be read or decoded.
    #[error("Failed to decode '{}': {source}", .path.display())]
    Decode {
        /// The file or directory involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: image::ImageError,
    },

    /// The thumbnail couldn't be encoded.
    #[error("Failed to encode thumbnail for '{}': {source}", .path.display())]
    Encode {
        /// The file or directory involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: image::ImageError,
    },

    /// The thumbnail couldn't be written into the cache.
    #[error("Failed to write thumbnail '{}': {source}", .path.display())]
    Write {
        /// The file or directory involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
}

/// Terminal outcome of an indexing run that produced no palette.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The directory is missing or unreadable.
    #[error("Source directory unavailable '{}': {source}", .path.display())]
    DirectoryUnavailable {
        /// The file or directory involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The directory holds no allow-listed files.
    #[error("No images found in '{}'", .0.display())]
    NoImagesFound(PathBuf),

    /// Every allow-listed file failed.
    #[error("None of the {attempted} images in '{}' could be indexed", .path.display())]
    NoUsableImages {
        /// The directory.
        path: PathBuf,
        /// Number of images tried.
        attempted: usize,
    },

    /// A newer request took over before the run finished.
    #[error("Indexing superseded by a newer request")]
    Superseded,
}

/// A structurally invalid composition request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    /// The palette has no entries.
    #[error("Cannot compose a mosaic from an empty palette")]
    EmptyPalette,

    /// Block width below the minimum.
    #[error("Block width must be at least 2, got {0}")]
    InvalidBlockWidth(u32),
}

/// Failure to load [`Settings`](crate::Settings).
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file couldn't be read.
    #[error("Failed to read settings '{}': {source}", .path.display())]
    Read {
        /// The file or directory involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The settings file isn't valid TOML for [`Settings`](crate::Settings).
    #[error("Invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_messages_name_the_path() {
        let err = IndexError::NoImagesFound(PathBuf::from("/photos"));
        assert_eq!(err.to_string(), "No images found in '/photos'");

        let err = ThumbnailError::MissingCacheDir(PathBuf::from("/cache"));
        assert!(err.to_string().contains("/cache"));
    }

    #[test]
    fn test_empty_palette_is_descriptive() {
        assert!(ComposeError::EmptyPalette.to_string().contains("empty palette"));
    }
}
