//! Pixel geometry shared by tiling and rendering.

/// Alias for width and height
pub type Dimensions = (u32, u32);

/// An axis-aligned rectangle in pixel space, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// A rectangle with its top-left corner at `(x, y)`.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle at the origin covering the given dimensions.
    pub const fn from_dimensions((width, height): Dimensions) -> Rect {
        Rect::new(0, 0, width, height)
    }

    /// Width and height.
    pub const fn dimensions(&self) -> Dimensions {
        (self.width, self.height)
    }

    /// Whether the rectangle covers no pixels.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Largest rectangle with the image's aspect ratio that fits inside the
    /// frame, centred along the axis with spare room (letterboxing).
    pub fn aspect_fit(frame: Dimensions, image: Dimensions) -> Rect {
        let (fw, fh) = frame;
        let (iw, ih) = image;
        if iw == 0 || ih == 0 || fw == 0 || fh == 0 {
            return Rect::new(0, 0, 0, 0);
        }

        let frame_aspect = fw as f64 / fh as f64;
        let image_aspect = iw as f64 / ih as f64;

        if frame_aspect > image_aspect {
            // Frame is wider: pillarbox
            let width = ((fh as f64 * image_aspect).round() as u32).min(fw);
            Rect::new((fw - width) / 2, 0, width, fh)
        } else {
            let height = ((fw as f64 / image_aspect).round() as u32).min(fh);
            Rect::new(0, (fh - height) / 2, fw, height)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fit_pillarboxes_portrait_image_in_landscape_frame() {
        assert_eq!(
            Rect::aspect_fit((200, 100), (50, 100)),
            Rect::new(75, 0, 50, 100)
        );
    }

    #[test]
    fn test_fit_letterboxes_landscape_image_in_portrait_frame() {
        assert_eq!(
            Rect::aspect_fit((100, 200), (100, 50)),
            Rect::new(0, 75, 100, 50)
        );
    }

    #[test]
    fn test_fit_scales_up_matching_aspect() {
        assert_eq!(
            Rect::aspect_fit((400, 200), (40, 20)),
            Rect::new(0, 0, 400, 200)
        );
    }

    #[test]
    fn test_fit_of_empty_image_is_empty() {
        assert!(Rect::aspect_fit((400, 200), (0, 20)).is_empty());
    }
}
