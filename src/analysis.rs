//! Color measurements of decoded images.

use image::{GenericImageView, Pixel, RgbaImage};

use crate::color::Color;

/// Mean color over every pixel of the image, or `None` for an empty image.
///
/// The mean is rounded to 8 bits per channel, so images whose averages only
/// differ below that precision share a palette color.
pub fn average_color<I>(img: &I) -> Option<Color>
where
    I: GenericImageView,
    I::Pixel: Pixel<Subpixel = u8>,
{
    let (width, height) = img.dimensions();
    let count = width as u64 * height as u64;
    if count == 0 {
        return None;
    }

    let sums = img.pixels().fold([0u64; 3], |mut acc, (_, _, p)| {
        let rgb = p.to_rgb();
        for (total, value) in acc.iter_mut().zip(rgb.channels()) {
            *total += *value as u64;
        }
        acc
    });

    let mean = |total: u64| ((total + count / 2) / count) as u8;
    Some(Color::from_rgb8(mean(sums[0]), mean(sums[1]), mean(sums[2])))
}

/// Color of a single pixel, or `None` if the point is outside the image.
pub fn sample(img: &RgbaImage, x: u32, y: u32) -> Option<Color> {
    let (width, height) = img.dimensions();
    if x < width && y < height {
        Some(Color::from_pixel(img.get_pixel(x, y)))
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use image::{imageops, Rgba};

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RgbaImage {
        let [r, g, b] = rgb;
        RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]))
    }

    #[test]
    fn test_average_of_solid_image_is_its_color() {
        let img = solid(10, 7, [200, 100, 50]);
        assert_eq!(average_color(&img), Some(Color::from_rgb8(200, 100, 50)));
    }

    #[test]
    fn test_average_of_half_black_half_white_is_grey() {
        let mut img = solid(10, 10, [0, 0, 0]);
        imageops::overlay(&mut img, &solid(5, 10, [255, 255, 255]), 5, 0);
        assert_eq!(average_color(&img), Some(Color::from_rgb8(128, 128, 128)));
    }

    #[test]
    fn test_average_ignores_alpha() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 0]));
        assert_eq!(average_color(&img), Some(Color::from_rgb8(10, 20, 30)));
    }

    #[test]
    fn test_average_of_empty_image_is_none() {
        assert_eq!(average_color(&RgbaImage::new(0, 0)), None);
    }

    #[test]
    fn test_sample_outside_image_is_none() {
        let img = solid(3, 3, [1, 2, 3]);
        assert_eq!(sample(&img, 2, 2), Some(Color::from_rgb8(1, 2, 3)));
        assert_eq!(sample(&img, 3, 0), None);
        assert_eq!(sample(&img, 0, 3), None);
    }
}
