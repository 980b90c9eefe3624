//! Conversion between image files and `(row, col, channel)` float arrays.
//!
//! - `load_image`: decode any format the `image` crate reads into RGB floats in `[0, 255]`.
//! - `save_image`: write RGB floats as 8-bit, taking `|v|` and saturating to `[0, 255]`.

use crate::field::Image;
use anyhow::{anyhow, Result};
use image::{Rgb, RgbImage};
use log::info;
use std::fs;
use std::path::Path;

pub fn load_image(path: &Path) -> Result<Image> {
    let rgb = image::open(path)
        .map_err(|e| anyhow!("Failed to open {}: {e}", path.display()))?
        .into_rgb8();
    Ok(rgb_to_array(&rgb))
}

pub fn save_image(data: &Image, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let rgb = array_to_rgb(data)?;
    rgb.save(path)
        .map_err(|e| anyhow!("Failed to save {}: {e}", path.display()))?;
    info!("Saved image: {}", path.display());
    Ok(())
}

pub fn rgb_to_array(rgb: &RgbImage) -> Image {
    let (width, height) = rgb.dimensions();
    Image::from_shape_fn((height as usize, width as usize, 3), |(row, col, channel)| {
        f64::from(rgb.get_pixel(col as u32, row as u32)[channel])
    })
}

pub fn array_to_rgb(data: &Image) -> Result<RgbImage> {
    let (rows, cols, channels) = data.dim();
    if channels != 3 {
        return Err(anyhow!("Expected 3 channels, got {}", channels));
    }
    let width = u32::try_from(cols).map_err(|_| anyhow!("Image too wide: {cols}"))?;
    let height = u32::try_from(rows).map_err(|_| anyhow!("Image too tall: {rows}"))?;

    Ok(RgbImage::from_fn(width, height, |x, y| {
        let (row, col) = (y as usize, x as usize);
        Rgb([
            to_u8_saturating(data[[row, col, 0]]),
            to_u8_saturating(data[[row, col, 1]]),
            to_u8_saturating(data[[row, col, 2]]),
        ])
    }))
}

pub fn to_u8_saturating(value: f64) -> u8 {
    // Ties to even like saturate_cast; `as` saturates and sends NaN to 0
    value.abs().round_ties_even() as u8
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturating_conversion() {
        assert_eq!(to_u8_saturating(12.4), 12);
        assert_eq!(to_u8_saturating(12.6), 13);
        assert_eq!(to_u8_saturating(12.5), 12);
        assert_eq!(to_u8_saturating(13.5), 14);
        assert_eq!(to_u8_saturating(-0.5), 0);
        assert_eq!(to_u8_saturating(-40.2), 40);
        assert_eq!(to_u8_saturating(300.0), 255);
        assert_eq!(to_u8_saturating(f64::NEG_INFINITY), 255);
        assert_eq!(to_u8_saturating(f64::NAN), 0);
    }

    #[test]
    fn array_layout_is_row_col_channel() {
        let mut rgb = RgbImage::new(3, 2);
        rgb.put_pixel(2, 1, Rgb([10, 20, 30]));
        let data = rgb_to_array(&rgb);
        assert_eq!(data.dim(), (2, 3, 3));
        assert_eq!(data[[1, 2, 0]], 10.0);
        assert_eq!(data[[1, 2, 2]], 30.0);

        let back = array_to_rgb(&data).unwrap();
        assert_eq!(back, rgb);
    }

    #[test]
    fn rejects_non_rgb_arrays() {
        let data = Image::zeros((2, 2, 4));
        assert!(array_to_rgb(&data).is_err());
    }
}
