use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, RgbImage};
use ndarray::Array4;

/// Convert a generator output batch (NCHW `f32` in `[-1, 1]`) into RGB images,
/// scaling to uint8 in height-width-channel order.
pub(crate) fn batch_to_rgb_images(batch: &Array4<f32>) -> Result<Vec<DynamicImage>> {
    let (_b, c, h, w) = batch.dim();
    if c != 3 {
        anyhow::bail!("Expected 3 channels in image output");
    }

    let mut images = Vec::new();
    for b_img in batch.outer_iter() {
        let hwc = b_img.permuted_axes([1, 2, 0]);
        let data = hwc
            .iter()
            .map(|x| ((x + 1.0) * 127.5).round().clamp(0.0, 255.0) as u8)
            .collect::<Vec<_>>();
        #[allow(clippy::cast_possible_truncation)]
        images.push(DynamicImage::ImageRgb8(
            RgbImage::from_raw(w as u32, h as u32, data)
                .context("RgbImage has invalid capacity")?,
        ));
    }
    Ok(images)
}

/// Write `image` as a PNG at `result_dir/filename`, creating the directory
/// (and any missing parents) first. An existing file at that path is
/// overwritten.
pub fn save_png(result_dir: &Path, filename: &str, image: &DynamicImage) -> Result<PathBuf> {
    fs::create_dir_all(result_dir)
        .with_context(|| format!("creating result directory `{}`", result_dir.display()))?;
    let path = result_dir.join(filename);
    image
        .save_with_format(&path, ImageFormat::Png)
        .with_context(|| format!("writing image `{}`", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;
    use ndarray::Array;

    fn gradient_batch(h: usize, w: usize) -> Array4<f32> {
        Array::from_shape_fn((1, 3, h, w), |(_, c, y, x)| {
            ((x + y + c) as f32 / (h + w + 3) as f32) * 2.0 - 1.0
        })
    }

    #[test]
    fn conversion_scales_and_reorders_pixels() {
        let mut batch = Array4::<f32>::zeros((1, 3, 2, 2));
        batch[[0, 0, 0, 0]] = -1.0; // R of top-left
        batch[[0, 1, 0, 0]] = 0.0; // G of top-left
        batch[[0, 2, 0, 0]] = 1.0; // B of top-left
        batch[[0, 0, 1, 1]] = 2.0; // out of range, must clamp

        let images = batch_to_rgb_images(&batch).unwrap();
        assert_eq!(images.len(), 1);
        let rgb = images[0].to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [0, 128, 255]);
        assert_eq!(rgb.get_pixel(1, 1).0, [255, 128, 128]);
    }

    #[test]
    fn non_rgb_batches_are_rejected() {
        let batch = Array4::<f32>::zeros((1, 4, 2, 2));
        assert!(batch_to_rgb_images(&batch).is_err());
    }

    #[test]
    fn save_png_creates_the_result_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result_dir = dir.path().join("results");
        let images = batch_to_rgb_images(&gradient_batch(8, 8)).unwrap();

        let path = save_png(&result_dir, "example.png", &images[0]).unwrap();
        assert_eq!(path, result_dir.join("example.png"));
        assert_eq!(fs::read_dir(&result_dir).unwrap().count(), 1);

        let written = image::open(&path).unwrap();
        assert_eq!(written.dimensions(), (8, 8));
    }

    #[test]
    fn save_png_overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = batch_to_rgb_images(&gradient_batch(4, 4)).unwrap();
        let second = batch_to_rgb_images(&gradient_batch(8, 8)).unwrap();

        save_png(dir.path(), "out.png", &first[0]).unwrap();
        save_png(dir.path(), "out.png", &second[0]).unwrap();

        assert_eq!(image::open(dir.path().join("out.png")).unwrap().dimensions(), (8, 8));
    }

    #[test]
    fn output_is_a_png_regardless_of_extension() {
        let dir = tempfile::tempdir().unwrap();
        let images = batch_to_rgb_images(&gradient_batch(4, 4)).unwrap();

        let path = save_png(dir.path(), "picture.raw", &images[0]).unwrap();
        let format = image::ImageReader::open(&path)
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .format();
        assert_eq!(format, Some(ImageFormat::Png));
    }
}
