use burn::tensor::{Tensor, TensorData, backend::Backend};
use image::imageops::FilterType;
use image::{ImageBuffer, RgbImage};
use std::path::Path;

use crate::IMAGE_CHANNELS;

// --- Target Image Loading ---

/// Loads one target image and prepares it for the recovery loop.
///
/// The image is resized to `image_dim` x `image_dim` with a Lanczos
/// filter, converted to RGB and normalized:
/// ```text
/// pixel_normalized = pixel / 255.0
/// ```
///
/// Returns the flattened pixels in row-major `[H, W, C]` order.
pub fn load_image(path: &Path, image_dim: u32) -> Vec<f32> {
    let img = image::open(path)
        .unwrap_or_else(|e| panic!("Failed to open image {}: {e}", path.display()));
    let img = img
        .resize_exact(image_dim, image_dim, FilterType::Lanczos3)
        .to_rgb8();
    img.into_raw().iter().map(|&p| p as f32 / 255.0).collect()
}

/// Stacks a list of target images into a single `[B, H, W, 3]` tensor
/// with pixel values in `[0.0, 1.0]`.
///
/// One latent+label pair is recovered per entry of this batch.
pub fn load_target_batch<B: Backend>(
    paths: &[impl AsRef<Path>],
    image_dim: u32,
    device: &B::Device,
) -> Tensor<B, 4> {
    let batch_size = paths.len();
    let pixels: Vec<f32> = paths
        .iter()
        .flat_map(|path| load_image(path.as_ref(), image_dim))
        .collect();

    Tensor::from_floats(
        TensorData::new(
            pixels,
            vec![
                batch_size,
                image_dim as usize,
                image_dim as usize,
                IMAGE_CHANNELS,
            ],
        ),
        device,
    )
}

// --- Reconstruction Output ---

/// Convert RGB floating-point pixel values `[0.0–1.0]` into byte values
/// `[0–255]`, clamping anything outside the unit interval.
pub fn to_rgb_bytes(pixels: &[f32]) -> Vec<u8> {
    pixels
        .iter()
        .map(|&v| (v * 255.0).clamp(0.0, 255.0) as u8)
        .collect()
}

/// Saves a flattened `[H, W, 3]` pixel vector as an image file.
///
/// The format is chosen from the file extension (`.jpg` for the
/// reconstructions written by the recovery tool).
///
/// # Errors
///
/// Panics if the buffer length does not match `image_dim` or if the
/// image cannot be written.
pub fn save_reconstruction(pixels: &[f32], image_dim: u32, path: &Path) {
    let expected = (image_dim * image_dim) as usize * IMAGE_CHANNELS;
    assert_eq!(
        pixels.len(),
        expected,
        "pixel buffer has {} values, expected {}",
        pixels.len(),
        expected
    );

    let img: RgbImage = ImageBuffer::from_raw(image_dim, image_dim, to_rgb_bytes(pixels))
        .expect("pixel buffer does not match image dimensions");
    img.save(path)
        .unwrap_or_else(|e| panic!("Failed to save image {}: {e}", path.display()));
    println!("Saved image to {}", path.display());
}
