use burn::tensor::{Tensor, TensorData, backend::Backend};
use rand::Rng;
use rand::rngs::StdRng;
use rand_distr::StandardNormal;

pub mod generator;
pub mod image_data;
pub mod latent_io;
pub mod schedule;

/// Dimensionality of the generator latent space.
///
/// This value is used globally by the recovery tool, the render tool,
/// and the generator configuration defaults.
pub const LATENT_DIM: usize = 128;

/// Number of classes the generator is conditioned on.
pub const NUM_CLASSES: usize = 1000;

/// Side length of the generator output (and of the resized target images).
pub const IMAGE_DIM: usize = 512;

/// Number of color channels in generated images (RGB).
pub const IMAGE_CHANNELS: usize = 3;

// --- Loss Function ---

/// Computes the reconstruction loss driving the latent recovery.
///
/// This is the mean squared pixel error between the generator output and
/// the target image batch:
/// ```text
/// MSE = mean( (G(z, y) - x)^2 )
/// ```
/// averaged over every pixel, channel and batch entry.
///
/// # Arguments
///
/// * `generated` — Generator output with shape `[batch, H, W, 3]`
/// * `target` — Target images, same shape as `generated`, values in `[0, 1]`
///
/// # Returns
///
/// A tensor containing a single scalar loss value (shape `[1]`).
pub fn reconstruction_loss<B: Backend>(
    generated: Tensor<B, 4>,
    target: Tensor<B, 4>,
) -> Tensor<B, 1> {
    (generated - target).powf_scalar(2.0).mean()
}

// --- Latent Initialization ---

/// Draws a `[batch_size, latent_dim]` latent matrix from a truncated
/// standard normal, scaled by the truncation factor.
///
/// Values are resampled until they fall within two standard deviations,
/// then multiplied by `truncation`. This mirrors the sampling the
/// generator itself was trained with, so the starting point for the
/// descent lies in a region the generator can actually render well.
pub fn sample_latent<B: Backend>(
    batch_size: usize,
    latent_dim: usize,
    truncation: f64,
    rng: &mut StdRng,
    device: &B::Device,
) -> Tensor<B, 2> {
    let n = batch_size * latent_dim;
    let mut values = Vec::with_capacity(n);
    while values.len() < n {
        let v: f32 = rng.sample(StandardNormal);
        if v.abs() <= 2.0 {
            values.push(truncation as f32 * v);
        }
    }
    Tensor::from_floats(TensorData::new(values, vec![batch_size, latent_dim]), device)
}

/// Builds one-hot rows of width `num_classes` for the given class indices.
///
/// Each index must be smaller than `num_classes`.
pub fn one_hot(indices: &[usize], num_classes: usize) -> Vec<f32> {
    let mut values = vec![0.0; indices.len() * num_classes];
    for (row, &index) in indices.iter().enumerate() {
        assert!(
            index < num_classes,
            "class index {} out of range (num_classes = {})",
            index,
            num_classes
        );
        values[row * num_classes + index] = 1.0;
    }
    values
}

/// Samples a `[batch_size, num_classes]` one-hot class matrix at uniformly
/// random class indices.
///
/// The class conditioning of the target image is unknown, so the descent
/// starts from an arbitrary class and adjusts the label rows by gradient
/// like the latent itself.
pub fn random_one_hot<B: Backend>(
    batch_size: usize,
    num_classes: usize,
    rng: &mut StdRng,
    device: &B::Device,
) -> Tensor<B, 2> {
    let indices: Vec<usize> = (0..batch_size)
        .map(|_| rng.random_range(0..num_classes))
        .collect();
    Tensor::from_floats(
        TensorData::new(one_hot(&indices, num_classes), vec![batch_size, num_classes]),
        device,
    )
}
