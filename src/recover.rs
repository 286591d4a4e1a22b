#![recursion_limit = "256"]

// Given an image (possibly produced by the generator itself), recover
// the latent vector and class conditioning that best reproduce it, by
// plain gradient descent on the generator inputs. The generator weights
// stay frozen throughout.
//
// Based on the ICLR 17 workshop paper:
// "Precise Recovery of Latent Vectors from Generative Adversarial
// Networks" by Zachary C. Lipton and Subarna Tripathi.

use burn::prelude::ElementConversion;
use burn::tensor::{Tensor, TensorData, backend::AutodiffBackend};
use burn_wgpu::{Wgpu, WgpuDevice};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

use ganrecover::generator::load_frozen;
use ganrecover::image_data::{load_target_batch, save_reconstruction};
use ganrecover::latent_io::{load_latent, save_latent};
use ganrecover::schedule::ExponentialDecay;
use ganrecover::{random_one_hot, reconstruction_loss, sample_latent};

// --- CLI DEFINITION ---

#[derive(Parser, Debug)]
#[command(author, version, about = "recovering latent vectors of images")]
struct Args {
    /// Source images for which to recover vectors.
    #[arg(short = 'I', long, num_args = 1.., required = true)]
    images: Vec<String>,

    /// Directory containing source images.
    #[arg(short = 'S', long, default_value = "source_images")]
    source_dir: String,

    /// Directory to store recovered latent vectors.
    #[arg(short = 'D', long, default_value = "latent_vectors")]
    dest_dir: String,

    /// Directory holding the frozen generator config and weights.
    #[arg(short = 'M', long, default_value = "generator_model")]
    model_dir: String,

    /// Generator truncation factor.
    #[arg(short = 'T', long, default_value_t = 0.5)]
    truncation: f64,

    /// Number of iterations of gradient descent.
    #[arg(short = 'i', long, default_value_t = 10_000)]
    iters: usize,

    /// Initial learning rate.
    #[arg(short = 'l', long, default_value_t = 0.99)]
    init_lr: f64,

    /// Number of steps to decay the learning rate over.
    #[arg(long, default_value_t = 10_000)]
    decay_steps: usize,

    /// Rate of decay for the learning rate.
    #[arg(long, default_value_t = 0.005)]
    decay_rate: f64,

    /// Warm-start latent vector (.npy) used instead of a random draw.
    /// When given, every batch entry starts from this vector.
    #[arg(long)]
    init_latent: Option<PathBuf>,

    /// Seed for the latent and class initialization.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

// --- Recovery Loop ---

/// Executes the latent recovery for the whole image batch.
///
/// Lifecycle:
/// 1. Load the frozen generator (config + weight record).
/// 2. Load and normalize the target images into one batch tensor.
/// 3. Initialize the trainable latent matrix and one-hot class matrix.
/// 4. Descend the mean squared pixel error for `iters` steps, updating
///    only the latent inputs with an exponentially decayed rate.
/// 5. Save one `.npy` latent and one `.recv.jpg` reconstruction per
///    input image.
fn recovery_loop<B: AutodiffBackend>(args: &Args, device: B::Device) {
    let mut rng = StdRng::seed_from_u64(args.seed);

    println!("Loading generator...");
    let (config, generator) = load_frozen::<B>(&args.model_dir, &device);

    println!("Loading images...");
    let paths: Vec<PathBuf> = args
        .images
        .iter()
        .map(|name| Path::new(&args.source_dir).join(name))
        .collect();
    let target: Tensor<B, 4> = load_target_batch(&paths, config.image_dim as u32, &device);
    let batch_size = args.images.len();

    // Choose a random starting point, or warm-start from a known vector
    let mut zp: Tensor<B, 2> = match &args.init_latent {
        Some(path) => {
            let values = load_latent(path);
            assert_eq!(
                values.len(),
                config.latent_dim,
                "warm-start latent has {} entries, generator expects {}",
                values.len(),
                config.latent_dim
            );
            let mut data = Vec::with_capacity(batch_size * config.latent_dim);
            for _ in 0..batch_size {
                data.extend_from_slice(&values);
            }
            Tensor::from_floats(
                TensorData::new(data, vec![batch_size, config.latent_dim]),
                &device,
            )
        }
        None => sample_latent(batch_size, config.latent_dim, args.truncation, &mut rng, &device),
    }
    .require_grad();

    // The class of the target is unknown; start from a random one-hot row
    // per image and let the descent adjust it.
    let mut y: Tensor<B, 2> =
        random_one_hot(batch_size, config.num_classes, &mut rng, &device).require_grad();

    let mut schedule = ExponentialDecay::new(args.init_lr, args.decay_steps, args.decay_rate);

    for step in 0..args.iters {
        let generated = generator.forward(zp.clone(), y.clone(), args.truncation);
        let loss = reconstruction_loss(generated, target.clone());

        let eta = schedule.lr();
        let loss_value = loss.clone().into_scalar().elem::<f64>();

        // Backward pass; only the latent inputs are stepped, so the
        // generator stays frozen even though its gradients exist.
        let grads = loss.backward();
        let zp_grad = zp.grad(&grads).expect("latent gradient missing");
        let y_grad = y.grad(&grads).expect("label gradient missing");

        zp = Tensor::from_inner(zp.inner() - zp_grad.mul_scalar(eta)).require_grad();
        y = Tensor::from_inner(y.inner() - y_grad.mul_scalar(eta)).require_grad();
        schedule.step();

        println!("{step:03}) eta={eta:.6}, loss = {loss_value:.6}");
    }

    // --- SAVING THE RESULTS ---
    let dest = Path::new(&args.dest_dir);
    std::fs::create_dir_all(dest).expect("Failed to create destination directory");

    let latent_host: Vec<f32> = zp
        .clone()
        .inner()
        .into_data()
        .to_vec()
        .expect("Failed to convert latent tensor to vector");

    for (ix, name) in args.images.iter().enumerate() {
        let stem = stem_of(name);
        let row = &latent_host[ix * config.latent_dim..(ix + 1) * config.latent_dim];
        save_latent(&dest.join(format!("{stem}.npy")), row);
    }

    // Render the reconstruction out of the recovered latent vectors
    let images = generator.forward(zp, y, args.truncation);
    let pixels: Vec<f32> = images
        .inner()
        .into_data()
        .to_vec()
        .expect("Failed to convert image tensor to vector");

    let per_image = config.image_dim * config.image_dim * ganrecover::IMAGE_CHANNELS;
    for (ix, name) in args.images.iter().enumerate() {
        let stem = stem_of(name);
        save_reconstruction(
            &pixels[ix * per_image..(ix + 1) * per_image],
            config.image_dim as u32,
            &dest.join(format!("{stem}.recv.jpg")),
        );
    }
}

/// File name without its final extension (`foo_00.png` -> `foo_00`).
fn stem_of(name: &str) -> &str {
    name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
}

fn main() {
    let args = Args::parse();

    // Autodiff wrapper is required to compute gradients w.r.t. the inputs.
    type RecoverBackend = burn::backend::Autodiff<Wgpu>;
    let device = WgpuDevice::DefaultDevice;

    recovery_loop::<RecoverBackend>(&args, device);
}
