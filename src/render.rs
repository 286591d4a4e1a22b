#![recursion_limit = "256"]

// Render an image from a saved latent vector through the frozen
// generator. Useful to inspect a recovered vector without re-running
// the descent, or to sanity-check the generator itself.

use burn::tensor::{Tensor, TensorData, backend::Backend};
use burn_wgpu::{Wgpu, WgpuDevice};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

use ganrecover::generator::load_frozen;
use ganrecover::image_data::save_reconstruction;
use ganrecover::latent_io::load_latent;
use ganrecover::{one_hot, random_one_hot, sample_latent};

// --- CLI DEFINITION ---

/// Command-line interface for the generator render tool.
///
/// If `--latent` is omitted, a truncated-normal latent vector is
/// sampled. If `--class-index` is omitted, a random class is drawn.
#[derive(Parser, Debug)]
#[command(author, version, about = "render an image from a latent vector")]
struct Args {
    /// Latent vector file (.npy) to render, e.g. one recovered by the
    /// recover tool.
    #[arg(short = 'z', long)]
    latent: Option<PathBuf>,

    /// Class index to condition the generator on.
    #[arg(short = 'c', long)]
    class_index: Option<usize>,

    /// Directory holding the frozen generator config and weights.
    #[arg(short = 'M', long, default_value = "generator_model")]
    model_dir: String,

    /// Generator truncation factor.
    #[arg(short = 'T', long, default_value_t = 0.5)]
    truncation: f64,

    /// File path for the rendered output image.
    #[arg(short, long, default_value = "rendered.jpg")]
    output: String,

    /// Seed for any random latent or class draw.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn render<B: Backend>(args: &Args, device: B::Device) {
    let mut rng = StdRng::seed_from_u64(args.seed);

    println!("Loading generator...");
    let (config, generator) = load_frozen::<B>(&args.model_dir, &device);

    let z: Tensor<B, 2> = match &args.latent {
        Some(path) => {
            let values = load_latent(path);
            assert_eq!(
                values.len(),
                config.latent_dim,
                "latent file has {} entries, generator expects {}",
                values.len(),
                config.latent_dim
            );
            Tensor::from_floats(TensorData::new(values, vec![1, config.latent_dim]), &device)
        }
        None => {
            println!("No latent provided. Sampling a random one.");
            sample_latent(1, config.latent_dim, args.truncation, &mut rng, &device)
        }
    };

    let y: Tensor<B, 2> = match args.class_index {
        Some(index) => Tensor::from_floats(
            TensorData::new(one_hot(&[index], config.num_classes), vec![1, config.num_classes]),
            &device,
        ),
        None => {
            println!("No class index provided. Drawing a random class.");
            random_one_hot(1, config.num_classes, &mut rng, &device)
        }
    };

    let pixels: Vec<f32> = generator
        .forward(z, y, args.truncation)
        .into_data()
        .to_vec()
        .expect("Failed to convert image tensor to vector");

    save_reconstruction(&pixels, config.image_dim as u32, Path::new(&args.output));
}

fn main() {
    let args = Args::parse();

    // No gradients needed to render; the plain backend is enough.
    type RenderBackend = Wgpu;
    let device = WgpuDevice::DefaultDevice;

    render::<RenderBackend>(&args, device);
}
