use burn::{
    config::Config,
    module::Module,
    nn::{Linear, LinearConfig, Relu},
    record::{BinFileRecorder, FullPrecisionSettings, Recorder},
    tensor::{Tensor, activation, backend::Backend},
};

use crate::{IMAGE_CHANNELS, IMAGE_DIM, LATENT_DIM, NUM_CLASSES};

// --- CONFIG ---

/// Architecture of the pretrained class-conditional generator.
///
/// The recovery loop never trains this model; the config exists so the
/// saved weight record can be loaded back into the exact structure it
/// was produced with. From the loop's point of view the generator is an
/// opaque function `image = G(z, y, truncation)`.
#[derive(Config, Debug)]
pub struct GeneratorConfig {
    #[config(default = "LATENT_DIM")]
    pub latent_dim: usize,

    #[config(default = "NUM_CLASSES")]
    pub num_classes: usize,

    /// Width the one-hot class vector is embedded into before it is
    /// concatenated with the latent.
    #[config(default = 128)]
    pub embed_dim: usize,

    /// List of hidden layer sizes between the conditioned latent and the
    /// pixel output.
    #[config(default = "vec![256, 512, 1024]")]
    pub hidden_dims: Vec<usize>,

    /// Side length of the square RGB output image.
    #[config(default = "IMAGE_DIM")]
    pub image_dim: usize,
}

// --- GENERATOR ---

#[derive(Module, Debug)]
pub struct Generator<B: Backend> {
    class_embed: Linear<B>,
    layers: Vec<Linear<B>>,
    output_layer: Linear<B>,
    activation: Relu,
    image_dim: usize,
}

impl<B: Backend> Generator<B> {
    pub fn new(config: &GeneratorConfig, device: &B::Device) -> Self {
        let class_embed = LinearConfig::new(config.num_classes, config.embed_dim).init(device);

        let mut layers = Vec::new();
        let mut current_dim = config.latent_dim + config.embed_dim;
        for &dim in &config.hidden_dims {
            layers.push(LinearConfig::new(current_dim, dim).init(device));
            current_dim = dim;
        }

        // Final mapping to a flat RGB pixel vector
        let output_dim = config.image_dim * config.image_dim * IMAGE_CHANNELS;
        let output_layer = LinearConfig::new(current_dim, output_dim).init(device);

        Self {
            class_embed,
            layers,
            output_layer,
            activation: Relu::new(),
            image_dim: config.image_dim,
        }
    }

    /// Renders a batch of images from latent vectors and one-hot labels.
    ///
    /// # Arguments
    /// * `z` — Latent batch of shape `[batch, latent_dim]`.
    /// * `y` — One-hot class batch of shape `[batch, num_classes]`.
    /// * `truncation` — Truncation factor scaling the latent before the
    ///   first layer, trading sample diversity for fidelity.
    ///
    /// # Returns
    /// An image tensor of shape `[batch, image_dim, image_dim, 3]` with
    /// pixel values in `(0, 1)`.
    pub fn forward(&self, z: Tensor<B, 2>, y: Tensor<B, 2>, truncation: f64) -> Tensor<B, 4> {
        let [batch_size, _] = z.dims();

        let cond = self.class_embed.forward(y);
        let mut x = Tensor::cat(vec![z.mul_scalar(truncation), cond], 1);

        for layer in &self.layers {
            x = layer.forward(x);
            x = self.activation.forward(x);
        }

        // Final layer + sigmoid so pixels land in (0, 1)
        let x = activation::sigmoid(self.output_layer.forward(x));
        x.reshape([batch_size, self.image_dim, self.image_dim, IMAGE_CHANNELS])
    }
}

/// Loads the frozen generator from `<model_dir>/generator.config.json`
/// and the weight record `<model_dir>/generator`.
///
/// Terminates the process if either file is missing or does not match
/// the recorded architecture.
pub fn load_frozen<B: Backend>(model_dir: &str, device: &B::Device) -> (GeneratorConfig, Generator<B>) {
    let config = GeneratorConfig::load(format!("{model_dir}/generator.config.json"))
        .expect("Generator config not found. Is --model-dir pointing at a pretrained generator?");

    let record = BinFileRecorder::<FullPrecisionSettings>::new()
        .load(format!("{model_dir}/generator").into(), device)
        .expect("Generator weights file not found");

    let generator = Generator::new(&config, device).load_record(record);
    (config, generator)
}
