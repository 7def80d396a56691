mod stylegan;

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::Result;
use image::DynamicImage;
use ndarray::{Array2, Array4};
use serde::Deserialize;
use stylegan_rs_common::{ModelSource, NiceProgressBar, SnapshotLoader, TokenSource};
use tracing::info;

use crate::{runtime::InferenceRuntime, util::batch_to_rgb_images};
use stylegan::StyleGanLoader;

/// Inference parameters.
///
/// The defaults are the fixed hyperparameters of the pretrained example:
/// truncation 0.7 with graph-internal noise randomization enabled.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    /// Trades output diversity for typicality; applied to the intermediate
    /// latent inside the graph.
    pub truncation_psi: f64,
    /// When set, the graph draws fresh per-layer noise on every run. The
    /// seeded latent therefore does not fully determine the output pixels.
    pub randomize_noise: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            truncation_psi: 0.7,
            randomize_noise: true,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
struct SnapshotIndex {
    #[serde(rename = "_class_name")]
    name: String,
}

pub(crate) trait Loader {
    fn name(&self) -> &'static str;
    fn required_entries(&self) -> Vec<&'static str>;
    fn load_from_entries(
        &self,
        entries: HashMap<String, Vec<u8>>,
        silent: bool,
    ) -> Result<Arc<Mutex<dyn GeneratorPipeline>>>;
}

/// The capability this crate needs from a loaded generator: its declared input
/// width and a one-batch forward pass. The network itself stays opaque.
pub trait GeneratorPipeline: Send + Sync {
    fn latent_width(&self) -> usize;
    /// Run the generator over a `(1, latent_width)` batch, producing an NCHW
    /// `f32` image batch in `[-1, 1]`.
    fn forward(&mut self, latents: &Array2<f32>, params: &GenerationParams) -> Result<Array4<f32>>;
}

/// Represents the loaded model bundle and provides methods to interact with it.
pub struct Pipeline {
    model: Arc<Mutex<dyn GeneratorPipeline>>,
}

impl Pipeline {
    /// Load the model bundle named by `source`.
    ///
    /// Note:
    /// - `token`, `revision` and `cache_dir` are only applicable for Hugging
    ///   Face sources.
    /// - the `runtime` handle must outlive the pipeline; taking it by
    ///   reference keeps the required initialization order explicit.
    pub fn load(
        _runtime: &InferenceRuntime,
        source: ModelSource,
        silent: bool,
        token: TokenSource,
        revision: Option<String>,
        cache_dir: Option<PathBuf>,
    ) -> Result<Self> {
        info!("loading from source: {source}.");

        let mut snapshot = SnapshotLoader::from_source(source, silent, token, revision, cache_dir)?;
        let entry_names = snapshot.entry_names();
        if !entry_names.contains(&"snapshot_index.json".to_string()) {
            anyhow::bail!("Expected `snapshot_index.json` entry present.");
        }

        let SnapshotIndex { name } =
            serde_json::from_slice(&snapshot.read_entry("snapshot_index.json")?)?;
        let model_loader: Box<dyn Loader> = match name.as_str() {
            "StyleGanPipeline" => Box::new(StyleGanLoader),
            other => anyhow::bail!("Unexpected loader type `{other:?}`."),
        };

        info!("model architecture is: {}", model_loader.name());

        let mut entries = HashMap::new();
        for entry in NiceProgressBar::<_, 'g'>(
            model_loader.required_entries().into_iter(),
            "Loading components",
        ) {
            entries.insert(entry.to_string(), snapshot.read_entry(entry)?);
        }

        let model = model_loader.load_from_entries(entries, silent)?;

        Ok(Self { model })
    }

    /// The latent input width the loaded generator declares.
    pub fn latent_width(&self) -> usize {
        self.model
            .lock()
            .expect("Could not lock model!")
            .latent_width()
    }

    /// Generate images from a latent batch.
    ///
    /// The raw graph output is converted to uint8 RGB in height-width-channel
    /// order before being returned.
    pub fn forward(
        &self,
        latents: &Array2<f32>,
        params: &GenerationParams,
    ) -> Result<Vec<DynamicImage>> {
        let mut model = self.model.lock().expect("Could not lock model!");
        let batch = model.forward(latents, params)?;
        batch_to_rgb_images(&batch)
    }
}
