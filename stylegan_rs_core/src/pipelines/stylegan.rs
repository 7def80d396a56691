use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    thread,
};

use anyhow::{Context, Result};
use ndarray::{Array1, Array2, Array4, Ix4};
use ort::session::{builder::GraphOptimizationLevel, Session};
use tracing::info;

use super::{GenerationParams, GeneratorPipeline, Loader};

const GENERATOR_ENTRY: &str = "generator.onnx";
const DISCRIMINATOR_ENTRY: &str = "discriminator.onnx";
const GENERATOR_EMA_ENTRY: &str = "generator_ema.onnx";

const LATENTS_INPUT: &str = "latents";
const TRUNCATION_INPUT: &str = "truncation_psi";
const NOISE_INPUT: &str = "randomize_noise";
const IMAGES_OUTPUT: &str = "images";

pub(crate) struct StyleGanLoader;

impl Loader for StyleGanLoader {
    fn name(&self) -> &'static str {
        "stylegan"
    }

    fn required_entries(&self) -> Vec<&'static str> {
        vec![GENERATOR_ENTRY, DISCRIMINATOR_ENTRY, GENERATOR_EMA_ENTRY]
    }

    fn load_from_entries(
        &self,
        mut entries: HashMap<String, Vec<u8>>,
        silent: bool,
    ) -> Result<Arc<Mutex<dyn GeneratorPipeline>>> {
        let mut deserialize = |entry: &str, net: &str| -> Result<Session> {
            if !silent {
                info!("deserializing {net}");
            }
            let bytes = entries
                .remove(entry)
                .with_context(|| format!("missing snapshot entry `{entry}`"))?;
            build_session(&bytes).with_context(|| format!("deserializing `{entry}`"))
        };

        // The instantaneous generator and discriminator snapshots are mainly
        // useful for resuming a training run. The long-term average of the
        // generator yields higher-quality results and drives inference.
        let generator = deserialize(GENERATOR_ENTRY, "generator snapshot")?;
        let discriminator = deserialize(DISCRIMINATOR_ENTRY, "discriminator snapshot")?;
        let generator_ema = deserialize(GENERATOR_EMA_ENTRY, "averaged generator")?;

        let latent_width = declared_latent_width(&generator_ema)?;
        if !silent {
            log_graph(&generator_ema);
        }

        Ok(Arc::new(Mutex::new(StyleGanPipeline {
            bundle: ModelBundle {
                generator,
                discriminator,
                generator_ema,
            },
            latent_width,
        })))
    }
}

/// The three networks deserialized together from one snapshot.
struct ModelBundle {
    #[allow(dead_code)]
    generator: Session,
    #[allow(dead_code)]
    discriminator: Session,
    generator_ema: Session,
}

pub(crate) struct StyleGanPipeline {
    bundle: ModelBundle,
    latent_width: usize,
}

impl GeneratorPipeline for StyleGanPipeline {
    fn latent_width(&self) -> usize {
        self.latent_width
    }

    fn forward(&mut self, latents: &Array2<f32>, params: &GenerationParams) -> Result<Array4<f32>> {
        let truncation_psi = Array1::from_elem(1, params.truncation_psi as f32);
        let randomize_noise = Array1::from_elem(1, i64::from(params.randomize_noise));

        let inputs = ort::inputs![
            LATENTS_INPUT => latents.view(),
            TRUNCATION_INPUT => truncation_psi.view(),
            NOISE_INPUT => randomize_noise.view(),
        ]?;
        let outputs = self.bundle.generator_ema.run(inputs)?;

        let images = outputs
            .get(IMAGES_OUTPUT)
            .with_context(|| format!("generator graph has no `{IMAGES_OUTPUT}` output"))?
            .try_extract_tensor::<f32>()?;
        images
            .to_owned()
            .into_dimensionality::<Ix4>()
            .context("generator output is not an NCHW image batch")
    }
}

fn build_session(bytes: &[u8]) -> Result<Session> {
    Ok(Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(thread::available_parallelism()?.get())?
        .commit_from_memory(bytes)?)
}

fn declared_latent_width(session: &Session) -> Result<usize> {
    let input = session
        .inputs
        .iter()
        .find(|input| input.name == LATENTS_INPUT)
        .with_context(|| format!("averaged generator has no `{LATENTS_INPUT}` input"))?;
    let ort::value::ValueType::Tensor { dimensions, .. } = &input.input_type else {
        anyhow::bail!("`{LATENTS_INPUT}` input is not a tensor");
    };
    let width = *dimensions
        .last()
        .with_context(|| format!("`{LATENTS_INPUT}` input has no dimensions"))?;
    if width <= 0 {
        anyhow::bail!("averaged generator does not declare a fixed latent width");
    }
    Ok(width as usize)
}

fn log_graph(session: &Session) {
    for input in &session.inputs {
        info!("averaged generator input `{}`: {:?}", input.name, input.input_type);
    }
    for output in &session.outputs {
        info!(
            "averaged generator output `{}`: {:?}",
            output.name, output.output_type
        );
    }
}
