//! Core crate for interacting with stylegan_rs.
//!
//! The API is a thin, linear flow: initialize the runtime, load the pretrained
//! snapshot, sample a latent vector, generate, save.
//!
//! ```rust,no_run
//! use stylegan_rs_core::{
//!     GenerationParams, InferenceRuntime, LatentSampler, ModelSource, Pipeline, TokenSource,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let runtime = InferenceRuntime::init()?;
//!
//! let pipeline = Pipeline::load(
//!     &runtime,
//!     ModelSource::pretrained(),
//!     false,
//!     TokenSource::CacheToken,
//!     None,
//!     None,
//! )?;
//!
//! let mut sampler = LatentSampler::from_seed(5);
//! let latents = sampler.sample(pipeline.latent_width());
//!
//! let images = pipeline.forward(&latents, &GenerationParams::default())?;
//! images[0].save("example.png")?;
//! # Ok(())
//! # }
//! ```

mod latent;
mod pipelines;
mod runtime;
mod util;

pub use latent::LatentSampler;
pub use pipelines::{GenerationParams, GeneratorPipeline, Pipeline};
pub use runtime::InferenceRuntime;
pub use stylegan_rs_common::{
    ModelSource, TokenSource, PRETRAINED_MODEL_ID, SNAPSHOT_FILENAME,
};
pub use util::save_png;
