mod config;

use std::time::Instant;

use clap::Parser;
use stylegan_rs_core::{
    GenerationParams, InferenceRuntime, LatentSampler, ModelSource, Pipeline, TokenSource,
};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use config::AppConfig;

#[derive(Parser)]
struct Args {
    /// Seed for the latent-vector generator
    #[arg(short = 'r', long, default_value_t = 5)]
    init_rand: u64,

    /// Output filename, placed under the result directory
    #[arg(short, long, default_value = "example.png")]
    output: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env();

    let runtime = InferenceRuntime::init()?;

    let pipeline = Pipeline::load(
        &runtime,
        ModelSource::pretrained(),
        false,
        TokenSource::CacheToken,
        None,
        Some(config.cache_dir.clone()),
    )?;

    let mut sampler = LatentSampler::from_seed(args.init_rand);
    let latents = sampler.sample(pipeline.latent_width());

    let start = Instant::now();

    let images = pipeline.forward(&latents, &GenerationParams::default())?;

    let end = Instant::now();
    println!(
        "Image generation took: {:.2}s",
        end.duration_since(start).as_secs_f32()
    );

    let path = stylegan_rs_core::save_png(&config.result_dir, &args.output, &images[0])?;
    info!("saved image to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_default_to_the_documented_values() {
        let args = Args::try_parse_from(["stylegan_rs_cli"]).unwrap();
        assert_eq!(args.init_rand, 5);
        assert_eq!(args.output, "example.png");
    }

    #[test]
    fn both_flags_have_short_and_long_forms() {
        let args =
            Args::try_parse_from(["stylegan_rs_cli", "-r", "42", "-o", "foo.png"]).unwrap();
        assert_eq!(args.init_rand, 42);
        assert_eq!(args.output, "foo.png");

        let args = Args::try_parse_from([
            "stylegan_rs_cli",
            "--init-rand",
            "42",
            "--output",
            "foo.png",
        ])
        .unwrap();
        assert_eq!(args.init_rand, 42);
        assert_eq!(args.output, "foo.png");
    }

    #[test]
    fn malformed_seeds_are_a_usage_error() {
        assert!(Args::try_parse_from(["stylegan_rs_cli", "--init-rand", "five"]).is_err());
    }

    #[test]
    fn unrecognized_flags_are_a_usage_error() {
        assert!(Args::try_parse_from(["stylegan_rs_cli", "--truncation", "0.5"]).is_err());
    }
}
