//! Binary for pre-fetching model artifacts from the command line

use std::env;
use std::sync::Arc;
use vahana_core::config::ZooConfig;
use vahana_core::error::ZooError;
use vahana_core::progress::LogProgress;
use vahana_zoo::artifact::ArtifactStore;
use vahana_zoo::criteria::{Criteria, EngineId};
use vahana_zoo::zoo::ModelZoo;

#[tokio::main]
async fn main() -> Result<(), ZooError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: fetch_model <engine> [attribute=value ...]");
        eprintln!("Available engines: tensorflow, mxnet, pytorch, builtin");
        eprintln!("Example: fetch_model builtin layers=50 dataset=cifar10");
        std::process::exit(1);
    }

    let engine: EngineId = match args[1].parse() {
        Ok(engine) => engine,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("Available engines: tensorflow, mxnet, pytorch, builtin");
            std::process::exit(1);
        }
    };

    let mut criteria = Criteria::new();
    for arg in &args[2..] {
        match arg.split_once('=') {
            Some((key, value)) => criteria = criteria.with(key, value),
            None => {
                eprintln!("Invalid criteria argument: {} (expected attribute=value)", arg);
                std::process::exit(1);
            }
        }
    }

    let config = ZooConfig::default();
    let zoo = ModelZoo::new(config.clone())?;
    let reference = zoo.resolve(engine, &criteria)?;
    println!(
        "Fetching {} model \"{}\" {}...",
        engine, reference.name, reference.attributes
    );

    let store = ArtifactStore::new(Arc::new(config));
    let mut progress = LogProgress::new(format!("downloading {}", reference.artifact.file_name));
    let path = store.ensure(&reference.artifact, Some(&mut progress)).await?;
    println!("Artifact saved to: {:?}", path);

    Ok(())
}
