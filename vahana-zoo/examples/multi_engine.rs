//! Basic example: load a resnet from each engine zoo and classify one image
//!
//! Engine runtimes are external to the zoo, so this demo registers a
//! stand-in engine whose handles derive deterministic scores from the
//! input tensor. Swap in real runtime bindings to run actual models.

use image::{DynamicImage, ImageBuffer, Rgb};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use vahana_core::config::ZooConfig;
use vahana_core::error::{Result, ZooError};
use vahana_core::progress::LogProgress;
use vahana_core::tensor::{Tensor, TensorList};
use vahana_zoo::criteria::{Criteria, EngineId};
use vahana_zoo::engine::{Device, Engine, ModelHandle};
use vahana_zoo::translator::ImageTranslator;
use vahana_zoo::zoo::ModelZoo;

const DEMO_MAGIC: &[u8] = b"VDEM";

/// Weights for the demo engine: magic followed by a little-endian class
/// count.
struct DemoHandle {
    classes: usize,
}

impl ModelHandle for DemoHandle {
    fn infer(&self, inputs: &TensorList) -> Result<TensorList> {
        let input = inputs.single()?;
        // Deterministic pseudo-scores: fold the input into per-class sums
        let mut scores = vec![0.0f32; self.classes];
        for (i, value) in input.data().iter().enumerate() {
            scores[i % self.classes] += value;
        }
        let scale = 1.0 / (input.element_count().max(1) as f32);
        for score in &mut scores {
            *score *= scale * self.classes as f32;
        }
        Ok(TensorList::from(Tensor::from_vec(scores)))
    }
}

struct DemoEngine {
    id: EngineId,
}

impl Engine for DemoEngine {
    fn id(&self) -> EngineId {
        self.id
    }

    fn load(&self, path: &Path, _device: Device) -> Result<Box<dyn ModelHandle>> {
        let bytes = std::fs::read(path)?;
        if bytes.len() < 8 || !bytes.starts_with(DEMO_MAGIC) {
            return Err(ZooError::ModelLoad(format!(
                "not a demo weight file: {:?}",
                path
            )));
        }
        let classes = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        if classes == 0 {
            return Err(ZooError::ModelLoad(format!(
                "demo weight file declares zero classes: {:?}",
                path
            )));
        }
        Ok(Box::new(DemoHandle { classes }))
    }
}

fn demo_image() -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_fn(256, 256, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

/// Seed a demo weight file for every model the demo resolves.
fn seed_demo_weights(zoo: &ModelZoo, config: &ZooConfig) -> Result<()> {
    std::fs::create_dir_all(&config.model_dir)?;
    for (engine, criteria) in demo_configurations() {
        let reference = zoo.resolve(engine, &criteria)?;
        let mut bytes = DEMO_MAGIC.to_vec();
        bytes.extend_from_slice(&(reference.labels.len() as u32).to_le_bytes());
        bytes.resize(2048, 0);
        std::fs::write(config.model_dir.join(&reference.artifact.file_name), bytes)?;
    }
    Ok(())
}

fn demo_configurations() -> Vec<(EngineId, Criteria)> {
    vec![
        (
            EngineId::TensorFlow,
            Criteria::new().with("layers", "50").with("dataset", "imagenet"),
        ),
        (
            EngineId::MxNet,
            Criteria::new()
                .with("layers", "50")
                .with("flavor", "v1")
                .with("dataset", "cifar10"),
        ),
        (
            EngineId::PyTorch,
            Criteria::new().with("layers", "50").with("dataset", "imagenet"),
        ),
        (
            EngineId::Builtin,
            Criteria::new().with("layers", "50").with("dataset", "cifar10"),
        ),
    ]
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Keep the demo self-contained: cached artifacts only, no network
    let cache_dir = tempfile::TempDir::new()?;
    let mut config = ZooConfig::default();
    config.model_dir = cache_dir.path().to_path_buf();
    config.offline = true;

    let zoo = ModelZoo::new(config.clone())?;
    for engine in EngineId::ALL {
        zoo.register_engine(Arc::new(DemoEngine { id: engine }));
    }
    seed_demo_weights(&zoo, &config)?;

    let image = match std::env::args().nth(1) {
        Some(path) => image::open(path)?,
        None => demo_image(),
    };

    for (engine, criteria) in demo_configurations() {
        let mut progress = LogProgress::new(format!("loading {} resnet", engine));
        let model = zoo.load_model(engine, &criteria, Some(&mut progress)).await?;

        let translator =
            ImageTranslator::for_engine(engine, model.reference().labels.clone());
        let predictor = model.new_predictor(translator)?;

        let result = predictor.predict(&image)?;
        info!("{} resnet50: {}", engine, result);

        model.close()?;
    }

    Ok(())
}
