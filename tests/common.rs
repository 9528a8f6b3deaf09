//! Shared fixtures: a counting stub engine over a trivial weight format
#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use vahana_core::config::ZooConfig;
use vahana_core::error::{Result, ZooError};
use vahana_core::tensor::{Tensor, TensorList};
use vahana_zoo::catalog::ModelReference;
use vahana_zoo::criteria::{Criteria, EngineId};
use vahana_zoo::engine::{Device, Engine, ModelHandle};
use vahana_zoo::zoo::ModelZoo;

/// Weight format understood by the stub engine: magic, then a
/// little-endian u32 class count, then padding.
pub const MAGIC: &[u8] = b"VAHZ";

pub struct StubHandle {
    classes: usize,
    live: Arc<AtomicUsize>,
}

impl ModelHandle for StubHandle {
    fn infer(&self, inputs: &TensorList) -> Result<TensorList> {
        let input = inputs.single()?;
        // Pure function of the input: per-class segment sums
        let data = input.data();
        let segment = (data.len() / self.classes.max(1)).max(1);
        let mut scores = vec![0.0f32; self.classes];
        for (i, value) in data.iter().enumerate() {
            let class = (i / segment).min(self.classes.saturating_sub(1));
            scores[class] += value;
        }
        Ok(TensorList::from(Tensor::from_vec(scores)))
    }
}

impl Drop for StubHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct StubEngine {
    id: EngineId,
    live: Arc<AtomicUsize>,
}

impl Engine for StubEngine {
    fn id(&self) -> EngineId {
        self.id
    }

    fn load(&self, path: &Path, _device: Device) -> Result<Box<dyn ModelHandle>> {
        let bytes = std::fs::read(path)?;
        if bytes.len() < 8 || !bytes.starts_with(MAGIC) {
            return Err(ZooError::ModelLoad(format!(
                "invalid weight file magic in {:?}",
                path
            )));
        }
        let classes = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubHandle {
            classes,
            live: Arc::clone(&self.live),
        }))
    }
}

/// An offline zoo over a temporary cache directory with the stub engine
/// registered for every engine identifier.
pub struct ZooFixture {
    pub dir: TempDir,
    pub zoo: ModelZoo,
    /// Number of live engine handles, for leak checks
    pub live: Arc<AtomicUsize>,
}

impl ZooFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let mut config = ZooConfig::default();
        config.model_dir = dir.path().to_path_buf();
        config.offline = true;

        let zoo = ModelZoo::new(config).expect("default config is valid");
        let live = Arc::new(AtomicUsize::new(0));
        for id in EngineId::ALL {
            zoo.register_engine(Arc::new(StubEngine {
                id,
                live: Arc::clone(&live),
            }));
        }
        Self { dir, zoo, live }
    }

    pub fn live_handles(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Write a stub weight file for the model the criteria resolve to,
    /// with the class count taken from the entry's label list.
    pub fn seed_artifact(&self, engine: EngineId, criteria: &Criteria) -> ModelReference {
        let reference = self.zoo.resolve(engine, criteria).expect("criteria resolve");
        self.write_weights(&reference.artifact.file_name, reference.labels.len() as u32);
        reference
    }

    /// Write a stub weight file advertising an arbitrary class count.
    pub fn seed_artifact_with_classes(
        &self,
        engine: EngineId,
        criteria: &Criteria,
        classes: u32,
    ) -> ModelReference {
        let reference = self.zoo.resolve(engine, criteria).expect("criteria resolve");
        self.write_weights(&reference.artifact.file_name, classes);
        reference
    }

    /// Write garbage where the criteria's weight file would live.
    pub fn seed_corrupted_artifact(&self, engine: EngineId, criteria: &Criteria) {
        let reference = self.zoo.resolve(engine, criteria).expect("criteria resolve");
        let mut bytes = b"GARBAGE!".to_vec();
        bytes.resize(2048, 0);
        std::fs::write(self.dir.path().join(&reference.artifact.file_name), bytes)
            .expect("write weights");
    }

    fn write_weights(&self, file_name: &str, classes: u32) {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&classes.to_le_bytes());
        bytes.resize(2048, 0);
        std::fs::write(self.dir.path().join(file_name), bytes).expect("write weights");
    }
}

pub fn builtin_cifar_criteria() -> Criteria {
    Criteria::new().with("layers", "50").with("dataset", "cifar10")
}
