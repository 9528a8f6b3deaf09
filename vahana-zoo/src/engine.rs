//! Engine capability boundary and process-wide registry
//!
//! Engines are external collaborators: the zoo defines the capability
//! surface (load a model file, run inference on opaque tensors, release
//! on drop) and dispatches to whichever runtime was registered for an
//! engine identifier. No tensor computation happens on this side.

use crate::criteria::EngineId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use vahana_core::error::{Result, ZooError};
use vahana_core::tensor::TensorList;

/// Compute device a model is loaded onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    #[default]
    Cpu,
    Gpu(u32),
}

/// A loaded model owned by its engine. Native resources behind the
/// handle are released when the handle is dropped.
pub trait ModelHandle: Send + Sync {
    /// Run one inference pass. Each call is independent; implementations
    /// must not carry state between calls.
    fn infer(&self, inputs: &TensorList) -> Result<TensorList>;
}

/// A backend runtime capable of loading model files for one engine.
pub trait Engine: Send + Sync {
    fn id(&self) -> EngineId;

    /// Load and initialize a model from `path` onto `device`.
    /// Corrupt or incompatible weights fail with `ModelLoad`.
    fn load(&self, path: &Path, device: Device) -> Result<Box<dyn ModelHandle>>;
}

/// Process-wide map from engine identifier to its registered runtime.
/// Readable concurrently; mutated only through explicit registration.
#[derive(Default)]
pub struct EngineRegistry {
    engines: RwLock<HashMap<EngineId, Arc<dyn Engine>>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a runtime, replacing any previous registration for the
    /// same engine.
    pub fn register(&self, engine: Arc<dyn Engine>) {
        let id = engine.id();
        self.engines.write().insert(id, engine);
        info!("registered {} engine runtime", id);
    }

    /// The runtime registered for `id`, or `EngineUnavailable`.
    pub fn get(&self, id: EngineId) -> Result<Arc<dyn Engine>> {
        self.engines.read().get(&id).cloned().ok_or_else(|| {
            ZooError::EngineUnavailable(format!("no {} runtime registered", id))
        })
    }

    pub fn is_registered(&self, id: EngineId) -> bool {
        self.engines.read().contains_key(&id)
    }

    pub fn registered(&self) -> Vec<EngineId> {
        EngineId::ALL
            .into_iter()
            .filter(|id| self.is_registered(*id))
            .collect()
    }
}
