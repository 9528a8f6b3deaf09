//! The model zoo front door: catalogs, engines, and model loading

use crate::artifact::ArtifactStore;
use crate::catalog::{Catalog, ModelReference, StaticCatalog};
use crate::criteria::{Criteria, EngineId};
use crate::engine::{Device, Engine, EngineRegistry};
use crate::resolver;
use crate::session::ZooModel;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use vahana_core::config::ZooConfig;
use vahana_core::error::{Result, ZooError};
use vahana_core::progress::Progress;

/// Uniform façade over all four engine zoos.
///
/// Catalogs are pre-populated with each engine's built-in entries and
/// are immutable once registered; `replace_catalog` is the only
/// (explicit) invalidation path. Engine runtimes are injected through
/// [`register_engine`](Self::register_engine).
pub struct ModelZoo {
    registry: EngineRegistry,
    catalogs: RwLock<HashMap<EngineId, Arc<dyn Catalog>>>,
    store: ArtifactStore,
}

impl ModelZoo {
    /// Zoo with built-in catalogs for every engine.
    pub fn new(config: ZooConfig) -> Result<Self> {
        config.validate().map_err(ZooError::Config)?;
        let config = Arc::new(config);

        let mut catalogs: HashMap<EngineId, Arc<dyn Catalog>> = HashMap::new();
        for engine in EngineId::ALL {
            catalogs.insert(engine, Arc::new(StaticCatalog::builtin(engine)));
        }

        Ok(Self {
            registry: EngineRegistry::new(),
            catalogs: RwLock::new(catalogs),
            store: ArtifactStore::new(config),
        })
    }

    /// Register a runtime for its engine identifier.
    pub fn register_engine(&self, engine: Arc<dyn Engine>) {
        self.registry.register(engine);
    }

    pub fn registered_engines(&self) -> Vec<EngineId> {
        self.registry.registered()
    }

    /// Swap the catalog for the catalog's engine. This is the explicit
    /// reload step; catalogs never refresh silently.
    pub fn replace_catalog(&self, catalog: Arc<dyn Catalog>) {
        let engine = catalog.engine();
        self.catalogs.write().insert(engine, catalog);
        info!("replaced {} catalog", engine);
    }

    pub fn catalog(&self, engine: EngineId) -> Arc<dyn Catalog> {
        Arc::clone(
            self.catalogs
                .read()
                .get(&engine)
                .expect("catalogs are populated for every engine"),
        )
    }

    /// Resolve criteria to exactly one model of `engine`'s catalog.
    pub fn resolve(&self, engine: EngineId, criteria: &Criteria) -> Result<ModelReference> {
        let catalog = self.catalog(engine);
        resolver::resolve(catalog.as_ref(), criteria)
    }

    /// Resolve, fetch, and load a model onto the CPU.
    pub async fn load_model(
        &self,
        engine: EngineId,
        criteria: &Criteria,
        progress: Option<&mut dyn Progress>,
    ) -> Result<ZooModel> {
        self.load_model_on(engine, criteria, Device::Cpu, progress).await
    }

    /// Resolve, fetch, and load a model onto `device`.
    ///
    /// The artifact fetch and engine initialization may take a long time;
    /// neither is cancellable once started. Download progress is reported
    /// into `progress` when a sink is supplied.
    pub async fn load_model_on(
        &self,
        engine: EngineId,
        criteria: &Criteria,
        device: Device,
        progress: Option<&mut dyn Progress>,
    ) -> Result<ZooModel> {
        let reference = self.resolve(engine, criteria)?;
        // Fail before any fetch work if no runtime is registered
        let runtime = self.registry.get(engine)?;

        let path = self.store.ensure(&reference.artifact, progress).await?;
        let handle = runtime.load(&path, device)?;
        info!(
            "loaded {} model \"{}\" {} from {:?}",
            engine, reference.name, reference.attributes, path
        );
        Ok(ZooModel::new(reference, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ModelHandle;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use vahana_core::tensor::{Tensor, TensorList};

    const MAGIC: &[u8] = b"VAHZ";

    struct StubHandle {
        live: Arc<AtomicUsize>,
    }

    impl ModelHandle for StubHandle {
        fn infer(&self, inputs: &TensorList) -> Result<TensorList> {
            let input = inputs.single()?;
            Ok(TensorList::from(Tensor::from_vec(
                input.data().iter().take(10).copied().collect(),
            )))
        }
    }

    impl Drop for StubHandle {
        fn drop(&mut self) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    struct StubEngine {
        id: EngineId,
        live: Arc<AtomicUsize>,
    }

    impl Engine for StubEngine {
        fn id(&self) -> EngineId {
            self.id
        }

        fn load(&self, path: &Path, _device: Device) -> Result<Box<dyn ModelHandle>> {
            let bytes = std::fs::read(path)?;
            if !bytes.starts_with(MAGIC) {
                return Err(ZooError::ModelLoad(format!(
                    "invalid weight file magic in {:?}",
                    path
                )));
            }
            self.live.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StubHandle {
                live: Arc::clone(&self.live),
            }))
        }
    }

    fn zoo_in(dir: &TempDir) -> ModelZoo {
        let mut config = ZooConfig::default();
        config.model_dir = dir.path().to_path_buf();
        config.offline = true;
        ModelZoo::new(config).unwrap()
    }

    fn write_builtin_artifact(zoo: &ModelZoo, dir: &TempDir, valid: bool) -> Criteria {
        let criteria = Criteria::new().with("layers", "50").with("dataset", "cifar10");
        let reference = zoo.resolve(EngineId::Builtin, &criteria).unwrap();
        let mut bytes = if valid { MAGIC.to_vec() } else { b"XXXX".to_vec() };
        bytes.resize(2048, 0);
        std::fs::write(dir.path().join(&reference.artifact.file_name), bytes).unwrap();
        criteria
    }

    #[tokio::test]
    async fn test_load_model_happy_path() {
        let dir = TempDir::new().unwrap();
        let zoo = zoo_in(&dir);
        let live = Arc::new(AtomicUsize::new(0));
        zoo.register_engine(Arc::new(StubEngine {
            id: EngineId::Builtin,
            live: Arc::clone(&live),
        }));
        let criteria = write_builtin_artifact(&zoo, &dir, true);

        let model = zoo.load_model(EngineId::Builtin, &criteria, None).await.unwrap();
        assert!(model.is_open());
        assert_eq!(live.load(Ordering::SeqCst), 1);

        model.close().unwrap();
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_load_model_unregistered_engine() {
        let dir = TempDir::new().unwrap();
        let zoo = zoo_in(&dir);
        let criteria = write_builtin_artifact(&zoo, &dir, true);

        let result = zoo.load_model(EngineId::Builtin, &criteria, None).await;
        assert!(matches!(result, Err(ZooError::EngineUnavailable(_))));
    }

    #[tokio::test]
    async fn test_load_model_corrupted_weights() {
        let dir = TempDir::new().unwrap();
        let zoo = zoo_in(&dir);
        let live = Arc::new(AtomicUsize::new(0));
        zoo.register_engine(Arc::new(StubEngine {
            id: EngineId::Builtin,
            live: Arc::clone(&live),
        }));
        let criteria = write_builtin_artifact(&zoo, &dir, false);

        let result = zoo.load_model(EngineId::Builtin, &criteria, None).await;
        assert!(matches!(result, Err(ZooError::ModelLoad(_))));
        // A failed open leaves no live handle behind
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = ZooConfig::default();
        config.max_artifact_bytes = 0;
        assert!(matches!(ModelZoo::new(config), Err(ZooError::Config(_))));
    }

    #[test]
    fn test_replace_catalog_is_visible() {
        let dir = TempDir::new().unwrap();
        let zoo = zoo_in(&dir);
        let replacement = StaticCatalog::from_entries(EngineId::Builtin, vec![]).unwrap();
        zoo.replace_catalog(Arc::new(replacement));

        let criteria = Criteria::new();
        assert!(matches!(
            zoo.resolve(EngineId::Builtin, &criteria),
            Err(ZooError::ModelNotFound { .. })
        ));
    }
}
