//! vahana-zoo: uniform multi-engine model zoo
//!
//! Lets a caller pick a backend engine by tag, select a model through
//! declarative criteria, and run a shared image → tensor → ranked-result
//! pipeline. Engine runtimes stay behind the [`Engine`] trait; this
//! crate never performs tensor computation itself.

pub mod artifact;
pub mod catalog;
pub mod criteria;
pub mod engine;
pub mod predictor;
pub mod resolver;
pub mod session;
pub mod translator;
pub mod zoo;

pub use artifact::ArtifactStore;
pub use catalog::{Catalog, ModelArtifact, ModelReference, StaticCatalog};
pub use criteria::{Criteria, EngineId};
pub use engine::{Device, Engine, EngineRegistry, ModelHandle};
pub use predictor::Predictor;
pub use session::ZooModel;
pub use translator::{
    load_labels, ChannelLayout, DetectionTranslator, ImageTranslator, Translator,
};
pub use zoo::ModelZoo;
