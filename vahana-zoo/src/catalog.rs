//! Model catalogs and the descriptors resolution produces

use crate::criteria::{Criteria, EngineId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use vahana_core::error::{Result, ZooError};

/// Built-in artifact locations, one resnet variant per engine zoo.
/// Note: These are example URLs. In production, point catalogs at a
/// verified model repository.
const TF_RESNET50_IMAGENET_URL: &str =
    "https://models.vahana.dev/tensorflow/resnet50_v1_imagenet.pb";
const MX_RESNET50_CIFAR10_URL: &str =
    "https://models.vahana.dev/mxnet/resnet50_v1_cifar10.params";
const PT_RESNET50_IMAGENET_URL: &str =
    "https://models.vahana.dev/pytorch/resnet50_imagenet.pt";
const BUILTIN_RESNET50_CIFAR10_URL: &str =
    "https://models.vahana.dev/builtin/resnet50_cifar10.bin";

/// CIFAR-10 class names (10 classes)
pub const CIFAR10_CLASSES: &[&str] = &[
    "airplane",
    "automobile",
    "bird",
    "cat",
    "deer",
    "dog",
    "frog",
    "horse",
    "ship",
    "truck",
];

/// Where a model's weights live and how to verify them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// File name within the cache directory
    pub file_name: String,
    /// HTTPS download location
    pub url: String,
    /// Optional lowercase hex sha256 of the artifact
    pub sha256: Option<String>,
}

/// Immutable descriptor returned by criteria resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReference {
    pub engine: EngineId,
    pub name: String,
    pub attributes: Criteria,
    pub artifact: ModelArtifact,
    /// Position-indexed class labels for this model's output
    pub labels: Vec<String>,
}

/// Queryable set of models for one engine. The only capability the
/// façade requires from a catalog source.
pub trait Catalog: Send + Sync {
    fn engine(&self) -> EngineId;

    /// Attribute names this catalog recognizes in criteria.
    fn attribute_names(&self) -> &BTreeSet<String>;

    /// All entries matching every (key, value) pair in `criteria`.
    fn lookup(&self, criteria: &Criteria) -> Vec<&ModelReference>;
}

/// In-memory catalog, immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticCatalog {
    engine: EngineId,
    #[serde(skip)]
    attribute_names: BTreeSet<String>,
    entries: Vec<ModelReference>,
}

impl StaticCatalog {
    pub fn from_entries(engine: EngineId, entries: Vec<ModelReference>) -> Result<Self> {
        for entry in &entries {
            if entry.engine != engine {
                return Err(ZooError::Config(format!(
                    "catalog for {} contains entry \"{}\" for engine {}",
                    engine, entry.name, entry.engine
                )));
            }
        }
        let attribute_names = entries
            .iter()
            .flat_map(|e| e.attributes.keys().map(String::from))
            .collect();
        Ok(Self {
            engine,
            attribute_names,
            entries,
        })
    }

    /// Deserialize a catalog document. The attribute-name set is derived
    /// from the entries rather than trusted from the document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let parsed: StaticCatalog = serde_json::from_str(json)
            .map_err(|e| ZooError::Config(format!("invalid catalog document: {}", e)))?;
        Self::from_entries(parsed.engine, parsed.entries)
    }

    pub fn entries(&self) -> &[ModelReference] {
        &self.entries
    }

    /// The built-in catalog for an engine: the resnet image-classification
    /// entries each zoo ships with.
    pub fn builtin(engine: EngineId) -> Self {
        let entries = match engine {
            EngineId::TensorFlow => vec![resnet_entry(
                engine,
                Criteria::new().with("layers", "50").with("dataset", "imagenet"),
                TF_RESNET50_IMAGENET_URL,
                "resnet50_v1_imagenet.pb",
                imagenet_labels(),
            )],
            EngineId::MxNet => vec![resnet_entry(
                engine,
                Criteria::new()
                    .with("layers", "50")
                    .with("flavor", "v1")
                    .with("dataset", "cifar10"),
                MX_RESNET50_CIFAR10_URL,
                "resnet50_v1_cifar10.params",
                cifar10_labels(),
            )],
            EngineId::PyTorch => vec![resnet_entry(
                engine,
                Criteria::new().with("layers", "50").with("dataset", "imagenet"),
                PT_RESNET50_IMAGENET_URL,
                "resnet50_imagenet.pt",
                imagenet_labels(),
            )],
            EngineId::Builtin => vec![resnet_entry(
                engine,
                Criteria::new().with("layers", "50").with("dataset", "cifar10"),
                BUILTIN_RESNET50_CIFAR10_URL,
                "resnet50_cifar10.bin",
                cifar10_labels(),
            )],
        };
        let attribute_names = entries
            .iter()
            .flat_map(|e| e.attributes.keys().map(String::from))
            .collect();
        Self {
            engine,
            attribute_names,
            entries,
        }
    }
}

impl Catalog for StaticCatalog {
    fn engine(&self) -> EngineId {
        self.engine
    }

    fn attribute_names(&self) -> &BTreeSet<String> {
        &self.attribute_names
    }

    fn lookup(&self, criteria: &Criteria) -> Vec<&ModelReference> {
        self.entries
            .iter()
            .filter(|entry| criteria.matches(&entry.attributes))
            .collect()
    }
}

fn resnet_entry(
    engine: EngineId,
    attributes: Criteria,
    url: &str,
    file_name: &str,
    labels: Vec<String>,
) -> ModelReference {
    ModelReference {
        engine,
        name: "resnet".to_string(),
        attributes,
        artifact: ModelArtifact {
            file_name: file_name.to_string(),
            url: url.to_string(),
            sha256: None,
        },
        labels,
    }
}

pub fn cifar10_labels() -> Vec<String> {
    CIFAR10_CLASSES.iter().map(|s| s.to_string()).collect()
}

/// ImageNet entries carry numeric synset positions; human-readable names
/// come from a separate labels file when the caller supplies one.
pub fn imagenet_labels() -> Vec<String> {
    (0..1000).map(|i| i.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalogs_cover_all_engines() {
        for engine in EngineId::ALL {
            let catalog = StaticCatalog::builtin(engine);
            assert_eq!(catalog.engine(), engine);
            assert!(!catalog.entries().is_empty());
        }
    }

    #[test]
    fn test_attribute_names_derived_from_entries() {
        let catalog = StaticCatalog::builtin(EngineId::MxNet);
        let names = catalog.attribute_names();
        assert!(names.contains("layers"));
        assert!(names.contains("flavor"));
        assert!(names.contains("dataset"));
    }

    #[test]
    fn test_lookup_filters_by_all_pairs() {
        let catalog = StaticCatalog::builtin(EngineId::Builtin);
        let hit = catalog.lookup(&Criteria::new().with("layers", "50").with("dataset", "cifar10"));
        assert_eq!(hit.len(), 1);
        let miss =
            catalog.lookup(&Criteria::new().with("layers", "50").with("dataset", "imagenet"));
        assert!(miss.is_empty());
    }

    #[test]
    fn test_from_entries_rejects_foreign_engine() {
        let entry = resnet_entry(
            EngineId::MxNet,
            Criteria::new().with("layers", "18"),
            "https://models.vahana.dev/mxnet/resnet18.params",
            "resnet18.params",
            cifar10_labels(),
        );
        let result = StaticCatalog::from_entries(EngineId::Builtin, vec![entry]);
        assert!(matches!(result, Err(ZooError::Config(_))));
    }

    #[test]
    fn test_catalog_json_round_trip() {
        let catalog = StaticCatalog::builtin(EngineId::Builtin);
        let json = serde_json::to_string(&catalog).unwrap();
        let back = StaticCatalog::from_json_str(&json).unwrap();
        assert_eq!(back.engine(), EngineId::Builtin);
        assert_eq!(back.entries(), catalog.entries());
        assert_eq!(back.attribute_names(), catalog.attribute_names());
    }
}
