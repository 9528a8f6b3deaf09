//! Engine identifiers and model-selection criteria

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The backend runtimes a model can be resolved against. Closed set,
/// known at compile time; runtime bindings are registered separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineId {
    TensorFlow,
    MxNet,
    PyTorch,
    /// The basic built-in zoo
    Builtin,
}

impl EngineId {
    pub const ALL: [EngineId; 4] = [
        EngineId::TensorFlow,
        EngineId::MxNet,
        EngineId::PyTorch,
        EngineId::Builtin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineId::TensorFlow => "tensorflow",
            EngineId::MxNet => "mxnet",
            EngineId::PyTorch => "pytorch",
            EngineId::Builtin => "builtin",
        }
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tensorflow" => Ok(EngineId::TensorFlow),
            "mxnet" => Ok(EngineId::MxNet),
            "pytorch" => Ok(EngineId::PyTorch),
            "builtin" => Ok(EngineId::Builtin),
            other => Err(format!("unknown engine: {}", other)),
        }
    }
}

/// Unordered attribute map that selects a model within an engine's
/// catalog. Resolution requires the criteria to match exactly one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Criteria {
    attributes: BTreeMap<String, String>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute insertion.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// True when every (key, value) pair of these criteria is present in
    /// `attributes`.
    pub fn matches(&self, attributes: &Criteria) -> bool {
        self.iter().all(|(k, v)| attributes.get(k) == Some(v))
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<(String, String)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}
