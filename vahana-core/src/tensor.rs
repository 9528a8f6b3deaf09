//! Opaque tensor containers passed between translators and engines
//!
//! The zoo never performs tensor arithmetic; these types only carry
//! shape-accounted float buffers across the engine boundary.

use crate::error::{Result, ZooError};
use serde::{Deserialize, Serialize};

/// A dense float32 tensor with an explicit shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    /// Create a tensor, validating that the shape matches the buffer length.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let expected = shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .ok_or_else(|| {
                ZooError::ShapeMismatch(format!("shape {:?} overflows element count", shape))
            })?;
        if expected != data.len() {
            return Err(ZooError::ShapeMismatch(format!(
                "shape {:?} implies {} elements, buffer has {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// One-dimensional tensor over the given buffer.
    pub fn from_vec(data: Vec<f32>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Total number of elements.
    pub fn element_count(&self) -> usize {
        self.data.len()
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }
}

/// An ordered list of tensors, as produced by preprocessing and consumed
/// by postprocessing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TensorList(Vec<Tensor>);

impl TensorList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, tensor: Tensor) {
        self.0.push(tensor);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tensor> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Tensor> {
        self.0.get(index)
    }

    /// The single tensor this list is expected to contain.
    pub fn single(&self) -> Result<&Tensor> {
        if self.0.len() != 1 {
            return Err(ZooError::ShapeMismatch(format!(
                "expected exactly 1 output tensor, got {}",
                self.0.len()
            )));
        }
        Ok(&self.0[0])
    }

    /// Consuming variant of [`single`](Self::single).
    pub fn into_single(mut self) -> Result<Tensor> {
        if self.0.len() != 1 {
            return Err(ZooError::ShapeMismatch(format!(
                "expected exactly 1 output tensor, got {}",
                self.0.len()
            )));
        }
        Ok(self.0.pop().expect("length checked above"))
    }
}

impl From<Vec<Tensor>> for TensorList {
    fn from(tensors: Vec<Tensor>) -> Self {
        Self(tensors)
    }
}

impl From<Tensor> for TensorList {
    fn from(tensor: Tensor) -> Self {
        Self(vec![tensor])
    }
}

impl IntoIterator for TensorList {
    type Item = Tensor;
    type IntoIter = std::vec::IntoIter<Tensor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
