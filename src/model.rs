//! The reconstructed model: an ordered, exclusively-owned layer list.
//!
//! A `Model` is built in two steps. `Model::from_architecture` mirrors
//! the document exactly (same layer order, same names) with every
//! parameter freshly initialized. Weight assignment then overwrites
//! parameters layer by layer, checking each stored array against the
//! shape the configuration implies.

use crate::arch::{ArchitectureDescription, LayerKind};
use crate::error::{LoadError, Result};
use crate::io::WeightBlob;
use crate::tensor::TensorData;

/// A named, configured processing unit: structure from the
/// architecture document, parameters from the weight blob (or fresh
/// initialization when the blob has no entry for it).
#[derive(Debug, Clone)]
pub struct Layer {
    pub name: String,
    pub config: LayerKind,
    pub params: Vec<TensorData>,
    /// Feature shape this layer produces, batch dimension excluded.
    pub output_shape: Vec<usize>,
}

impl Layer {
    /// Replace this layer's parameters with stored arrays.
    ///
    /// The arrays must agree with the declared configuration in count
    /// and shape; the count check reports the first index where one
    /// side has no counterpart.
    pub fn assign(&mut self, stored: &[TensorData]) -> Result<()> {
        if stored.len() != self.params.len() {
            let index = stored.len().min(self.params.len());
            return Err(LoadError::ShapeMismatch {
                layer: self.name.clone(),
                index,
                expected: self
                    .params
                    .get(index)
                    .map(|p| p.shape.clone())
                    .unwrap_or_default(),
                actual: stored
                    .get(index)
                    .map(|p| p.shape.clone())
                    .unwrap_or_default(),
            });
        }
        for (index, (have, want)) in stored.iter().zip(&self.params).enumerate() {
            if have.shape != want.shape {
                return Err(LoadError::ShapeMismatch {
                    layer: self.name.clone(),
                    index,
                    expected: want.shape.clone(),
                    actual: have.shape.clone(),
                });
            }
            if have.data.len() != have.numel() {
                return Err(LoadError::MalformedWeights(format!(
                    "layer \"{}\" parameter {}: {} values for shape {:?}",
                    self.name,
                    index,
                    have.data.len(),
                    have.shape
                )));
            }
        }
        self.params = stored.to_vec();
        Ok(())
    }

    /// Total number of parameter values in this layer.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.iter().map(TensorData::numel).sum()
    }
}

/// An ordered sequence of layers reconstructed from an architecture
/// document. Owns its layers outright; the inputs it was built from
/// may be discarded.
#[derive(Debug, Clone)]
pub struct Model {
    pub name: Option<String>,
    pub layers: Vec<Layer>,
}

impl Model {
    /// Build an uninitialized model mirroring the architecture: same
    /// layer order, same names, freshly-initialized parameters.
    ///
    /// Fails when the document violates its invariants (duplicate
    /// names, bad configuration) or when a layer's parameter shapes
    /// cannot be inferred from the input shape.
    pub fn from_architecture(arch: &ArchitectureDescription) -> Result<Self> {
        arch.validate()?;

        let mut layers = Vec::with_capacity(arch.layers.len());
        let mut feature_shape = arch.input_shape.clone();
        for spec in &arch.layers {
            let Some(next) = spec.kind.output_shape(&feature_shape) else {
                return Err(LoadError::MalformedArchitecture(format!(
                    "layer \"{}\" ({}) has no known input dimension",
                    spec.name,
                    spec.kind.tag()
                )));
            };
            layers.push(Layer {
                name: spec.name.clone(),
                config: spec.kind.clone(),
                params: spec.kind.init_params(&feature_shape),
                output_shape: next.clone(),
            });
            feature_shape = next;
        }

        Ok(Model {
            name: arch.name.clone(),
            layers,
        })
    }

    /// Layer names in order.
    #[must_use]
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name.as_str()).collect()
    }

    /// Look a layer up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Export the model's current parameters as a weight blob.
    ///
    /// Parameterless layers contribute no entry.
    #[must_use]
    pub fn weights(&self) -> WeightBlob {
        let mut blob = WeightBlob::new();
        for layer in &self.layers {
            if !layer.params.is_empty() {
                blob.insert(layer.name.clone(), layer.params.clone());
            }
        }
        blob
    }

    /// Total number of parameter values across all layers.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.layers.iter().map(Layer::param_count).sum()
    }

    /// Per-layer table: name, kind, output shape, parameter count.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        if let Some(name) = &self.name {
            out.push_str(&format!("Model: {}\n", name));
        }
        out.push_str(&format!(
            "{:<24} {:<12} {:<16} {}\n",
            "Layer", "Kind", "Output shape", "Params"
        ));
        for layer in &self.layers {
            out.push_str(&format!(
                "{:<24} {:<12} {:<16} {}\n",
                layer.name,
                layer.config.tag(),
                format!("{:?}", layer.output_shape),
                layer.param_count()
            ));
        }
        out.push_str(&format!("Total params: {}\n", self.param_count()));
        out
    }
}
