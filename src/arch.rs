//! Architecture descriptions.
//!
//! An architecture document declares a model's layers and their
//! configuration, independent of any trained parameter values. It is
//! parsed once at load time and immutable afterwards; the weight blob
//! is joined against it by layer name.
//!
//! The document shape is deliberately small: a model name, an input
//! feature shape (batch dimension excluded), and an ordered list of
//! layer declarations. Layer names must be unique; they are the join
//! key for weight assignment.

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, Result};
use crate::tensor::TensorData;

/// Activation functions recognized in layer configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
    Linear,
}

impl Activation {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Activation::Relu => "relu",
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::Softmax => "softmax",
            Activation::Linear => "linear",
        }
    }
}

/// Initialization schemes for parameters that have no stored weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Initializer {
    #[default]
    GlorotUniform,
    HeNormal,
    RandomUniform,
    Zeros,
}

impl Initializer {
    /// Produce a freshly-initialized parameter array of the given shape.
    pub fn init(&self, shape: &[usize]) -> TensorData {
        match self {
            Initializer::GlorotUniform => TensorData::glorot_uniform(shape),
            Initializer::HeNormal => TensorData::he_normal(shape),
            Initializer::RandomUniform => TensorData::uniform(shape, 0.05),
            Initializer::Zeros => TensorData::zeros(shape),
        }
    }
}

/// Kind-specific layer configuration.
///
/// The serialized form carries the kind tag inline, so a dense layer
/// reads as `{"name": "dense_8", "kind": "dense", "units": 16}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerKind {
    /// Fully-connected layer: kernel [in, units], optional bias [units].
    Dense {
        units: usize,
        #[serde(default = "default_use_bias")]
        use_bias: bool,
        #[serde(default)]
        activation: Option<Activation>,
        #[serde(default)]
        initializer: Initializer,
    },
    /// Index-to-vector lookup table [input_dim, output_dim].
    Embedding { input_dim: usize, output_dim: usize },
    /// Standalone activation, shape-preserving, parameterless.
    Activation { function: Activation },
    /// Dropout marker. Parameterless; rate must lie in [0, 1].
    Dropout { rate: f32 },
    /// Collapses the feature shape to its product.
    Flatten,
}

fn default_use_bias() -> bool {
    true
}

impl LayerKind {
    /// The kind tag as it appears in the document encoding.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            LayerKind::Dense { .. } => "dense",
            LayerKind::Embedding { .. } => "embedding",
            LayerKind::Activation { .. } => "activation",
            LayerKind::Dropout { .. } => "dropout",
            LayerKind::Flatten => "flatten",
        }
    }

    /// Output feature shape for a given input feature shape.
    ///
    /// Returns `None` when the configuration cannot determine its
    /// parameter shapes from the input (a dense layer with no known
    /// input dimension).
    pub fn output_shape(&self, input: &[usize]) -> Option<Vec<usize>> {
        match self {
            LayerKind::Dense { units, .. } => {
                let mut out = input.to_vec();
                let last = out.last_mut()?;
                *last = *units;
                Some(out)
            }
            LayerKind::Embedding { output_dim, .. } => {
                let mut out = input.to_vec();
                out.push(*output_dim);
                Some(out)
            }
            LayerKind::Activation { .. } | LayerKind::Dropout { .. } => Some(input.to_vec()),
            LayerKind::Flatten => Some(vec![input.iter().product()]),
        }
    }

    /// Freshly-initialized parameters for this configuration, in
    /// declaration order (kernel before bias).
    pub fn init_params(&self, input: &[usize]) -> Vec<TensorData> {
        match self {
            LayerKind::Dense {
                units,
                use_bias,
                initializer,
                ..
            } => {
                let in_features = input.last().copied().unwrap_or(0);
                let mut params = vec![initializer.init(&[in_features, *units])];
                if *use_bias {
                    params.push(TensorData::zeros(&[*units]));
                }
                params
            }
            LayerKind::Embedding {
                input_dim,
                output_dim,
            } => vec![TensorData::uniform(&[*input_dim, *output_dim], 0.1)],
            _ => vec![],
        }
    }
}

/// A single layer declaration: a unique name plus its configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: LayerKind,
}

/// An ordered sequence of layer declarations, read once from an
/// external document at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureDescription {
    #[serde(default)]
    pub name: Option<String>,
    /// Feature shape of the model input, batch dimension excluded.
    #[serde(default)]
    pub input_shape: Vec<usize>,
    pub layers: Vec<LayerSpec>,
}

impl ArchitectureDescription {
    /// Check structural invariants: non-empty unique layer names and
    /// well-formed per-layer configuration.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for spec in &self.layers {
            if spec.name.is_empty() {
                return Err(LoadError::MalformedArchitecture(
                    "layer with empty name".to_string(),
                ));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(LoadError::MalformedArchitecture(format!(
                    "duplicate layer name \"{}\"",
                    spec.name
                )));
            }
            if let LayerKind::Dropout { rate } = spec.kind
                && !(0.0..=1.0).contains(&rate)
            {
                return Err(LoadError::MalformedArchitecture(format!(
                    "layer \"{}\": dropout rate {} outside [0, 1]",
                    spec.name, rate
                )));
            }
        }
        Ok(())
    }

    /// Layer names in declaration order.
    #[must_use]
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense(name: &str, units: usize) -> LayerSpec {
        LayerSpec {
            name: name.to_string(),
            kind: LayerKind::Dense {
                units,
                use_bias: true,
                activation: None,
                initializer: Initializer::default(),
            },
        }
    }

    #[test]
    fn test_parse_simple_document() {
        let doc = r#"{
            "name": "small",
            "input_shape": [4],
            "layers": [
                { "name": "dense_8", "kind": "dense", "units": 3, "activation": "relu" },
                { "name": "dropout_1", "kind": "dropout", "rate": 0.25 },
                { "name": "dense_9", "kind": "dense", "units": 1 }
            ]
        }"#;

        let arch: ArchitectureDescription = serde_json::from_str(doc).unwrap();
        assert_eq!(arch.name.as_deref(), Some("small"));
        assert_eq!(arch.layer_names(), vec!["dense_8", "dropout_1", "dense_9"]);

        // Defaults fill in for omitted dense fields.
        match &arch.layers[2].kind {
            LayerKind::Dense {
                units,
                use_bias,
                activation,
                initializer,
            } => {
                assert_eq!(*units, 1);
                assert!(use_bias);
                assert!(activation.is_none());
                assert_eq!(*initializer, Initializer::GlorotUniform);
            }
            other => panic!("expected dense, got {}", other.tag()),
        }
    }

    #[test]
    fn test_document_round_trip() {
        let arch = ArchitectureDescription {
            name: Some("roundtrip".to_string()),
            input_shape: vec![8],
            layers: vec![
                dense("fc1", 4),
                LayerSpec {
                    name: "act".to_string(),
                    kind: LayerKind::Activation {
                        function: Activation::Tanh,
                    },
                },
            ],
        };

        let encoded = serde_json::to_string(&arch).unwrap();
        let decoded: ArchitectureDescription = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, arch);
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let arch = ArchitectureDescription {
            name: None,
            input_shape: vec![2],
            layers: vec![dense("fc", 3), dense("fc", 1)],
        };
        assert!(matches!(
            arch.validate(),
            Err(LoadError::MalformedArchitecture(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_dropout_rate() {
        let arch = ArchitectureDescription {
            name: None,
            input_shape: vec![2],
            layers: vec![LayerSpec {
                name: "drop".to_string(),
                kind: LayerKind::Dropout { rate: 1.5 },
            }],
        };
        assert!(arch.validate().is_err());
    }

    #[test]
    fn test_output_shape_chain() {
        let embed = LayerKind::Embedding {
            input_dim: 100,
            output_dim: 16,
        };
        let flat = LayerKind::Flatten;
        let dense = LayerKind::Dense {
            units: 4,
            use_bias: true,
            activation: None,
            initializer: Initializer::default(),
        };

        let s1 = embed.output_shape(&[10]).unwrap();
        assert_eq!(s1, vec![10, 16]);
        let s2 = flat.output_shape(&s1).unwrap();
        assert_eq!(s2, vec![160]);
        let s3 = dense.output_shape(&s2).unwrap();
        assert_eq!(s3, vec![4]);
    }

    #[test]
    fn test_dense_needs_input_dimension() {
        let dense = LayerKind::Dense {
            units: 4,
            use_bias: true,
            activation: None,
            initializer: Initializer::default(),
        };
        assert!(dense.output_shape(&[]).is_none());
    }

    #[test]
    fn test_init_params_shapes() {
        let dense = LayerKind::Dense {
            units: 3,
            use_bias: true,
            activation: None,
            initializer: Initializer::Zeros,
        };
        let params = dense.init_params(&[4]);
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].shape, vec![4, 3]);
        assert_eq!(params[1].shape, vec![3]);

        let drop = LayerKind::Dropout { rate: 0.5 };
        assert!(drop.init_params(&[4]).is_empty());
    }
}
