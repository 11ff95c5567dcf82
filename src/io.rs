//! Loading and saving: the resilient deserialization entry points.
//!
//! A model is stored as two separate artifacts: an architecture
//! document describing the layer sequence, and a weight blob holding
//! trained parameter arrays keyed by layer name. [`load_model`] joins
//! the two on layer names. The join is deliberately tolerant: a layer
//! the blob says nothing about keeps its fresh initialization, so an
//! architecture revision that adds layers can still load an older
//! blob. Shape disagreements are never tolerated.

pub mod decode;
pub mod mapping;

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{LoadError, Result};
use crate::model::Model;
use crate::tensor::TensorData;
use self::decode::{ArchitectureDecoder, BincodeWeights, JsonArchitecture, WeightDecoder};
use self::mapping::WeightMapper;

/// Weight blob: trained parameter arrays addressed by layer name, each
/// entry holding that layer's arrays in declaration order (kernel
/// before bias).
pub type WeightBlob = BTreeMap<String, Vec<TensorData>>;

/// What a tolerant load had to work around.
///
/// `load_model` succeeds in all the situations reported here; the
/// report exists so tooling can tell a clean load from one that fell
/// back to fresh parameters somewhere.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Parameterized layers with no blob entry, left freshly initialized.
    pub defaulted_layers: Vec<String>,
    /// Blob entries that matched no layer name.
    pub unexpected_keys: Vec<String>,
}

impl LoadReport {
    /// Returns true if every parameterized layer was covered and every
    /// blob key matched a layer.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.defaulted_layers.is_empty() && self.unexpected_keys.is_empty()
    }
}

// Missing and unreadable inputs surface as NotFound; failures after a
// successful open stay Io.
fn read_source(path: &Path) -> Result<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
            Err(LoadError::NotFound {
                path: path.to_path_buf(),
                source: e,
            })
        }
        Err(e) => Err(LoadError::Io(e)),
    }
}

/// Reconstruct a model from an architecture document and a weight blob.
///
/// On success, `model.layers[i].name` equals the i-th layer name of the
/// document for every `i`. Layers the blob has no entry for keep their
/// freshly-initialized parameters; partial weight coverage is the
/// point of this loader, not an error. A stored array whose shape
/// disagrees with the layer's configuration fails the whole load.
pub fn load_model(
    architecture: impl AsRef<Path>,
    weights: impl AsRef<Path>,
) -> Result<Model> {
    let (model, _) = load_model_with(architecture, weights, &JsonArchitecture, &BincodeWeights)?;
    Ok(model)
}

/// Like [`load_model`], but also reports which layers fell back to
/// fresh parameters and which blob keys matched nothing.
pub fn load_model_checked(
    architecture: impl AsRef<Path>,
    weights: impl AsRef<Path>,
) -> Result<(Model, LoadReport)> {
    load_model_with(architecture, weights, &JsonArchitecture, &BincodeWeights)
}

/// Format-pluggable variant: the caller chooses how both inputs are
/// decoded. Loader semantics are identical under every decoder pair.
pub fn load_model_with(
    architecture: impl AsRef<Path>,
    weights: impl AsRef<Path>,
    architecture_decoder: &dyn ArchitectureDecoder,
    weight_decoder: &dyn WeightDecoder,
) -> Result<(Model, LoadReport)> {
    let arch_bytes = read_source(architecture.as_ref())?;
    let arch = architecture_decoder.decode(&arch_bytes)?;
    let mut model = Model::from_architecture(&arch)?;

    let weight_bytes = read_source(weights.as_ref())?;
    let blob = weight_decoder.decode(&weight_bytes)?;

    let report = apply_weights(&mut model, &blob)?;
    Ok((model, report))
}

/// Load with a key-mapping step between decode and assignment, for
/// blobs produced under a different naming scheme.
pub fn load_model_mapped(
    architecture: impl AsRef<Path>,
    weights: impl AsRef<Path>,
    mapper: &WeightMapper,
) -> Result<(Model, LoadReport)> {
    let arch_bytes = read_source(architecture.as_ref())?;
    let arch = JsonArchitecture.decode(&arch_bytes)?;
    let mut model = Model::from_architecture(&arch)?;

    let weight_bytes = read_source(weights.as_ref())?;
    let blob = mapper.map(BincodeWeights.decode(&weight_bytes)?);

    let report = apply_weights(&mut model, &blob)?;
    Ok((model, report))
}

/// Assign blob entries onto an already-built model, tolerantly.
///
/// Layers without a blob entry keep their current parameters; only
/// parameterized layers count as defaulted in the report.
pub fn apply_weights(model: &mut Model, blob: &WeightBlob) -> Result<LoadReport> {
    let mut report = LoadReport::default();
    for layer in &mut model.layers {
        match blob.get(&layer.name) {
            Some(stored) => layer.assign(stored)?,
            None => {
                if !layer.params.is_empty() {
                    report.defaulted_layers.push(layer.name.clone());
                }
            }
        }
    }
    for key in blob.keys() {
        if model.get(key).is_none() {
            report.unexpected_keys.push(key.clone());
        }
    }
    Ok(report)
}

/// Write a weight blob with the standard binary encoding.
pub fn save_weights(blob: &WeightBlob, path: impl AsRef<Path>) -> Result<()> {
    let encoded = bincode::encode_to_vec(blob, bincode::config::standard())
        .map_err(std::io::Error::other)?;
    fs::write(path, encoded)?;
    Ok(())
}

/// Read a weight blob back from disk.
pub fn load_weights(path: impl AsRef<Path>) -> Result<WeightBlob> {
    let bytes = read_source(path.as_ref())?;
    BincodeWeights.decode(&bytes)
}
