//! galvani: resilient model deserialization.
//!
//! Rebuilds a trained model from two separately-stored inputs: an
//! architecture document (layer structure and configuration) and a
//! weight blob (trained parameter arrays addressed by layer name).
//! The two are joined on layer names, and the join is deliberately
//! tolerant: a layer the blob says nothing about keeps its fresh
//! initialization instead of failing the load. Shape disagreements
//! between a stored array and the declared configuration are fatal.
//!
//! ```no_run
//! use galvani::load_model;
//!
//! let model = load_model("small.json", "small.weights")?;
//! assert_eq!(model.layers[0].name, "dense_8");
//! # Ok::<(), galvani::LoadError>(())
//! ```

pub mod arch;
pub mod error;
pub mod io;
pub mod model;
pub mod tensor;

pub use arch::{Activation, ArchitectureDescription, Initializer, LayerKind, LayerSpec};
pub use error::{LoadError, Result};
pub use io::mapping::WeightMapper;
pub use io::{
    LoadReport, WeightBlob, apply_weights, load_model, load_model_checked, load_model_mapped,
    load_model_with, load_weights, save_weights,
};
pub use model::{Layer, Model};
pub use tensor::TensorData;
