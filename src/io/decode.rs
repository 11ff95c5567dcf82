//! Pluggable on-disk formats.
//!
//! The loader's semantics do not depend on how either input is
//! encoded, so both formats sit behind a trait. The defaults are a
//! UTF-8 JSON document for the architecture and a bincode container
//! for the weights; a different container slots in without touching
//! the join logic.

use bincode::config;

use super::WeightBlob;
use crate::arch::ArchitectureDescription;
use crate::error::{LoadError, Result};

/// Decodes an architecture document from raw bytes.
///
/// Implementations must return a description that passes
/// [`ArchitectureDescription::validate`]; an invariant violation is a
/// malformed document, not a loader concern.
pub trait ArchitectureDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<ArchitectureDescription>;
}

/// Decodes a weight container from raw bytes.
pub trait WeightDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<WeightBlob>;
}

/// Default document format: UTF-8 JSON.
pub struct JsonArchitecture;

impl ArchitectureDecoder for JsonArchitecture {
    fn decode(&self, bytes: &[u8]) -> Result<ArchitectureDescription> {
        let arch: ArchitectureDescription = serde_json::from_slice(bytes)
            .map_err(|e| LoadError::MalformedArchitecture(e.to_string()))?;
        arch.validate()?;
        Ok(arch)
    }
}

/// Default weight container: bincode with the standard configuration.
pub struct BincodeWeights;

impl WeightDecoder for BincodeWeights {
    fn decode(&self, bytes: &[u8]) -> Result<WeightBlob> {
        let (blob, _) = bincode::decode_from_slice(bytes, config::standard())
            .map_err(|e| LoadError::MalformedWeights(e.to_string()))?;
        Ok(blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_decoder_rejects_garbage() {
        let err = JsonArchitecture.decode(b"definitely not json").unwrap_err();
        assert!(matches!(err, LoadError::MalformedArchitecture(_)));
    }

    #[test]
    fn test_json_decoder_rejects_wrong_shape() {
        // Valid JSON, wrong structure.
        let err = JsonArchitecture.decode(br#"{"layers": 3}"#).unwrap_err();
        assert!(matches!(err, LoadError::MalformedArchitecture(_)));
    }

    #[test]
    fn test_json_decoder_enforces_invariants() {
        let doc = br#"{
            "input_shape": [2],
            "layers": [
                { "name": "fc", "kind": "dense", "units": 3 },
                { "name": "fc", "kind": "dense", "units": 1 }
            ]
        }"#;
        let err = JsonArchitecture.decode(doc).unwrap_err();
        assert!(matches!(err, LoadError::MalformedArchitecture(_)));
    }

    #[test]
    fn test_bincode_decoder_rejects_garbage() {
        let err = BincodeWeights
            .decode(b"definitely not a weight blob")
            .unwrap_err();
        assert!(matches!(err, LoadError::MalformedWeights(_)));
    }
}
