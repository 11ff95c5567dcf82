//! Serializable parameter arrays.
//!
//! A model's trained state is a set of flat f32 buffers tagged with a
//! shape. `TensorData` is that representation: it is what weight blobs
//! store on disk and what layers carry in memory. The constructors
//! cover the initialization schemes used when a layer has no stored
//! weights to load.

use bincode::{Decode, Encode};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// A parameter array: flat values in row-major order plus the
/// dimensional signature checked during weight assignment.
#[derive(Encode, Decode, Clone, PartialEq)]
pub struct TensorData {
    pub data: Vec<f32>,
    pub shape: Vec<usize>,
}

impl std::fmt::Debug for TensorData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorData")
            .field("shape", &self.shape)
            .field("len", &self.data.len())
            .finish()
    }
}

impl TensorData {
    /// Create a parameter array from data and shape.
    ///
    /// # Panics
    /// Panics if data.len() != shape.product()
    pub fn new(data: Vec<f32>, shape: &[usize]) -> Self {
        assert_eq!(
            data.len(),
            shape.iter().product::<usize>(),
            "Data length must match shape"
        );
        TensorData {
            data,
            shape: shape.to_vec(),
        }
    }

    /// Create a parameter array filled with zeros
    pub fn zeros(shape: &[usize]) -> Self {
        let size = shape.iter().product();
        Self::new(vec![0.0; size], shape)
    }

    /// Uniform samples from [-limit, limit]
    pub fn uniform(shape: &[usize], limit: f32) -> Self {
        let size = shape.iter().product();
        let mut rng = rand::rng();
        let data: Vec<f32> = (0..size).map(|_| rng.random_range(-limit..limit)).collect();
        Self::new(data, shape)
    }

    /// Glorot/Xavier uniform initialization
    ///
    /// Samples weights uniformly from [-limit, limit] where
    /// limit = sqrt(6 / (fan_in + fan_out))
    pub fn glorot_uniform(shape: &[usize]) -> Self {
        let fan_in = shape.first().copied().unwrap_or(1);
        let fan_out = shape.last().copied().unwrap_or(1);
        let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
        Self::uniform(shape, limit)
    }

    /// He normal initialization: samples from N(0, sqrt(2 / fan_in)).
    ///
    /// Suited to layers feeding rectified activations.
    pub fn he_normal(shape: &[usize]) -> Self {
        let fan_in = shape.first().copied().unwrap_or(1).max(1);
        let normal = Normal::new(0.0, (2.0 / fan_in as f32).sqrt()).unwrap();
        let mut rng = rand::rng();
        let size = shape.iter().product();
        let data: Vec<f32> = (0..size).map(|_| normal.sample(&mut rng)).collect();
        Self::new(data, shape)
    }

    /// Number of elements implied by the shape
    #[must_use]
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        let t = TensorData::new(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]);
        assert_eq!(t.numel(), 4);

        let result = std::panic::catch_unwind(|| TensorData::new(vec![1.0], &[2, 2]));
        assert!(result.is_err());
    }

    #[test]
    fn test_zeros() {
        let t = TensorData::zeros(&[3, 2]);
        assert_eq!(t.shape, vec![3, 2]);
        assert!(t.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_glorot_uniform_within_limit() {
        let t = TensorData::glorot_uniform(&[4, 8]);
        let limit = (6.0f32 / 12.0).sqrt();
        assert_eq!(t.data.len(), 32);
        assert!(t.data.iter().all(|&v| v.abs() <= limit));
    }

    #[test]
    fn test_he_normal_shape() {
        let t = TensorData::he_normal(&[16, 4]);
        assert_eq!(t.shape, vec![16, 4]);
        assert_eq!(t.data.len(), 64);
    }
}
