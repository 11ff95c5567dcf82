//! Key reconciliation for foreign weight blobs.
//!
//! Blobs written by other tooling, or by an earlier revision of the
//! same model, often key layers under a different naming scheme. The
//! name join in the loader would then silently default every layer. A
//! [`WeightMapper`] rewrites blob keys before assignment so the join
//! can succeed. Transformations apply in the order they are added.
//!
//! ```
//! use galvani::io::WeightBlob;
//! use galvani::io::mapping::WeightMapper;
//!
//! let mapper = WeightMapper::new()
//!     .strip_prefix("model.")
//!     .rename("fc_out", "dense_9");
//! let blob = mapper.map(WeightBlob::new());
//! assert!(blob.is_empty());
//! ```

use super::WeightBlob;

pub type TransformationBox = Box<dyn Fn(&mut WeightBlob)>;

/// Builder for composable weight-blob key transformations.
pub struct WeightMapper {
    transformations: Vec<TransformationBox>,
}

impl WeightMapper {
    /// Create a new empty mapper
    #[must_use]
    pub fn new() -> Self {
        Self {
            transformations: Vec::new(),
        }
    }

    /// Rename a single key
    ///
    /// If the key doesn't exist, this operation is a no-op.
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        let to = to.into();

        self.transformations
            .push(Box::new(move |blob: &mut WeightBlob| {
                if let Some(value) = blob.remove(&from) {
                    blob.insert(to.clone(), value);
                }
            }));
        self
    }

    /// Rename all keys with a given prefix
    ///
    /// Example: `rename_prefix("old_", "new_")` changes "old_fc" to "new_fc"
    pub fn rename_prefix(
        mut self,
        old_prefix: impl Into<String>,
        new_prefix: impl Into<String>,
    ) -> Self {
        let old_prefix = old_prefix.into();
        let new_prefix = new_prefix.into();

        self.transformations
            .push(Box::new(move |blob: &mut WeightBlob| {
                let mut updates = Vec::new();
                for (key, value) in blob.iter() {
                    if let Some(suffix) = key.strip_prefix(&old_prefix) {
                        updates.push((
                            key.clone(),
                            format!("{}{}", new_prefix, suffix),
                            value.clone(),
                        ));
                    }
                }
                for (old_key, new_key, value) in updates {
                    blob.remove(&old_key);
                    blob.insert(new_key, value);
                }
            }));
        self
    }

    /// Strip a prefix from all keys
    ///
    /// Example: `strip_prefix("model.")` changes "model.dense_8" to "dense_8"
    pub fn strip_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();

        self.transformations
            .push(Box::new(move |blob: &mut WeightBlob| {
                let mut updates = Vec::new();
                for (key, value) in blob.iter() {
                    if let Some(stripped) = key.strip_prefix(&prefix) {
                        updates.push((key.clone(), stripped.to_string(), value.clone()));
                    }
                }
                for (old_key, new_key, value) in updates {
                    blob.remove(&old_key);
                    blob.insert(new_key, value);
                }
            }));
        self
    }

    /// Add a prefix to all keys
    ///
    /// Example: `add_prefix("encoder.")` changes "dense_8" to "encoder.dense_8"
    pub fn add_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();

        self.transformations
            .push(Box::new(move |blob: &mut WeightBlob| {
                let mut updates = Vec::new();
                for (key, value) in blob.iter() {
                    updates.push((key.clone(), format!("{}{}", prefix, key), value.clone()));
                }
                for (old_key, new_key, value) in updates {
                    blob.remove(&old_key);
                    blob.insert(new_key, value);
                }
            }));
        self
    }

    /// Exclude specific keys
    ///
    /// The specified keys are removed from the blob.
    #[must_use]
    pub fn exclude_keys(mut self, keys: Vec<String>) -> Self {
        self.transformations
            .push(Box::new(move |blob: &mut WeightBlob| {
                blob.retain(|k, _| !keys.contains(k));
            }));
        self
    }

    /// Apply a custom transformation function
    ///
    /// This allows arbitrary transformations beyond the built-in methods.
    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut WeightBlob) + 'static,
    {
        self.transformations.push(Box::new(f));
        self
    }

    /// Apply all transformations to a blob (in-place)
    pub fn apply(&self, blob: &mut WeightBlob) {
        for transform in &self.transformations {
            transform(blob);
        }
    }

    /// Apply transformations and return the new blob
    #[must_use]
    pub fn map(&self, mut blob: WeightBlob) -> WeightBlob {
        self.apply(&mut blob);
        blob
    }
}

impl Default for WeightMapper {
    fn default() -> Self {
        Self::new()
    }
}
