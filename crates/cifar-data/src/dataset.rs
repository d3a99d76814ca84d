// Dataset trait: the contract every provider and adapter implements

use crate::error::{DataError, Result};

/// A single sample: a pair of (image features, label/target).
///
/// Both are stored as `Vec<f64>` with their associated shapes so a batching
/// framework can stack them into tensors later.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Image pixels, flattened in `[C, H, W]` order.
    pub features: Vec<f64>,
    /// Shape of the feature tensor (`[3, 32, 32]` for CIFAR-10).
    pub feature_shape: Vec<usize>,
    /// Target value(s).  For classification this is a single-element vec
    /// holding the class index, or a one-hot vector after `OneHotEncode`.
    pub target: Vec<f64>,
    /// Shape of the target tensor (`[1]` for a class index, `[10]` for one-hot).
    pub target_shape: Vec<usize>,
}

impl Sample {
    /// The class index, read back from the target.
    ///
    /// Works for both index targets (`[k]`) and one-hot targets.
    pub fn label(&self) -> usize {
        if self.target.len() == 1 {
            return self.target[0] as usize;
        }
        self.target
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, &v)| {
                if v > best.1 {
                    (i, v)
                } else {
                    best
                }
            })
            .0
    }
}

/// An indexed collection of samples.
///
/// Implementations must be `Send + Sync` so a loader can read from several
/// threads at once. Reads never mutate the dataset.
pub trait Dataset: Send + Sync {
    /// Total number of samples.
    fn len(&self) -> usize;

    /// Whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retrieve the sample at position `index`.
    ///
    /// Returns [`DataError::IndexOutOfRange`] if `index >= self.len()`.
    fn get(&self, index: usize) -> Result<Sample>;

    /// The shape of a single feature sample (without batch dim).
    fn feature_shape(&self) -> &[usize];

    /// The shape of a single target sample (without batch dim).
    fn target_shape(&self) -> &[usize];

    /// Optional human-readable name.
    fn name(&self) -> &str {
        "dataset"
    }
}

/// Fail with `IndexOutOfRange` unless `index < len`.
pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(DataError::IndexOutOfRange { index, len })
    }
}
