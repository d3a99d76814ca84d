// LabeledImageDataset: class metadata plus an optional length limit over a provider

use tracing::{debug, info};

use crate::cifar10::{Cifar10Provider, CLASS_NAMES, NUM_CLASSES};
use crate::config::Cifar10Config;
use crate::dataset::{check_index, Dataset, Sample};
use crate::error::Result;

/// A fixed-label image dataset exposing at most `num_samples` samples of the
/// wrapped provider.
///
/// The provider does all loading and transformation; this type only fixes
/// the visible length at construction and bounds-checks reads. Indices map
/// one-to-one onto the provider, so the visible samples are its prefix.
///
/// # Example
/// ```ignore
/// let ds = LabeledImageDataset::open(Cifar10Config::new("data").num_samples(100))?;
/// assert_eq!(ds.len(), 100);
/// let sample = ds.get(99)?;
/// println!("{}", ds.class_name(sample.label()).unwrap());
/// ```
#[derive(Debug)]
pub struct LabeledImageDataset<P: Dataset = Cifar10Provider> {
    provider: P,
    num_samples: usize,
}

impl LabeledImageDataset<Cifar10Provider> {
    /// Load CIFAR-10 as described by `config`.
    ///
    /// Downloads into `config.root` first when allowed and needed.
    pub fn open(config: Cifar10Config) -> Result<Self> {
        let limit = config.num_samples;
        let provider = Cifar10Provider::from_config(config)?;
        Ok(Self::new(provider, limit))
    }
}

impl<P: Dataset> LabeledImageDataset<P> {
    /// Wrap `provider`, exposing `min(limit, provider.len())` samples, or all
    /// of them when `limit` is `None`.
    pub fn new(provider: P, limit: Option<usize>) -> Self {
        let available = provider.len();
        let num_samples = match limit {
            Some(n) => n.min(available),
            None => available,
        };
        if num_samples < available {
            info!(
                provider = provider.name(),
                available, num_samples, "limiting dataset"
            );
        } else {
            debug!(provider = provider.name(), num_samples, "using full dataset");
        }
        Self {
            provider,
            num_samples,
        }
    }

    /// The ten class labels, indexed by label value.
    pub fn class_names(&self) -> &'static [&'static str] {
        &CLASS_NAMES
    }

    pub fn num_classes(&self) -> usize {
        NUM_CLASSES
    }

    /// Label name for a class index.
    pub fn class_name(&self, label: usize) -> Option<&'static str> {
        CLASS_NAMES.get(label).copied()
    }

    /// Class index for a label name.
    pub fn class_index(&self, name: &str) -> Option<usize> {
        CLASS_NAMES.iter().position(|&c| c == name)
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Unwrap, returning the provider.
    pub fn into_inner(self) -> P {
        self.provider
    }
}

impl<P: Dataset> Dataset for LabeledImageDataset<P> {
    fn len(&self) -> usize {
        self.num_samples
    }

    fn get(&self, index: usize) -> Result<Sample> {
        check_index(index, self.num_samples)?;
        self.provider.get(index)
    }

    fn feature_shape(&self) -> &[usize] {
        self.provider.feature_shape()
    }

    fn target_shape(&self) -> &[usize] {
        self.provider.target_shape()
    }

    fn name(&self) -> &str {
        self.provider.name()
    }
}
