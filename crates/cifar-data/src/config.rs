// Cifar10Config: construction parameters for LabeledImageDataset

use std::env;
use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::cifar10::Cifar10Split;
use crate::error::{DataError, Result};
use crate::transform::Transform;

/// Configuration for opening CIFAR-10.
///
/// # Example
/// ```ignore
/// let config = Cifar10Config::new("data")
///     .train(false)
///     .download(true)
///     .num_samples(1000);
/// let ds = LabeledImageDataset::open(config)?;
/// ```
pub struct Cifar10Config {
    /// Directory holding (or receiving) `cifar-10-batches-bin/`.
    pub root: PathBuf,
    /// Load the train split (default) or the test split.
    pub train: bool,
    /// Fetch the archive if the files are missing (default: false).
    pub download: bool,
    /// Applied by the provider to every sample it returns.
    pub transform: Option<Box<dyn Transform>>,
    /// Truncate the dataset to at most this many samples.
    pub num_samples: Option<usize>,
}

impl Default for Cifar10Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            train: true,
            download: false,
            transform: None,
            num_samples: None,
        }
    }
}

impl fmt::Debug for Cifar10Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cifar10Config")
            .field("root", &self.root)
            .field("train", &self.train)
            .field("download", &self.download)
            .field("transform", &self.transform.is_some())
            .field("num_samples", &self.num_samples)
            .finish()
    }
}

impl Cifar10Config {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
    pub fn train(mut self, train: bool) -> Self {
        self.train = train;
        self
    }
    pub fn download(mut self, download: bool) -> Self {
        self.download = download;
        self
    }
    pub fn transform(mut self, transform: Box<dyn Transform>) -> Self {
        self.transform = Some(transform);
        self
    }
    pub fn num_samples(mut self, n: usize) -> Self {
        self.num_samples = Some(n);
        self
    }

    pub fn split(&self) -> Cifar10Split {
        Cifar10Split::from_train_flag(self.train)
    }

    /// Overlay settings from the environment:
    ///
    /// | variable              | field         |
    /// |-----------------------|---------------|
    /// | `CIFAR10_ROOT`        | `root`        |
    /// | `CIFAR10_TRAIN`       | `train`       |
    /// | `CIFAR10_DOWNLOAD`    | `download`    |
    /// | `CIFAR10_NUM_SAMPLES` | `num_samples` |
    ///
    /// Unset variables leave the current value alone.
    pub fn from_env(self) -> Result<Self> {
        self.overlay(|key| env::var(key).ok())
    }

    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(root) = lookup("CIFAR10_ROOT") {
            self.root = PathBuf::from(root);
        }
        if let Some(v) = lookup("CIFAR10_TRAIN") {
            self.train = parse_bool("CIFAR10_TRAIN", &v)?;
        }
        if let Some(v) = lookup("CIFAR10_DOWNLOAD") {
            self.download = parse_bool("CIFAR10_DOWNLOAD", &v)?;
        }
        if let Some(v) = lookup("CIFAR10_NUM_SAMPLES") {
            self.num_samples = Some(parse_sample_limit(&v)?);
        }
        debug!(config = ?self, "applied environment overrides");
        Ok(self)
    }

    /// Reject settings no provider could act on.
    pub fn validate(&self) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            return Err(DataError::config("root path is empty"));
        }
        Ok(())
    }
}

/// Parse a sample limit given as text. Negative or non-numeric values are
/// rejected.
pub fn parse_sample_limit(s: &str) -> Result<usize> {
    let s = s.trim();
    match s.parse::<i64>() {
        Ok(n) if n < 0 => Err(DataError::config(format!(
            "sample limit must be non-negative, got {n}"
        ))),
        Ok(_) => s
            .parse::<usize>()
            .map_err(|e| DataError::config(format!("sample limit {s:?}: {e}"))),
        Err(e) => Err(DataError::config(format!("sample limit {s:?}: {e}"))),
    }
}

fn parse_bool(key: &str, v: &str) -> Result<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(DataError::config(format!(
            "{key}: expected a boolean, got {other:?}"
        ))),
    }
}
