// CIFAR-10 dataset: binary batch format parser
//
// The binary distribution unpacks to `cifar-10-batches-bin/` containing:
//   - data_batch_1.bin .. data_batch_5.bin  (10,000 records each, train)
//   - test_batch.bin                        (10,000 records, test)
//   - batches.meta.txt                      (label names, one per line)
//
// Record layout (3073 bytes, no header):
//   label(u8) | red(1024 × u8) | green(1024 × u8) | blue(1024 × u8)
//
// Each colour plane is a 32×32 image in row-major order, so the pixel bytes
// of a record are already in [C, H, W] layout.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::Cifar10Config;
use crate::dataset::{check_index, Dataset, Sample};
use crate::error::{DataError, Result};
use crate::transform::Transform;

/// Human-readable class labels, indexed by label value.
pub const CLASS_NAMES: [&str; 10] = [
    "plane", "car", "bird", "cat", "deer", "dog", "frog", "horse", "ship", "truck",
];

pub const NUM_CLASSES: usize = CLASS_NAMES.len();

pub const CHANNELS: usize = 3;
pub const IMAGE_SIZE: usize = 32;
pub const IMAGE_BYTES: usize = CHANNELS * IMAGE_SIZE * IMAGE_SIZE;
pub const RECORD_BYTES: usize = IMAGE_BYTES + 1;

/// Directory the official archive unpacks into.
pub const BATCH_DIR: &str = "cifar-10-batches-bin";

const TRAIN_FILES: [&str; 5] = [
    "data_batch_1.bin",
    "data_batch_2.bin",
    "data_batch_3.bin",
    "data_batch_4.bin",
    "data_batch_5.bin",
];
const TEST_FILES: [&str; 1] = ["test_batch.bin"];

/// Which split of CIFAR-10 to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cifar10Split {
    Train,
    Test,
}

impl Cifar10Split {
    pub fn from_train_flag(train: bool) -> Self {
        if train {
            Cifar10Split::Train
        } else {
            Cifar10Split::Test
        }
    }

    /// Batch file names making up this split, in order.
    pub fn file_names(self) -> &'static [&'static str] {
        match self {
            Cifar10Split::Train => &TRAIN_FILES,
            Cifar10Split::Test => &TEST_FILES,
        }
    }
}

impl fmt::Display for Cifar10Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cifar10Split::Train => f.write_str("train"),
            Cifar10Split::Test => f.write_str("test"),
        }
    }
}

/// Whether every batch file of both splits exists under `root` and holds a
/// whole, non-zero number of records.
pub fn batches_present(root: &Path) -> bool {
    let dir = root.join(BATCH_DIR);
    TRAIN_FILES.iter().chain(TEST_FILES.iter()).all(|name| {
        fs::metadata(dir.join(name))
            .map(|m| m.is_file() && m.len() > 0 && m.len() % RECORD_BYTES as u64 == 0)
            .unwrap_or(false)
    })
}

/// One CIFAR-10 split held in memory.
///
/// Pixels are kept as raw `u8` (3072 bytes per image); conversion to `f64`
/// and the optional transform happen on each `get`.
pub struct Cifar10Provider {
    pixels: Vec<u8>,
    labels: Vec<u8>,
    split: Cifar10Split,
    transform: Option<Box<dyn Transform>>,
    feature_shape: Vec<usize>,
    target_shape: Vec<usize>,
}

impl fmt::Debug for Cifar10Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cifar10Provider")
            .field("samples", &self.labels.len())
            .field("split", &self.split)
            .field("transform", &self.transform.is_some())
            .field("feature_shape", &self.feature_shape)
            .field("target_shape", &self.target_shape)
            .finish()
    }
}

impl Cifar10Provider {
    /// Load a split from `root`, which must contain `cifar-10-batches-bin/`.
    ///
    /// Batch files are read and parsed in parallel.
    pub fn load(root: impl AsRef<Path>, split: Cifar10Split) -> Result<Self> {
        let dir = root.as_ref().join(BATCH_DIR);
        if !dir.is_dir() {
            return Err(DataError::unavailable(
                &dir,
                "dataset directory not found; enable downloading or unpack the archive here",
            ));
        }

        let paths: Vec<PathBuf> = split.file_names().iter().map(|n| dir.join(n)).collect();
        if let Some(missing) = paths.iter().find(|p| !p.is_file()) {
            return Err(DataError::unavailable(missing, "batch file missing"));
        }

        let batches = paths
            .par_iter()
            .map(|path| {
                let bytes = fs::read(path)?;
                debug!(path = %path.display(), bytes = bytes.len(), "read CIFAR-10 batch");
                parse_batch(&bytes).map_err(|e| match e {
                    DataError::InvalidFormat(msg) => {
                        DataError::format(format!("{}: {msg}", path.display()))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut pixels = Vec::with_capacity(batches.iter().map(|b| b.0.len()).sum());
        let mut labels = Vec::with_capacity(batches.iter().map(|b| b.1.len()).sum());
        for (p, l) in batches {
            pixels.extend_from_slice(&p);
            labels.extend_from_slice(&l);
        }

        info!(%split, samples = labels.len(), root = %root.as_ref().display(), "loaded CIFAR-10");
        Ok(Self::from_parts(pixels, labels, split))
    }

    /// Load the split selected by `config`, downloading first when allowed,
    /// and attach its transform.
    ///
    /// `config.num_samples` is not applied here; truncation belongs to
    /// [`LabeledImageDataset`](crate::LabeledImageDataset).
    pub fn from_config(config: Cifar10Config) -> Result<Self> {
        config.validate()?;
        let provider = Self::fetch(&config.root, config.split(), config.download)?;
        Ok(match config.transform {
            Some(t) => provider.with_transform(t),
            None => provider,
        })
    }

    /// Load a split, downloading the archive into `root` first when the
    /// files are missing and `download` is set.
    pub fn fetch(root: impl AsRef<Path>, split: Cifar10Split, download: bool) -> Result<Self> {
        let root = root.as_ref();
        if download && !batches_present(root) {
            crate::download::download_and_extract(root)?;
        }
        Self::load(root, split)
    }

    /// Parse one in-memory batch (useful for embedded/testing).
    pub fn from_raw(bytes: &[u8], split: Cifar10Split) -> Result<Self> {
        let (pixels, labels) = parse_batch(bytes)?;
        Ok(Self::from_parts(pixels, labels, split))
    }

    /// Create a small synthetic CIFAR-like dataset for testing.
    ///
    /// Generates `n` random 3×32×32 images with random labels.
    pub fn synthetic(n: usize, split: Cifar10Split) -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let mut pixels = vec![0u8; n * IMAGE_BYTES];
        rng.fill(pixels.as_mut_slice());
        let labels = (0..n).map(|_| rng.gen_range(0..NUM_CLASSES as u8)).collect();
        Self::from_parts(pixels, labels, split)
    }

    fn from_parts(pixels: Vec<u8>, labels: Vec<u8>, split: Cifar10Split) -> Self {
        Self {
            pixels,
            labels,
            split,
            transform: None,
            feature_shape: vec![CHANNELS, IMAGE_SIZE, IMAGE_SIZE],
            target_shape: vec![1],
        }
    }

    /// Apply `transform` to every sample returned by `get`.
    ///
    /// The transform is run once on a blank image so `feature_shape` and
    /// `target_shape` report the shapes `get` actually returns.
    pub fn with_transform(mut self, transform: Box<dyn Transform>) -> Self {
        let blank = transform.apply(raw_sample(&[0; IMAGE_BYTES], 0));
        debug!(
            feature_shape = ?blank.feature_shape,
            target_shape = ?blank.target_shape,
            "attached CIFAR-10 transform"
        );
        self.feature_shape = blank.feature_shape;
        self.target_shape = blank.target_shape;
        self.transform = Some(transform);
        self
    }

    /// Total number of samples.
    pub fn num_samples(&self) -> usize {
        self.labels.len()
    }

    /// Raw pixel bytes of sample `i` in [C, H, W] order.
    pub fn image_u8(&self, i: usize) -> &[u8] {
        &self.pixels[i * IMAGE_BYTES..(i + 1) * IMAGE_BYTES]
    }

    /// Label of sample `i`.
    pub fn label(&self, i: usize) -> u8 {
        self.labels[i]
    }

    pub fn split(&self) -> Cifar10Split {
        self.split
    }

    /// Keep only the first `n` samples, releasing the rest.
    pub fn take(mut self, n: usize) -> Self {
        let n = n.min(self.labels.len());
        self.pixels.truncate(n * IMAGE_BYTES);
        self.labels.truncate(n);
        self
    }
}

impl Dataset for Cifar10Provider {
    fn len(&self) -> usize {
        self.labels.len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        check_index(index, self.len())?;
        let sample = raw_sample(self.image_u8(index), self.labels[index]);
        Ok(match &self.transform {
            Some(t) => t.apply(sample),
            None => sample,
        })
    }

    fn feature_shape(&self) -> &[usize] {
        &self.feature_shape
    }

    fn target_shape(&self) -> &[usize] {
        &self.target_shape
    }

    fn name(&self) -> &str {
        match self.split {
            Cifar10Split::Train => "CIFAR10-train",
            Cifar10Split::Test => "CIFAR10-test",
        }
    }
}

/// Untransformed sample for one record.
fn raw_sample(image: &[u8], label: u8) -> Sample {
    Sample {
        features: image.iter().map(|&p| p as f64).collect(),
        feature_shape: vec![CHANNELS, IMAGE_SIZE, IMAGE_SIZE],
        target: vec![label as f64],
        target_shape: vec![1],
    }
}

/// Split a batch into (pixels, labels), validating length and label range.
fn parse_batch(data: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    if data.len() % RECORD_BYTES != 0 {
        return Err(DataError::format(format!(
            "batch length {} is not a multiple of the {RECORD_BYTES}-byte record size",
            data.len()
        )));
    }

    let count = data.len() / RECORD_BYTES;
    let mut pixels = Vec::with_capacity(count * IMAGE_BYTES);
    let mut labels = Vec::with_capacity(count);
    for (i, record) in data.chunks_exact(RECORD_BYTES).enumerate() {
        let label = record[0];
        if label as usize >= NUM_CLASSES {
            return Err(DataError::format(format!(
                "record {i} has label {label}, expected < {NUM_CLASSES}"
            )));
        }
        labels.push(label);
        pixels.extend_from_slice(&record[1..]);
    }
    Ok((pixels, labels))
}

// Builder helpers

/// Serialise `(label, pixels)` records into batch-file bytes (useful for tests).
///
/// # Panics
/// Panics if any image is not exactly 3072 bytes.
pub fn build_cifar_bytes(records: &[(u8, &[u8])]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(records.len() * RECORD_BYTES);
    for (label, image) in records {
        assert_eq!(image.len(), IMAGE_BYTES, "CIFAR image must be 3072 bytes");
        buf.push(*label);
        buf.extend_from_slice(image);
    }
    buf
}
