//! # cifar-data
//!
//! CIFAR-10 loading behind a minimal indexed dataset interface.
//!
//! This crate provides:
//! - [`Dataset`] trait: `len`/`get` contract shared by providers and adapters
//! - [`LabeledImageDataset`]: class names plus an optional sample limit over a provider
//! - [`Cifar10Provider`]: parser for the official CIFAR-10 binary batches
//! - [`Cifar10Config`]: construction parameters, with environment overrides
//   - Preprocessing transforms: Normalize, per-channel Standardize, OneHotEncode
//   - Augmentations: RandomHorizontalFlip, RandomCrop
//   - Archive download (`download` feature)

pub mod augment;
pub mod cifar10;
pub mod config;
pub mod dataset;
pub mod download;
pub mod error;
pub mod labeled;
pub mod transform;

pub use augment::{Padding, RandomCrop, RandomHorizontalFlip};
pub use cifar10::{Cifar10Provider, Cifar10Split, CLASS_NAMES, NUM_CLASSES};
pub use config::{parse_sample_limit, Cifar10Config};
pub use dataset::{Dataset, Sample};
pub use error::{DataError, Result};
pub use labeled::LabeledImageDataset;
pub use transform::{Compose, Normalize, OneHotEncode, Standardize, Transform};
