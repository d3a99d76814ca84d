// Tests for cifar-data: LabeledImageDataset over toy and on-disk providers

use std::fs;
use std::path::Path;

use cifar_data::cifar10::{build_cifar_bytes, BATCH_DIR, IMAGE_BYTES};
use cifar_data::{
    Cifar10Config, Cifar10Provider, Cifar10Split, Compose, DataError, Dataset,
    LabeledImageDataset, Normalize, OneHotEncode, Sample, CLASS_NAMES,
};

// Lazily generated provider of arbitrary size

struct ToyProvider {
    count: usize,
}

impl Dataset for ToyProvider {
    fn len(&self) -> usize {
        self.count
    }

    fn get(&self, index: usize) -> cifar_data::Result<Sample> {
        if index >= self.count {
            return Err(DataError::IndexOutOfRange {
                index,
                len: self.count,
            });
        }
        Ok(Sample {
            features: vec![index as f64, (index * 2) as f64],
            feature_shape: vec![2],
            target: vec![(index % 10) as f64],
            target_shape: vec![1],
        })
    }

    fn feature_shape(&self) -> &[usize] {
        &[2]
    }

    fn target_shape(&self) -> &[usize] {
        &[1]
    }

    fn name(&self) -> &str {
        "toy"
    }
}

// Limit semantics

#[test]
fn test_limit_100_of_50000() {
    let ds = LabeledImageDataset::new(ToyProvider { count: 50_000 }, Some(100));
    assert_eq!(ds.len(), 100);
    assert!(ds.get(99).is_ok());
    assert!(matches!(
        ds.get(100),
        Err(DataError::IndexOutOfRange { index: 100, len: 100 })
    ));
}

#[test]
fn test_no_limit_uses_provider_len() {
    let ds = LabeledImageDataset::new(ToyProvider { count: 10_000 }, None);
    assert_eq!(ds.len(), 10_000);
    assert!(ds.get(9_999).is_ok());
    assert!(ds.get(10_000).is_err());
}

#[test]
fn test_limit_clamps_to_provider() {
    for (count, limit) in [(0, 5), (3, 3), (3, 4), (10, 1_000)] {
        let ds = LabeledImageDataset::new(ToyProvider { count }, Some(limit));
        assert_eq!(ds.len(), count.min(limit));
    }
}

#[test]
fn test_get_matches_provider_and_is_idempotent() {
    let ds = LabeledImageDataset::new(ToyProvider { count: 64 }, Some(32));
    for i in 0..ds.len() {
        let a = ds.get(i).unwrap();
        let b = ds.get(i).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, ds.provider().get(i).unwrap());
    }
}

#[test]
fn test_class_names_fixed() {
    for limit in [None, Some(0), Some(7)] {
        let ds = LabeledImageDataset::new(ToyProvider { count: 10 }, limit);
        assert_eq!(ds.num_classes(), 10);
        assert_eq!(ds.class_names(), &CLASS_NAMES);
        let mut names = ds.class_names().to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 10);
    }
}

#[test]
fn test_adapter_forwards_metadata() {
    let ds = LabeledImageDataset::new(ToyProvider { count: 4 }, None);
    assert_eq!(ds.name(), "toy");
    assert_eq!(ds.feature_shape(), &[2]);
    assert_eq!(ds.target_shape(), &[1]);
}

#[test]
fn test_concurrent_reads() {
    let ds = LabeledImageDataset::new(Cifar10Provider::synthetic(64, Cifar10Split::Train), None);
    let expected: Vec<Sample> = (0..ds.len()).map(|i| ds.get(i).unwrap()).collect();
    std::thread::scope(|s| {
        for t in 0..4 {
            let ds = &ds;
            let expected = &expected;
            s.spawn(move || {
                for i in (t..ds.len()).step_by(4) {
                    assert_eq!(&ds.get(i).unwrap(), &expected[i]);
                }
            });
        }
    });
}

// On-disk loading

fn image(fill: u8) -> Vec<u8> {
    vec![fill; IMAGE_BYTES]
}

/// Write a miniature CIFAR-10 tree: `per_batch` records in each train batch
/// and `test` records in the test batch.
fn write_fixture(root: &Path, per_batch: usize, test: usize) {
    let dir = root.join(BATCH_DIR);
    fs::create_dir_all(&dir).unwrap();
    for (b, name) in Cifar10Split::Train.file_names().iter().enumerate() {
        let images: Vec<Vec<u8>> = (0..per_batch).map(|i| image((b * 10 + i) as u8)).collect();
        let records: Vec<(u8, &[u8])> = images
            .iter()
            .enumerate()
            .map(|(i, img)| (((b + i) % 10) as u8, img.as_slice()))
            .collect();
        fs::write(dir.join(name), build_cifar_bytes(&records)).unwrap();
    }
    let images: Vec<Vec<u8>> = (0..test).map(|i| image(200 + i as u8)).collect();
    let records: Vec<(u8, &[u8])> = images.iter().map(|img| (9, img.as_slice())).collect();
    fs::write(dir.join("test_batch.bin"), build_cifar_bytes(&records)).unwrap();
}

#[test]
fn test_open_train_split_from_disk() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture(tmp.path(), 3, 2);

    let ds = LabeledImageDataset::open(Cifar10Config::new(tmp.path())).unwrap();
    assert_eq!(ds.len(), 15);
    assert_eq!(ds.name(), "CIFAR10-train");

    // Batches are concatenated in file order.
    let s = ds.get(4).unwrap();
    assert_eq!(s.feature_shape, vec![3, 32, 32]);
    assert_eq!(s.features[0], 11.0);
    assert_eq!(s.label(), 2);
}

#[test]
fn test_open_test_split_with_limit() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture(tmp.path(), 1, 4);

    let config = Cifar10Config::new(tmp.path()).train(false).num_samples(3);
    let ds = LabeledImageDataset::open(config).unwrap();
    assert_eq!(ds.len(), 3);
    assert_eq!(ds.provider().len(), 4);
    assert_eq!(ds.get(2).unwrap().features[0], 202.0);
    assert!(ds.get(3).is_err());
}

#[test]
fn test_open_applies_transform_once() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture(tmp.path(), 1, 1);

    let transform = Compose::new(vec![
        Box::new(Normalize::new(255.0)),
        Box::new(OneHotEncode::new(10)),
    ]);
    let config = Cifar10Config::new(tmp.path())
        .train(false)
        .transform(Box::new(transform));
    let ds = LabeledImageDataset::open(config).unwrap();

    let s = ds.get(0).unwrap();
    assert!((s.features[0] - 200.0 / 255.0).abs() < 1e-12);
    assert_eq!(s.target_shape, vec![10]);
    assert_eq!(s.label(), 9);
}

#[test]
fn test_missing_batch_file() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture(tmp.path(), 1, 1);
    fs::remove_file(tmp.path().join(BATCH_DIR).join("data_batch_3.bin")).unwrap();

    let err = LabeledImageDataset::open(Cifar10Config::new(tmp.path())).unwrap_err();
    match err {
        DataError::DataUnavailable { path, .. } => {
            assert!(path.ends_with("data_batch_3.bin"));
        }
        other => panic!("expected DataUnavailable, got {other:?}"),
    }
    // The test split is still intact.
    assert!(LabeledImageDataset::open(Cifar10Config::new(tmp.path()).train(false)).is_ok());
}

#[test]
fn test_corrupt_batch_file() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture(tmp.path(), 1, 1);
    fs::write(tmp.path().join(BATCH_DIR).join("test_batch.bin"), [0u8; 100]).unwrap();

    let err = LabeledImageDataset::open(Cifar10Config::new(tmp.path()).train(false)).unwrap_err();
    assert!(matches!(err, DataError::InvalidFormat(_)));
}

#[cfg(not(feature = "download"))]
#[test]
fn test_download_requested_without_feature() {
    let tmp = tempfile::tempdir().unwrap();
    let err = LabeledImageDataset::open(Cifar10Config::new(tmp.path()).download(true)).unwrap_err();
    assert!(matches!(err, DataError::DataUnavailable { .. }));
}

#[test]
fn test_download_skipped_when_present() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture(tmp.path(), 2, 2);
    let ds = LabeledImageDataset::open(Cifar10Config::new(tmp.path()).download(true)).unwrap();
    assert_eq!(ds.len(), 10);
}
