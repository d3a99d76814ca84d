// Download: fetch and unpack the official CIFAR-10 binary archive
//
// Requires the `download` feature (ureq + flate2 + tar). Without it, any
// request to download reports the data as unavailable.

use std::path::Path;

use crate::error::Result;

/// Official binary distribution.
pub const CIFAR10_URL: &str = "https://www.cs.toronto.edu/~kriz/cifar-10-binary.tar.gz";

/// Download the archive and unpack it into `root`, creating `root` if needed.
///
/// Afterwards `root/cifar-10-batches-bin/` holds every batch file.
#[cfg(feature = "download")]
pub fn download_and_extract(root: &Path) -> Result<()> {
    use tracing::{info, warn};

    use crate::error::DataError;

    info!(url = CIFAR10_URL, root = %root.display(), "downloading CIFAR-10");
    let response = ureq::get(CIFAR10_URL).call().map_err(|e| {
        warn!(error = %e, "CIFAR-10 download failed");
        DataError::unavailable(root, format!("download from {CIFAR10_URL} failed: {e}"))
    })?;
    unpack_archive(response.into_reader(), root)
}

/// Unpack a gzipped CIFAR-10 tarball into `root`.
///
/// The archive is extracted into a staging directory first; the batch
/// directory under `root` is replaced only once every batch file is complete,
/// so an interrupted extraction never leaves a partial dataset behind.
#[cfg(feature = "download")]
pub fn unpack_archive(reader: impl std::io::Read, root: &Path) -> Result<()> {
    use std::fs;

    use flate2::read::GzDecoder;
    use tracing::info;

    use crate::cifar10::{batches_present, BATCH_DIR};
    use crate::error::DataError;

    let staging = root.join(STAGING_DIR);
    let io = |what: &str, e: std::io::Error| {
        DataError::unavailable(root, format!("failed to {what}: {e}"))
    };

    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(|e| io("clear staging directory", e))?;
    }
    fs::create_dir_all(&staging).map_err(|e| io("create staging directory", e))?;

    let unpacked = tar::Archive::new(GzDecoder::new(reader))
        .unpack(&staging)
        .map_err(|e| io("extract archive", e))
        .and_then(|()| {
            if batches_present(&staging) {
                Ok(())
            } else {
                Err(DataError::unavailable(
                    root,
                    "archive extracted but batch files are missing or truncated",
                ))
            }
        });
    if let Err(e) = unpacked {
        let _ = fs::remove_dir_all(&staging);
        return Err(e);
    }

    let target = root.join(BATCH_DIR);
    if target.exists() {
        fs::remove_dir_all(&target).map_err(|e| io("remove stale batch directory", e))?;
    }
    fs::rename(staging.join(BATCH_DIR), &target).map_err(|e| io("move batch directory", e))?;
    fs::remove_dir_all(&staging).map_err(|e| io("clear staging directory", e))?;

    info!(root = %root.display(), "CIFAR-10 extracted");
    Ok(())
}

/// Scratch directory under the root used while extracting.
#[cfg(feature = "download")]
const STAGING_DIR: &str = ".cifar-10-download";

#[cfg(not(feature = "download"))]
pub fn download_and_extract(root: &Path) -> Result<()> {
    Err(crate::error::DataError::unavailable(
        root,
        "downloading requires the `download` feature of cifar-data",
    ))
}
