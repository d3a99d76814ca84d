use std::path::PathBuf;

/// All errors produced while configuring, loading or indexing a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The provider could not locate or fetch the dataset files.
    #[error("data unavailable at {}: {reason}", path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    /// A construction parameter was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Index outside `[0, len)`.
    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A batch file exists but its contents are malformed.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        DataError::DataUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        DataError::InvalidConfiguration(msg.into())
    }

    pub fn format(msg: impl Into<String>) -> Self {
        DataError::InvalidFormat(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
