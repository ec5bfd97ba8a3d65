use thiserror::Error;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Empty not allowed")]
    Empty,
}

/// Any failure of the device key-value store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid storage contents: {0}")]
    Parsing(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
