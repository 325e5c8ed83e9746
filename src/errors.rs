use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerritoryError {
    #[error("no territory centres available for {stores} stores")]
    NoCentres { stores: usize },
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to parse engine configuration '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("I/O error accessing path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("GeoJSON serialisation error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type TerritoryResult<T> = Result<T, TerritoryError>;

macro_rules! io_err {
    ($path:expr, $err:expr) => {
        $crate::errors::TerritoryError::Io {
            path: $path.to_path_buf(),
            source: $err,
        }
    };
}

pub(crate) use io_err;
