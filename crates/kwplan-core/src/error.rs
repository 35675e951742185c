use thiserror::Error;

#[derive(Debug, Error)]
pub enum KwError {
    #[error("no .csv keyword exports found in {0}")]
    NoInputFiles(String),

    #[error("no volume column found: growth planning needs a column whose header contains 'volume'")]
    MissingVolumeColumn,

    #[error("{kind} source not readable: {path}")]
    MissingResource { kind: String, path: String },

    #[error("invalid CTR position {0}: expected 1..=10")]
    InvalidPosition(u8),

    #[error("invalid search volume {0}: expected a finite, non-negative number")]
    InvalidVolume(f64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("clustering failed: {0}")]
    Clustering(String),

    #[error("xml error: {0}")]
    Xml(String),

    #[error("export failed: {0}")]
    ExportFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KwError>;
