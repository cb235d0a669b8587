use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog must be a JSON array of products or an object with a `products` array")]
    UnexpectedShape,

    #[error("config is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid engine setting: {0}")]
    InvalidSetting(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
