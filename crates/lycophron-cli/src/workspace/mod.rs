mod atomic;
mod paths;
mod settings;
mod store;

pub use paths::ProjectPaths;
pub use settings::{load_or_create_settings, load_settings, save_settings};
pub use store::JsonRecordStore;

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("toml decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("toml encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("no project found in {0}; run `lycophron init` first")]
    NotInitialized(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid project state: {0}")]
    Invalid(String),
    #[error("logging error: {0}")]
    Logging(String),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
