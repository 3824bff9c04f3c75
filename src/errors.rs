//! Errors raised while loading data and configuration.
//!
//! The comparison stages themselves never fail: unusable values become `None`
//! and the affected records drop out of the result.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {name}: {source}")]
    Csv {
        name: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("invalid configuration: {0}")]
    ConfigDecode(#[from] toml::de::Error),

    #[error("could not encode configuration: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    #[error("no data source configured for {0} mode")]
    MissingSource(&'static str),

    #[error("reference program {0} not found in the loaded programs")]
    ReferenceNotFound(String),
}
