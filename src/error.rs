// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Error types

use thiserror::Error;

/// Errors surfaced by the NEMI engine
#[derive(Debug, Error)]
pub enum NemiError {
    /// Configuration could not be parsed or serialized
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem failure while reading or writing configuration
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Camera could not be opened or permission was denied
    #[error("unable to access camera: {0}")]
    CameraUnavailable(String),

    /// Placeholder inference model failed to build
    #[error("model initialization failed: {0}")]
    ModelInit(String),

    /// View payload could not be encoded for the store
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Temporal scale key outside the five fixed scales
    #[error("unknown temporal scale '{0}'")]
    InvalidScale(String),
}

impl From<toml::de::Error> for NemiError {
    fn from(e: toml::de::Error) -> Self {
        NemiError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for NemiError {
    fn from(e: toml::ser::Error) -> Self {
        NemiError::Config(e.to_string())
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, NemiError>;
