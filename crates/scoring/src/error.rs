//! Error types for model loading and scoring.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while scoring a single feature vector
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    /// No model has been bound to the port yet
    #[error("Model is not loaded; bind a model before scoring")]
    ModelNotReady,

    /// An input feature was NaN or infinite
    #[error("Feature {name} is not finite: {value}")]
    NonFiniteFeature { name: &'static str, value: f64 },

    /// The model produced NaN or infinity
    #[error("Model returned a non-finite score: {0}")]
    NonFiniteScore(f64),

    /// The model itself refused the input
    #[error("Model failed to score: {0}")]
    Model(String),
}

impl ScoringError {
    /// Errors that affect every player identically and must abort the request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScoringError::ModelNotReady)
    }
}

/// Errors raised while loading a model artifact
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Model file not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read model file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed model file {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The artifact parsed but describes an unusable model
    #[error("Invalid model artifact: {0}")]
    Invalid(String),
}
