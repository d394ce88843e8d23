//! The scoring port: a once-bound, process-wide handle to the model.
//!
//! The port starts empty. Binding sets the model exactly once; any later bind
//! attempt is a no-op that leaves the first model in place. Readiness is a
//! single atomic read of the same cell that `score` uses, so there is no gap
//! between "is it loaded?" and "use it".

use std::path::Path;
use std::sync::{Arc, OnceLock};

use pipeline::{FEATURE_NAMES, FeatureVector};
use tracing::{debug, info};

use crate::error::{LoadError, ScoringError};
use crate::model::{ScoringModel, TreeEnsemble};

/// Handle to the bound scoring model.
#[derive(Default)]
pub struct ScoringPort {
    model: OnceLock<Arc<dyn ScoringModel>>,
}

impl ScoringPort {
    /// Create an unbound port.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a port already bound to `model`.
    pub fn bound(model: Arc<dyn ScoringModel>) -> Self {
        let port = Self::new();
        port.bind(model);
        port
    }

    /// Bind a model.
    ///
    /// # Returns
    /// `true` if this call bound the model, `false` if one was already bound
    /// (in which case `model` is dropped).
    pub fn bind(&self, model: Arc<dyn ScoringModel>) -> bool {
        let name = model.name().to_string();
        match self.model.set(model) {
            Ok(()) => {
                info!(model = %name, "Scoring model bound");
                true
            }
            Err(_) => {
                debug!(model = %name, "Scoring model already bound, ignoring");
                false
            }
        }
    }

    /// Load a tree-ensemble artifact and bind it.
    ///
    /// When a model is already bound the file is not read at all.
    pub fn bind_from_path(&self, path: &Path) -> Result<bool, LoadError> {
        if self.is_ready() {
            debug!("Scoring model already bound, skipping load of {}", path.display());
            return Ok(false);
        }
        let ensemble = TreeEnsemble::load(path)?;
        Ok(self.bind(Arc::new(ensemble)))
    }

    pub fn is_ready(&self) -> bool {
        self.model.get().is_some()
    }

    /// Name of the bound model, if any
    pub fn model_name(&self) -> Option<&str> {
        self.model.get().map(|m| m.name())
    }

    /// Score one feature vector.
    ///
    /// # Errors
    /// * `ModelNotReady` - nothing is bound
    /// * `NonFiniteFeature` / `NonFiniteScore` - NaN or infinity on either side
    /// * `Model` - the model rejected the row
    pub fn score(&self, features: &FeatureVector) -> Result<f64, ScoringError> {
        let model = self.model.get().ok_or(ScoringError::ModelNotReady)?;

        for (name, value) in FEATURE_NAMES.into_iter().zip(features.to_array()) {
            if !value.is_finite() {
                return Err(ScoringError::NonFiniteFeature { name, value });
            }
        }

        let score = model.predict(features)?;
        if !score.is_finite() {
            return Err(ScoringError::NonFiniteScore(score));
        }
        Ok(score)
    }
}
