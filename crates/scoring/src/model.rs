//! Scoring models.
//!
//! The recommender only relies on the [`ScoringModel`] trait: one feature row
//! in, one score out. [`TreeEnsemble`] is the implementation loaded from disk:
//! a JSON-serialized set of regression trees whose outputs are averaged.
//!
//! ## Artifact format
//! ```json
//! {
//!   "name": "player_performance_v1",
//!   "features": ["weather_condition", "pitch_condition", "historical_avg_points"],
//!   "trees": [
//!     { "nodes": [
//!         { "kind": "split", "feature": 2, "threshold": 45.0, "left": 1, "right": 2 },
//!         { "kind": "leaf", "value": 35.0 },
//!         { "kind": "leaf", "value": 60.0 }
//!     ] }
//!   ]
//! }
//! ```
//! A split sends the row left when `row[feature] <= threshold`. Node 0 is the
//! root and children always point forward, so every walk terminates.

use std::path::Path;

use pipeline::{FEATURE_NAMES, FeatureVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LoadError, ScoringError};

/// Core trait for anything that can score a player.
///
/// ## Design Note
/// - `Send + Sync` lets one bound model serve concurrent requests
/// - Models are read-only once built; `predict` takes `&self`
pub trait ScoringModel: Send + Sync {
    /// Returns the name of this model (for logging/health)
    fn name(&self) -> &str;

    /// Predict the fantasy score for one feature row.
    fn predict(&self, features: &FeatureVector) -> Result<f64, ScoringError>;
}

/// One node of a regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A single regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Walk the tree for one row.
    ///
    /// Indexes are checked here as well as in `validate`, since an ensemble
    /// can be built or deserialized without being validated.
    fn evaluate(&self, row: &[f64]) -> Result<f64, ScoringError> {
        let mut index = 0;
        loop {
            let node = self
                .nodes
                .get(index)
                .ok_or_else(|| ScoringError::Model(format!("node {} does not exist", index)))?;
            match node {
                Node::Leaf { value } => return Ok(*value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = row.get(*feature).ok_or_else(|| {
                        ScoringError::Model(format!(
                            "node {} splits on unknown feature {}",
                            index, feature
                        ))
                    })?;
                    let next = if *x <= *threshold { *left } else { *right };
                    if next <= index {
                        return Err(ScoringError::Model(format!(
                            "node {} points back to node {}",
                            index, next
                        )));
                    }
                    index = next;
                }
            }
        }
    }

    fn validate(&self, tree_index: usize, feature_count: usize) -> Result<(), LoadError> {
        let invalid =
            |reason: String| LoadError::Invalid(format!("tree {}: {}", tree_index, reason));

        if self.nodes.is_empty() {
            return Err(invalid("has no nodes".to_string()));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(invalid(format!("leaf {} is not finite", i)));
                    }
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= feature_count {
                        return Err(invalid(format!(
                            "node {} splits on feature {} but there are {} features",
                            i, feature, feature_count
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(invalid(format!("node {} threshold is not finite", i)));
                    }
                    for child in [left, right] {
                        if *child <= i || *child >= self.nodes.len() {
                            return Err(invalid(format!(
                                "node {} has child {} outside ({}, {})",
                                i,
                                child,
                                i,
                                self.nodes.len()
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Averaged ensemble of regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub name: String,
    pub features: Vec<String>,
    pub trees: Vec<Tree>,
}

impl TreeEnsemble {
    /// Parse and validate an ensemble from JSON text.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let ensemble: TreeEnsemble = serde_json::from_str(json).map_err(|e| LoadError::Format {
            path: "<inline>".into(),
            source: e,
        })?;
        ensemble.validate()?;
        Ok(ensemble)
    }

    /// Load and validate an ensemble from a file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        info!("Loading model artifact from {}", path.display());

        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                LoadError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let ensemble: TreeEnsemble =
            serde_json::from_slice(&bytes).map_err(|e| LoadError::Format {
                path: path.to_path_buf(),
                source: e,
            })?;
        ensemble.validate()?;

        info!(
            model = %ensemble.name,
            trees = ensemble.trees.len(),
            "Model artifact loaded"
        );
        Ok(ensemble)
    }

    /// Check the artifact against the feature layout and tree invariants.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.features.len() != FEATURE_NAMES.len()
            || self.features.iter().zip(FEATURE_NAMES).any(|(a, b)| a != b)
        {
            return Err(LoadError::Invalid(format!(
                "expected features {:?}, artifact declares {:?}",
                FEATURE_NAMES, self.features
            )));
        }

        if self.trees.is_empty() {
            return Err(LoadError::Invalid("ensemble has no trees".to_string()));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i, self.features.len())?;
        }
        Ok(())
    }
}

impl ScoringModel for TreeEnsemble {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64, ScoringError> {
        if self.trees.is_empty() {
            return Err(ScoringError::Model("ensemble has no trees".to_string()));
        }
        let row = features.to_array();
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.evaluate(&row)?;
        }
        let score = total / self.trees.len() as f64;
        debug!(model = %self.name, ?row, score, "Predicted");
        Ok(score)
    }
}
