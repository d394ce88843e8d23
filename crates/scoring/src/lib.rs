//! Player scoring for the recommendation service.
//!
//! This crate provides:
//! - `ScoringModel`, the one-row-in / one-score-out model contract
//! - `TreeEnsemble`, the JSON regression-tree artifact loaded at startup
//! - `ScoringPort`, the once-bound handle the orchestrator scores through
//!
//! ## Example Usage
//! ```ignore
//! use scoring::ScoringPort;
//! use std::path::Path;
//!
//! let port = ScoringPort::new();
//! port.bind_from_path(Path::new("models/player_performance_v1.json"))?;
//!
//! let score = port.score(&features)?;
//! ```

pub mod error;
pub mod model;
pub mod port;

pub use error::{LoadError, ScoringError};
pub use model::{Node, ScoringModel, Tree, TreeEnsemble};
pub use port::ScoringPort;
