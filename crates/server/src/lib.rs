//! Server crate for the fantasy player recommendation service.
//!
//! This crate wires the upstream clients, resolver, feature pipeline and
//! scoring port together behind an axum HTTP surface.

pub mod api;
pub mod config;
pub mod orchestrator;

use std::path::Path;
use std::sync::Arc;

use scoring::ScoringPort;
use tracing::{error, info};

pub use api::{ApiError, RecommendQuery, router};
pub use config::{ConfigError, LoggingConfig, Settings};
pub use orchestrator::{RecommendError, RecommendationOrchestrator, RecommendationReport};

/// Load the model artifact at `path` into a fresh scoring port.
///
/// A load failure is logged and leaves the port unbound, so the service can
/// still start and report itself as degraded.
pub fn load_scoring_port(path: &Path) -> Arc<ScoringPort> {
    let port = ScoringPort::new();
    match port.bind_from_path(path) {
        Ok(_) => info!(
            model = port.model_name().unwrap_or_default(),
            "Loaded scoring model from {}",
            path.display()
        ),
        Err(e) => error!("Failed to load scoring model, starting degraded: {}", e),
    }
    Arc::new(port)
}
