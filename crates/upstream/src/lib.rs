//! # Upstream Crate
//!
//! This crate talks to the two data services the recommender depends on and
//! turns their JSON records into request-scoped context types.
//!
//! ## Main Components
//!
//! - **types**: Domain ids and the `MatchContext` / `PlayerContext` records
//! - **parser**: Lenient decoding of upstream JSON bodies into contexts
//! - **client**: Provider traits plus the `reqwest` implementations
//! - **memory**: In-memory providers for offline runs and tests
//! - **error**: Error types for upstream access
//!
//! ## Example Usage
//!
//! ```ignore
//! use upstream::{HttpRecordFetcher, MatchDataProvider, MatchServiceClient};
//! use std::time::Duration;
//!
//! let fetcher = HttpRecordFetcher::new(
//!     reqwest::Client::new(),
//!     "http://localhost:8001/api/v1",
//!     Duration::from_secs(5),
//! );
//! let matches = MatchServiceClient::new(fetcher);
//!
//! if let Some(context) = matches.fetch_match(10).await? {
//!     println!("weather code: {:?}", context.weather_condition);
//! }
//! ```

pub mod client;
pub mod error;
pub mod memory;
pub mod parser;
pub mod types;

pub use client::{
    HttpRecordFetcher, MatchDataProvider, MatchServiceClient, PlayerStatsProvider,
    TeamServiceClient,
};
pub use error::{Result, UpstreamError};
pub use memory::InMemoryProvider;
pub use types::{MatchContext, MatchId, PlayerContext, PlayerId};
