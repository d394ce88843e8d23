//! Candidate resolution for player recommendations.
//!
//! This crate provides:
//! - `CandidateResolver`, which fetches one match and N player contexts
//! - `PlayerOutcome`, the explicit resolved / unresolved tag for each player
//! - `UnresolvedReason`, which records why a player was dropped
//!
//! ## Example Usage
//! ```ignore
//! use resolver::CandidateResolver;
//!
//! let resolver = CandidateResolver::new(matches, players).with_max_in_flight(16);
//! let resolution = resolver.resolve(10, &[1, 2, 3]).await?;
//!
//! for dropped in resolution.unresolved() {
//!     println!("{} dropped: {}", dropped.player_id, dropped.reason);
//! }
//! ```

pub mod candidate;
pub mod outcome;

pub use candidate::{
    CandidateResolver, DEFAULT_MAX_IN_FLIGHT, ResolveError, dedup_preserving_order,
};
pub use outcome::{PlayerOutcome, Resolution, UnresolvedPlayer, UnresolvedReason};
