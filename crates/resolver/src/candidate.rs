//! # Candidate Resolver
//!
//! Fetches the match once and every candidate's stats independently. Player
//! lookups are fanned out concurrently (bounded by `max_in_flight`) and the
//! outcomes come back in request order, whatever order the fetches finish in.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures_util::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};
use upstream::{MatchContext, MatchDataProvider, MatchId, PlayerId, PlayerStatsProvider};

use crate::outcome::{PlayerOutcome, Resolution, UnresolvedReason};

/// Default number of player lookups allowed in flight at once
pub const DEFAULT_MAX_IN_FLIGHT: usize = 16;

/// Failures that abort resolution for the whole request
#[derive(Error, Debug)]
pub enum ResolveError {
    /// No usable match record, for whatever reason
    #[error("Match with ID {match_id} not found ({reason})")]
    MatchNotFound {
        match_id: MatchId,
        reason: UnresolvedReason,
    },
}

/// Resolves one match and its candidate players against the providers.
#[derive(Clone)]
pub struct CandidateResolver {
    matches: Arc<dyn MatchDataProvider>,
    players: Arc<dyn PlayerStatsProvider>,
    max_in_flight: usize,
}

impl CandidateResolver {
    pub fn new(
        matches: Arc<dyn MatchDataProvider>,
        players: Arc<dyn PlayerStatsProvider>,
    ) -> Self {
        Self {
            matches,
            players,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// Cap the number of concurrent player lookups (minimum 1).
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Resolve the match and all candidates.
    ///
    /// Player lookups only start once the match is known to exist.
    pub async fn resolve(
        &self,
        match_id: MatchId,
        player_ids: &[PlayerId],
    ) -> Result<Resolution, ResolveError> {
        let match_context = self.resolve_match(match_id).await?;
        let outcomes = self.resolve_players(player_ids).await;
        Ok(Resolution {
            match_context,
            outcomes,
        })
    }

    /// Fetch the match exactly once.
    ///
    /// A missing record and an unreachable service both end in
    /// `MatchNotFound`; nothing downstream means anything without the match.
    pub async fn resolve_match(&self, match_id: MatchId) -> Result<MatchContext, ResolveError> {
        match self.matches.fetch_match(match_id).await {
            Ok(Some(context)) => {
                debug!(match_id, ?context, "Resolved match context");
                Ok(context)
            }
            Ok(None) => {
                warn!(match_id, "Match service has no record");
                Err(ResolveError::MatchNotFound {
                    match_id,
                    reason: UnresolvedReason::NotFound,
                })
            }
            Err(e) => {
                warn!(match_id, error = %e, "Match lookup failed");
                Err(ResolveError::MatchNotFound {
                    match_id,
                    reason: UnresolvedReason::from_upstream(&e),
                })
            }
        }
    }

    /// Fetch stats for every distinct candidate.
    ///
    /// Duplicate ids collapse to their first occurrence. One outcome is
    /// returned per distinct id, in request order.
    pub async fn resolve_players(&self, player_ids: &[PlayerId]) -> Vec<PlayerOutcome> {
        let start_time = Instant::now();
        let ids = dedup_preserving_order(player_ids);
        if ids.len() != player_ids.len() {
            debug!(
                requested = player_ids.len(),
                distinct = ids.len(),
                "Collapsed duplicate player ids"
            );
        }

        // Completion order is free; each outcome is slotted back by its index
        let players = Arc::clone(&self.players);
        let mut indexed: Vec<(usize, PlayerOutcome)> = stream::iter(ids.into_iter().enumerate())
            .map(move |(index, player_id)| {
                let players = Arc::clone(&players);
                async move { (index, resolve_player(players, player_id).await) }
            })
            .buffer_unordered(self.max_in_flight)
            .collect()
            .await;
        indexed.sort_unstable_by_key(|(index, _)| *index);
        let outcomes: Vec<PlayerOutcome> =
            indexed.into_iter().map(|(_, outcome)| outcome).collect();

        let resolved = outcomes.iter().filter(|o| o.is_resolved()).count();
        info!(
            resolved,
            unresolved = outcomes.len() - resolved,
            "Resolved player contexts in {:.2?}",
            start_time.elapsed()
        );

        outcomes
    }
}

/// Fetch one player's stats and classify the result.
async fn resolve_player(
    players: Arc<dyn PlayerStatsProvider>,
    player_id: PlayerId,
) -> PlayerOutcome {
    match players.fetch_player_stats(player_id).await {
        Ok(Some(context)) => {
            debug!(player_id, ?context, "Resolved player context");
            PlayerOutcome::Resolved(context)
        }
        Ok(None) => {
            warn!(player_id, "Dropping player: no stats record");
            PlayerOutcome::unresolved(player_id, UnresolvedReason::NotFound)
        }
        Err(e) => {
            warn!(player_id, error = %e, "Dropping player: stats lookup failed");
            PlayerOutcome::unresolved(player_id, UnresolvedReason::from_upstream(&e))
        }
    }
}

/// Remove repeated ids, keeping the first occurrence of each.
pub fn dedup_preserving_order(ids: &[PlayerId]) -> Vec<PlayerId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
