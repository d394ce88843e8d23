//! # Recommendation Orchestrator
//!
//! This module coordinates one recommendation request end to end:
//! 1. Resolve the match (fatal if missing)
//! 2. Check that a scoring model is bound (fatal if not)
//! 3. Resolve every candidate's stats concurrently
//! 4. Build feature vectors for the resolved players
//! 5. Score each player, dropping players the model cannot score
//! 6. Round, rank, and return the ranked list plus the dropped players
//!
//! The orchestrator holds no per-request state; every call is an independent
//! run through the pipeline.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use pipeline::{FeatureBuilder, Recommendation, rank};
use resolver::{CandidateResolver, PlayerOutcome, UnresolvedPlayer, UnresolvedReason};
use scoring::ScoringPort;
use upstream::{
    HttpRecordFetcher, MatchContext, MatchId, MatchServiceClient, PlayerContext, PlayerId,
    TeamServiceClient,
};

use crate::config::Settings;

/// Failures that abort a whole request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    #[error("Match with ID {match_id} not found.")]
    MatchNotFound { match_id: MatchId },

    #[error("Model is not loaded. The service cannot score players until a model is bound.")]
    ModelNotReady,
}

/// Outcome of a successful request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationReport {
    pub match_id: MatchId,
    /// Scored players, highest first, ties in request order
    pub recommendations: Vec<Recommendation>,
    /// Players left out of the ranking and why
    pub unresolved: Vec<UnresolvedPlayer>,
}

/// Main orchestrator that coordinates the recommendation pipeline
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    resolver: CandidateResolver,
    feature_builder: FeatureBuilder,
    scoring: Arc<ScoringPort>,
}

impl RecommendationOrchestrator {
    pub fn new(resolver: CandidateResolver, scoring: Arc<ScoringPort>) -> Self {
        Self {
            resolver,
            feature_builder: FeatureBuilder::new(),
            scoring,
        }
    }

    /// Create an orchestrator that talks to the HTTP services in `settings`.
    ///
    /// Both service clients share one connection pool.
    pub fn from_settings(settings: &Settings, scoring: Arc<ScoringPort>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fantasy-recs/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Building upstream HTTP client")?;

        let matches = MatchServiceClient::new(HttpRecordFetcher::new(
            client.clone(),
            &settings.match_service_url,
            settings.upstream_timeout,
        ));
        let players = TeamServiceClient::new(HttpRecordFetcher::new(
            client,
            &settings.team_service_url,
            settings.upstream_timeout,
        ));

        info!(
            match_service = %settings.match_service_url,
            team_service = %settings.team_service_url,
            timeout = ?settings.upstream_timeout,
            "Configured upstream services"
        );

        let resolver = CandidateResolver::new(Arc::new(matches), Arc::new(players))
            .with_max_in_flight(settings.max_concurrent_fetches);
        Ok(Self::new(resolver, scoring))
    }

    /// The scoring port this orchestrator scores through
    pub fn scoring(&self) -> &ScoringPort {
        &self.scoring
    }

    /// The resolver this orchestrator fetches through
    pub fn resolver(&self) -> &CandidateResolver {
        &self.resolver
    }

    /// Main entry point: rank `player_ids` for `match_id`.
    ///
    /// # Returns
    /// A report whose `recommendations` are sorted by score (highest first)
    /// and whose `unresolved` lists every dropped player.
    pub async fn recommend(
        &self,
        match_id: MatchId,
        player_ids: &[PlayerId],
    ) -> Result<RecommendationReport, RecommendError> {
        let start_time = Instant::now();

        let match_context = self.resolver.resolve_match(match_id).await.map_err(|e| {
            warn!("{}", e);
            RecommendError::MatchNotFound { match_id }
        })?;

        if !self.scoring.is_ready() {
            error!(match_id, "Recommendation requested before a model was bound");
            return Err(RecommendError::ModelNotReady);
        }

        let outcomes = self.resolver.resolve_players(player_ids).await;
        let (resolved, mut unresolved) = partition_outcomes(outcomes);

        let recommendations = self.score_players(&match_context, &resolved, &mut unresolved)?;
        let recommendations = rank(recommendations);

        info!(
            match_id,
            requested = player_ids.len(),
            recommended = recommendations.len(),
            dropped = unresolved.len(),
            "Total time to recommend players: {:.2?}",
            start_time.elapsed()
        );

        Ok(RecommendationReport {
            match_id,
            recommendations,
            unresolved,
        })
    }

    /// Build features and score every resolved player.
    ///
    /// A player the model cannot score is appended to `unresolved`. An
    /// unbound model aborts the whole batch.
    fn score_players(
        &self,
        match_context: &MatchContext,
        resolved: &[PlayerContext],
        unresolved: &mut Vec<UnresolvedPlayer>,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        let features = self.feature_builder.build_all(match_context, resolved);
        let mut recommendations = Vec::with_capacity(features.len());

        for (player_id, vector) in features {
            match self.scoring.score(&vector) {
                Ok(score) => recommendations.push(Recommendation::new(player_id, score)),
                Err(e) if e.is_fatal() => {
                    error!(player_id, "Scoring model became unavailable mid-request");
                    return Err(RecommendError::ModelNotReady);
                }
                Err(e) => {
                    warn!(player_id, error = %e, "Dropping player: scoring failed");
                    unresolved.push(UnresolvedPlayer {
                        player_id,
                        reason: UnresolvedReason::ScoringFailed {
                            detail: e.to_string(),
                        },
                    });
                }
            }
        }

        Ok(recommendations)
    }
}

/// Split outcomes into resolved contexts and dropped players, keeping order.
fn partition_outcomes(
    outcomes: Vec<PlayerOutcome>,
) -> (Vec<PlayerContext>, Vec<UnresolvedPlayer>) {
    let mut resolved = Vec::with_capacity(outcomes.len());
    let mut unresolved = Vec::new();
    for outcome in outcomes {
        match outcome {
            PlayerOutcome::Resolved(context) => resolved.push(context),
            PlayerOutcome::Unresolved(player) => unresolved.push(player),
        }
    }
    (resolved, unresolved)
}
