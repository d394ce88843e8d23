//! In-memory providers.
//!
//! `InMemoryProvider` implements both provider traits over fixed maps. It is
//! used for offline CLI runs and as the test double for everything that sits
//! on top of the providers. Players can be marked as failing or slow, and the
//! provider counts every lookup it serves.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::client::{MatchDataProvider, PlayerStatsProvider};
use crate::error::{Result, UpstreamError};
use crate::types::{MatchContext, MatchId, PlayerContext, PlayerId};

/// Fixed set of matches and players served from memory
#[derive(Default)]
pub struct InMemoryProvider {
    matches: HashMap<MatchId, MatchContext>,
    players: HashMap<PlayerId, PlayerContext>,
    failing_players: HashSet<PlayerId>,
    delays: HashMap<PlayerId, Duration>,
    match_fetches: AtomicUsize,
    player_fetches: AtomicUsize,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match(mut self, context: MatchContext) -> Self {
        self.matches.insert(context.match_id, context);
        self
    }

    pub fn with_player(mut self, context: PlayerContext) -> Self {
        self.players.insert(context.player_id, context);
        self
    }

    /// Make every stats lookup for `player_id` fail as if the service were down.
    pub fn with_failing_player(mut self, player_id: PlayerId) -> Self {
        self.failing_players.insert(player_id);
        self
    }

    /// Delay the stats lookup for `player_id`.
    pub fn with_delay(mut self, player_id: PlayerId, delay: Duration) -> Self {
        self.delays.insert(player_id, delay);
        self
    }

    /// Number of match lookups served so far
    pub fn match_fetches(&self) -> usize {
        self.match_fetches.load(Ordering::SeqCst)
    }

    /// Number of player lookups served so far
    pub fn player_fetches(&self) -> usize {
        self.player_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatchDataProvider for InMemoryProvider {
    async fn fetch_match(&self, match_id: MatchId) -> Result<Option<MatchContext>> {
        self.match_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.matches.get(&match_id).cloned())
    }
}

#[async_trait]
impl PlayerStatsProvider for InMemoryProvider {
    async fn fetch_player_stats(&self, player_id: PlayerId) -> Result<Option<PlayerContext>> {
        self.player_fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(&player_id) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing_players.contains(&player_id) {
            return Err(UpstreamError::Status {
                url: format!("memory://players/{}/stats", player_id),
                status: 503,
            });
        }

        Ok(self.players.get(&player_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_provider_serves_and_counts() {
        let provider = InMemoryProvider::new()
            .with_match(MatchContext::new(1).with_conditions(1.0, 0.0))
            .with_player(PlayerContext::new(5).with_avg_points(50.0))
            .with_failing_player(6);

        assert!(provider.fetch_match(1).await.unwrap().is_some());
        assert!(provider.fetch_match(2).await.unwrap().is_none());
        assert!(provider.fetch_player_stats(5).await.unwrap().is_some());
        assert!(provider.fetch_player_stats(99).await.unwrap().is_none());
        assert!(provider.fetch_player_stats(6).await.is_err());

        assert_eq!(provider.match_fetches(), 2);
        assert_eq!(provider.player_fetches(), 3);
    }
}
