//! Provider traits and their HTTP implementations.
//!
//! The recommender only needs two lookups from the outside world: match
//! conditions and player statistics. Both are expressed as traits so the
//! resolver can be driven by the real services, the in-memory provider, or a
//! test double.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::error::{Result, UpstreamError};
use crate::parser::{self, Record};
use crate::types::{MatchContext, MatchId, PlayerContext, PlayerId};

/// Source of match conditions.
#[async_trait]
pub trait MatchDataProvider: Send + Sync {
    /// Fetch the conditions for a match.
    ///
    /// # Returns
    /// * `Ok(Some(context))` - The match exists
    /// * `Ok(None)` - The service has no record for this match
    /// * `Err` - The service could not be reached or answered garbage
    async fn fetch_match(&self, match_id: MatchId) -> Result<Option<MatchContext>>;
}

/// Source of per-player historical statistics.
#[async_trait]
pub trait PlayerStatsProvider: Send + Sync {
    /// Fetch the stats for one player, with the same contract as
    /// [`MatchDataProvider::fetch_match`].
    async fn fetch_player_stats(&self, player_id: PlayerId) -> Result<Option<PlayerContext>>;
}

/// Issues bounded GET requests against one service base URL.
#[derive(Clone)]
pub struct HttpRecordFetcher {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpRecordFetcher {
    /// Create a fetcher for a base URL such as `http://localhost:8001/api/v1`.
    ///
    /// The `client` can be shared between fetchers; each request carries its
    /// own `timeout`.
    pub fn new(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}{path}` and decode the body.
    ///
    /// A 404 or an empty body yields `Ok(None)`.
    pub async fn fetch(&self, path: &str) -> Result<Option<Record>> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Fetching upstream record");

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(&url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(url = %url, "Upstream has no record");
            return Ok(None);
        }
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Upstream returned an error status");
            return Err(UpstreamError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.classify(&url, e))?;

        parser::parse_record(&url, &body)
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout {
                url: url.to_string(),
                timeout_ms: self.timeout.as_millis(),
            }
        } else {
            UpstreamError::Transport {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

/// Client for the match service (`GET {base}/matches/{match_id}`).
#[derive(Clone)]
pub struct MatchServiceClient {
    fetcher: HttpRecordFetcher,
}

impl MatchServiceClient {
    pub fn new(fetcher: HttpRecordFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl MatchDataProvider for MatchServiceClient {
    async fn fetch_match(&self, match_id: MatchId) -> Result<Option<MatchContext>> {
        let record = self.fetcher.fetch(&format!("/matches/{}", match_id)).await?;
        Ok(record.map(|r| parser::match_from_record(match_id, &r)))
    }
}

/// Client for the team service (`GET {base}/players/{player_id}/stats`).
#[derive(Clone)]
pub struct TeamServiceClient {
    fetcher: HttpRecordFetcher,
}

impl TeamServiceClient {
    pub fn new(fetcher: HttpRecordFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl PlayerStatsProvider for TeamServiceClient {
    async fn fetch_player_stats(&self, player_id: PlayerId) -> Result<Option<PlayerContext>> {
        let record = self
            .fetcher
            .fetch(&format!("/players/{}/stats", player_id))
            .await?;
        Ok(record.map(|r| parser::player_from_record(player_id, &r)))
    }
}
