//! HTTP client for the Riot Games API

use super::dto::{LeagueItemDto, LeagueListDto, MatchDto, TimelineDto};
use super::MatchSource;
use crate::error::SourceError;
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tierforge_common::config::ApiConfig;

const TOKEN_HEADER: &str = "X-Riot-Token";

/// Riot Games API client
///
/// Performs exactly one HTTP request per call; pacing and retries belong to
/// [`super::PacedSource`].
pub struct RiotClient {
    http_client: Client,
    api_key: String,
    platform_base_url: String,
    regional_base_url: String,
    versions_url: String,
}

impl RiotClient {
    pub fn new(api: &ApiConfig, api_key: String) -> Result<Self, SourceError> {
        let http_client = Client::builder()
            .timeout(api.request_timeout())
            .connect_timeout(api.connect_timeout())
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            platform_base_url: api.platform_base_url.trim_end_matches('/').to_string(),
            regional_base_url: api.regional_base_url.trim_end_matches('/').to_string(),
            versions_url: api.versions_url.clone(),
        })
    }

    /// Authenticated request against the game API
    fn api_request(&self, url: &str, query: &[(&str, String)]) -> RequestBuilder {
        self.http_client
            .get(url)
            .header(TOKEN_HEADER, &self.api_key)
            .query(query)
    }

    /// Request to a public endpoint, sent without the API key
    fn public_request(&self, url: &str) -> RequestBuilder {
        self.http_client.get(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        fetch_json(url, self.api_request(url, query)).await
    }
}

async fn fetch_json<T: DeserializeOwned>(
    url: &str,
    request: RequestBuilder,
) -> Result<T, SourceError> {
    tracing::debug!(url = %url, "Querying upstream");

    let response = request
        .send()
        .await
        .map_err(|e| SourceError::Transport(e.to_string()))?;

    let response = check_status(url, response).await?;

    response
        .json::<T>()
        .await
        .map_err(|e| SourceError::Malformed(e.to_string()))
}

/// Map a non-success status to the error taxonomy
async fn check_status(url: &str, response: Response) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(parse_retry_after);
            Err(SourceError::RateLimited { retry_after })
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(SourceError::Forbidden(status.as_u16()))
        }
        StatusCode::NOT_FOUND => Err(SourceError::NotFound(url.to_string())),
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(SourceError::Http {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Retry-After in delta-seconds form
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[async_trait]
impl MatchSource for RiotClient {
    async fn league_entries(
        &self,
        tier: &str,
        queue: &str,
    ) -> Result<Vec<LeagueItemDto>, SourceError> {
        let url = format!(
            "{}/lol/league/v4/{}leagues/by-queue/{}",
            self.platform_base_url,
            tier.to_lowercase(),
            queue
        );
        let list: LeagueListDto = self.get_json(&url, &[]).await?;
        Ok(list.entries)
    }

    async fn match_ids(
        &self,
        entity_id: &str,
        queue_id: u32,
        start: u32,
        count: u32,
    ) -> Result<Vec<String>, SourceError> {
        let url = format!(
            "{}/lol/match/v5/matches/by-puuid/{}/ids",
            self.regional_base_url, entity_id
        );
        let query = [
            ("queue", queue_id.to_string()),
            ("start", start.to_string()),
            ("count", count.to_string()),
        ];
        self.get_json(&url, &query).await
    }

    async fn match_detail(&self, match_id: &str) -> Result<MatchDto, SourceError> {
        let url = format!("{}/lol/match/v5/matches/{}", self.regional_base_url, match_id);
        self.get_json(&url, &[]).await
    }

    async fn match_timeline(&self, match_id: &str) -> Result<TimelineDto, SourceError> {
        let url = format!(
            "{}/lol/match/v5/matches/{}/timeline",
            self.regional_base_url, match_id
        );
        self.get_json(&url, &[]).await
    }

    async fn versions(&self) -> Result<Vec<String>, SourceError> {
        fetch_json(&self.versions_url, self.public_request(&self.versions_url)).await
    }
}
