use crate::clock::{wait_until, Clock, SystemClock};
use crate::config::FollowRetryPolicy;
use crate::error::{FollowBackError, Result};
use crate::models::{header_value, FollowOutcome, RateLimitState};
use crate::types::{GitHubProfile, GitHubRepo, GitHubUser};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const API_BASE_URL: &str = "https://api.github.com";
pub const PER_PAGE: u32 = 100;
const RETRY_AFTER: &str = "Retry-After";

/// Authenticated GitHub REST client. Requests are issued one at a time; every
/// rate-limit pause goes through the injected [`Clock`].
pub struct GitHubClient {
    client: Client,
    token: String,
    base_url: Url,
    clock: Arc<dyn Clock>,
    follow_retry: FollowRetryPolicy,
}

impl GitHubClient {
    pub fn new(token: String) -> Result<Self> {
        Self::with_base_url(token, API_BASE_URL)
    }

    pub fn with_base_url(token: String, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(FollowBackError::ConfigError(format!(
                "API URL cannot be used as a base: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .user_agent("follow-back/0.1.0")
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(GitHubClient {
            client,
            token,
            base_url,
            clock: Arc::new(SystemClock),
            follow_retry: FollowRetryPolicy::default(),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_follow_retry(mut self, policy: FollowRetryPolicy) -> Self {
        self.follow_retry = policy;
        self
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Builds `{base}/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                FollowBackError::ConfigError(format!("Invalid API base URL: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(ACCEPT, "application/vnd.github.v3+json")
            .header(AUTHORIZATION, format!("token {}", self.token))
    }

    /// How long to back off for a rate-limited response, or `None` when the
    /// response is not a rate-limit signal.
    fn rate_limit_wait(
        &self,
        status: StatusCode,
        response: &Response,
        rate_limit: Option<&RateLimitState>,
    ) -> Option<Duration> {
        if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
            return None;
        }

        if let Some(state) = rate_limit.filter(|state| state.is_limited) {
            return Some(wait_until(self.clock.now(), state.reset_time));
        }

        // Secondary rate limits only carry Retry-After.
        header_value::<u64>(response.headers(), RETRY_AFTER).map(Duration::from_secs)
    }

    async fn get(&self, url: &Url, query: &[(&str, u32)]) -> Result<Response> {
        loop {
            let response = self
                .authorized(self.client.get(url.clone()))
                .query(query)
                .send()
                .await?;

            let status = response.status();
            let rate_limit = RateLimitState::from_headers(response.headers(), self.clock.now());

            if status.is_success() {
                if let Some(state) = rate_limit.filter(|state| state.is_limited) {
                    let wait = wait_until(self.clock.now(), state.reset_time);
                    warn!(
                        limit = state.limit,
                        "Rate limit will reset in {} seconds. Pausing...",
                        wait.as_secs()
                    );
                    self.clock.sleep(wait).await;
                }
                return Ok(response);
            }

            if let Some(wait) = self.rate_limit_wait(status, &response, rate_limit.as_ref()) {
                warn!(%url, %status, "Rate limit reached. Sleeping for {} seconds...", wait.as_secs());
                self.clock.sleep(wait).await;
                continue;
            }

            return match status {
                StatusCode::NOT_FOUND => {
                    Err(FollowBackError::NotFound(format!("Resource not found: {}", url)))
                }
                StatusCode::TOO_MANY_REQUESTS => Err(FollowBackError::RateLimitExceeded(format!(
                    "{} answered 429 without a reset time",
                    url
                ))),
                StatusCode::FORBIDDEN => {
                    let error_text = response.text().await.unwrap_or_default();
                    Err(FollowBackError::ApiError(format!("Forbidden: {}", error_text)))
                }
                status => {
                    let error_text = response.text().await.unwrap_or_default();
                    Err(FollowBackError::ApiError(format!(
                        "API request failed with status {}: {}",
                        status, error_text
                    )))
                }
            };
        }
    }

    /// Collects every page of a JSON array resource, stopping at the first
    /// empty page.
    pub async fn fetch_paginated<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Vec<T>> {
        let url = self.endpoint(segments)?;
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let response = self
                .get(&url, &[("per_page", PER_PAGE), ("page", page)])
                .await?;
            let body = response.bytes().await?;
            let page_items: Vec<T> = serde_json::from_slice(&body)?;

            if page_items.is_empty() {
                break;
            }

            debug!(%url, page, count = page_items.len(), "Fetched page");
            items.extend(page_items);
            page += 1;
        }

        Ok(items)
    }

    pub async fn list_repositories(&self, login: &str) -> Result<Vec<GitHubRepo>> {
        self.fetch_paginated(&["users", login, "repos"]).await
    }

    pub async fn list_followers(&self, login: &str) -> Result<Vec<GitHubUser>> {
        self.fetch_paginated(&["users", login, "followers"]).await
    }

    pub async fn list_following(&self, login: &str) -> Result<Vec<GitHubUser>> {
        self.fetch_paginated(&["users", login, "following"]).await
    }

    pub async fn follower_count(&self, login: &str) -> Result<u64> {
        let url = self.endpoint(&["users", login])?;
        let response = self.get(&url, &[]).await?;
        let body = response.bytes().await?;
        let profile: GitHubProfile = serde_json::from_slice(&body)?;
        Ok(profile.followers)
    }

    /// Sum of `stargazers_count` over every repository the user owns.
    pub async fn total_stars(&self, login: &str) -> Result<u64> {
        let repos = self.list_repositories(login).await?;
        Ok(repos.iter().map(|repo| repo.stargazers_count).sum())
    }

    /// Follows `login` as the authenticated user.
    ///
    /// Rate-limited answers are retried after a fixed delay, up to
    /// `max_attempts` requests in total. Any status other than 204 or a rate
    /// limit is reported as [`FollowOutcome::Failed`] without retrying.
    pub async fn follow(&self, login: &str) -> Result<FollowOutcome> {
        let url = self.endpoint(&["user", "following", login])?;
        let max_attempts = self.follow_retry.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let response = self
                .authorized(self.client.put(url.clone()))
                .header(CONTENT_LENGTH, 0)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::NO_CONTENT {
                info!(login, attempt, "Followed user");
                return Ok(FollowOutcome::Followed);
            }

            let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
                || (status == StatusCode::FORBIDDEN
                    && RateLimitState::from_headers(response.headers(), self.clock.now())
                        .is_some_and(|state| state.is_limited));

            if !rate_limited {
                let body = response.text().await.unwrap_or_default();
                return Ok(FollowOutcome::Failed { status, body });
            }

            if attempt < max_attempts {
                warn!(
                    login,
                    attempt,
                    max_attempts,
                    "Follow rate limited. Retrying in {} seconds...",
                    self.follow_retry.retry_delay.as_secs()
                );
                self.clock.sleep(self.follow_retry.retry_delay).await;
            }
        }

        warn!(login, max_attempts, "Giving up on follow, still rate limited");
        Ok(FollowOutcome::RateLimited {
            attempts: max_attempts,
        })
    }
}
