use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

pub const HEADER_REMAINING: &str = "X-RateLimit-Remaining";
pub const HEADER_LIMIT: &str = "X-RateLimit-Limit";
pub const HEADER_RESET: &str = "X-RateLimit-Reset";

/// Rate limit state reported by a response
#[derive(Debug, Clone)]
pub struct RateLimitState {
    pub remaining: u32,
    pub limit: u32,
    pub reset_time: DateTime<Utc>,
    pub is_limited: bool,
}

impl RateLimitState {
    /// Parses the `X-RateLimit-*` headers. Returns `None` when the response
    /// carries no remaining-quota header at all.
    pub fn from_headers(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Self> {
        let remaining = header_value::<u32>(headers, HEADER_REMAINING)?;

        let limit = header_value::<u32>(headers, HEADER_LIMIT).unwrap_or(5000);

        let reset_time = header_value::<i64>(headers, HEADER_RESET)
            .and_then(|timestamp| DateTime::from_timestamp(timestamp, 0))
            .unwrap_or_else(|| now + chrono::Duration::hours(1));

        Some(RateLimitState {
            remaining,
            limit,
            reset_time,
            is_limited: remaining == 0,
        })
    }
}

pub(crate) fn header_value<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<T>().ok())
}

/// Result of a single follow action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    /// Still rate limited after every allowed attempt.
    RateLimited { attempts: u32 },
    Failed { status: StatusCode, body: String },
}

impl FollowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FollowOutcome::Followed)
    }
}

/// What the runner did with one follow-back candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateDecision {
    TooFewFollowers { followers: u64 },
    TooFewStars { followers: u64, stars: u64 },
    WouldFollow,
    Follow(FollowOutcome),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub followers: usize,
    pub following: usize,
    pub candidates: usize,
    pub followed: usize,
    pub would_follow: usize,
    pub skipped_followers: usize,
    pub skipped_stars: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, decision: &CandidateDecision) {
        match decision {
            CandidateDecision::TooFewFollowers { .. } => self.skipped_followers += 1,
            CandidateDecision::TooFewStars { .. } => self.skipped_stars += 1,
            CandidateDecision::WouldFollow => self.would_follow += 1,
            CandidateDecision::Follow(FollowOutcome::Followed) => self.followed += 1,
            CandidateDecision::Follow(_) => self.failed += 1,
        }
    }
}
