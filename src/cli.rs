use crate::config::{Comparison, FollowRetryPolicy, RunConfig, Thresholds};
use crate::error::{FollowBackError, Result};
use crate::github::API_BASE_URL;
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "follow-back")]
#[command(about = "Follow back your GitHub followers who meet the specified criteria")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Your GitHub username
    pub github_username: String,

    /// Minimum number of followers a user must have
    pub min_followers: u64,

    /// Minimum number of total stars a user must have (no star check when omitted)
    pub min_stars: Option<u64>,

    /// GitHub personal access token
    #[arg(long, env = "USER_TOKEN", hide_env_values = true)]
    pub token: String,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = API_BASE_URL)]
    pub api_url: String,

    /// Require counts strictly above the thresholds instead of at least equal
    #[arg(long)]
    pub strict: bool,

    /// Report who would be followed without following anyone
    #[arg(long)]
    pub dry_run: bool,

    /// Seconds to wait between two candidates
    #[arg(long, default_value_t = 1)]
    pub throttle_secs: u64,

    /// Follow requests to try per user while rate limited
    #[arg(long, default_value_t = 5)]
    pub max_follow_attempts: u32,

    /// Seconds to wait before retrying a rate-limited follow
    #[arg(long, default_value_t = 60)]
    pub follow_retry_secs: u64,
}

impl Cli {
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(FollowBackError::EnvError(
                "USER_TOKEN is empty; set it to a GitHub personal access token".to_string(),
            ));
        }
        if self.github_username.trim().is_empty() {
            return Err(FollowBackError::ConfigError(
                "GitHub username must not be empty".to_string(),
            ));
        }
        if self.max_follow_attempts == 0 {
            return Err(FollowBackError::ConfigError(
                "--max-follow-attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn run_config(&self) -> RunConfig {
        let comparison = if self.strict {
            Comparison::Strict
        } else {
            Comparison::Inclusive
        };

        RunConfig {
            thresholds: Thresholds::new(self.min_followers, self.min_stars)
                .with_comparison(comparison),
            throttle: Duration::from_secs(self.throttle_secs),
            dry_run: self.dry_run,
        }
    }

    pub fn follow_retry(&self) -> FollowRetryPolicy {
        FollowRetryPolicy {
            max_attempts: self.max_follow_attempts,
            retry_delay: Duration::from_secs(self.follow_retry_secs),
        }
    }
}
