use thiserror::Error;

#[derive(Error, Debug)]
pub enum FollowBackError {
    #[error("GitHub API error: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Environment error: {0}")]
    EnvError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, FollowBackError>;
