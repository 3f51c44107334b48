use std::time::Duration;

/// How a measured value is compared against its threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Comparison {
    /// `value >= minimum`
    #[default]
    Inclusive,
    /// `value > minimum`
    Strict,
}

impl Comparison {
    pub fn passes(self, value: u64, minimum: u64) -> bool {
        match self {
            Comparison::Inclusive => value >= minimum,
            Comparison::Strict => value > minimum,
        }
    }

    /// Phrase for a value that fails this comparison, e.g. "less than".
    pub fn shortfall(self) -> &'static str {
        match self {
            Comparison::Inclusive => "less than",
            Comparison::Strict => "not more than",
        }
    }
}

/// Popularity thresholds a candidate has to clear before being followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thresholds {
    pub min_followers: u64,
    /// `None` disables the star check and its repository fetches.
    pub min_stars: Option<u64>,
    pub comparison: Comparison,
}

impl Thresholds {
    pub fn new(min_followers: u64, min_stars: Option<u64>) -> Self {
        Self {
            min_followers,
            min_stars,
            comparison: Comparison::default(),
        }
    }

    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self
    }

    pub fn passes_followers(&self, followers: u64) -> bool {
        self.comparison.passes(followers, self.min_followers)
    }

    pub fn passes_stars(&self, stars: u64) -> bool {
        match self.min_stars {
            Some(min_stars) => self.comparison.passes(stars, min_stars),
            None => true,
        }
    }
}

/// Retry policy for the follow write when GitHub answers with a rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowRetryPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for FollowRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub thresholds: Thresholds,
    /// Pause between two candidates.
    pub throttle: Duration,
    pub dry_run: bool,
}

impl RunConfig {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            throttle: Duration::from_secs(1),
            dry_run: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusive_accepts_equal() {
        let thresholds = Thresholds::new(100, Some(50));
        assert!(thresholds.passes_followers(100));
        assert!(thresholds.passes_stars(50));
        assert!(!thresholds.passes_followers(99));
        assert!(!thresholds.passes_stars(49));
    }

    #[test]
    fn test_strict_rejects_equal() {
        let thresholds = Thresholds::new(100, Some(50)).with_comparison(Comparison::Strict);
        assert!(!thresholds.passes_followers(100));
        assert!(thresholds.passes_followers(101));
        assert!(!thresholds.passes_stars(50));
        assert!(thresholds.passes_stars(51));
    }

    #[test]
    fn test_shortfall_wording() {
        assert_eq!(Comparison::Inclusive.shortfall(), "less than");
        assert_eq!(Comparison::Strict.shortfall(), "not more than");
    }

    #[test]
    fn test_missing_star_threshold_always_passes() {
        let thresholds = Thresholds::new(10, None);
        assert!(thresholds.passes_stars(0));
    }

    #[test]
    fn test_follow_retry_defaults() {
        let policy = FollowRetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.retry_delay, Duration::from_secs(60));
    }
}
