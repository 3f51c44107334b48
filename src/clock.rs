use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Time source and sleep primitive used for every backoff and throttle.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by tokio's timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How long to wait from `now` until `reset`, plus one second of slack since
/// the reset header has second resolution. A reset already in the past still
/// waits the slack.
pub fn wait_until(now: DateTime<Utc>, reset: DateTime<Utc>) -> Duration {
    (reset - now).to_std().unwrap_or(Duration::ZERO) + Duration::from_secs(1)
}
