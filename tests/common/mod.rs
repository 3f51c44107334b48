#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use follow_back::clock::Clock;
use follow_back::config::FollowRetryPolicy;
use follow_back::github::GitHubClient;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Virtual clock: `sleep` returns immediately, advances `now` and records the
/// requested duration.
pub struct MockClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl MockClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Utc::now()),
            sleeps: Mutex::new(Vec::new()),
        })
    }

    /// Unix timestamp `seconds` after the current virtual time.
    pub fn now_plus(&self, seconds: i64) -> i64 {
        (*self.now.lock().unwrap() + chrono::Duration::seconds(seconds)).timestamp()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.sleeps().iter().sum()
    }
}

#[async_trait]
impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        let mut now = self.now.lock().unwrap();
        *now = *now + chrono::Duration::from_std(duration).unwrap();
    }
}

pub struct TestContext {
    pub server: MockServer,
    pub clock: Arc<MockClock>,
    pub client: GitHubClient,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_follow_retry(FollowRetryPolicy::default()).await
    }

    pub async fn with_follow_retry(policy: FollowRetryPolicy) -> Self {
        let server = MockServer::start().await;
        let clock = MockClock::new();
        let client = GitHubClient::with_base_url("test_token".to_string(), &server.uri())
            .expect("Failed to create client")
            .with_clock(clock.clone())
            .with_follow_retry(policy);

        TestContext {
            server,
            clock,
            client,
        }
    }

    /// Mounts `pages` as pages 1..=n of `endpoint`, followed by an empty page.
    pub async fn mount_pages(&self, endpoint: &str, pages: Vec<Value>) {
        let count = pages.len();
        for (index, body) in pages.into_iter().enumerate() {
            Mock::given(method("GET"))
                .and(path(endpoint))
                .and(query_param("page", (index + 1).to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .expect(1)
                .mount(&self.server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path(endpoint))
            .and(query_param("page", (count + 1).to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Number of requests the server received for `endpoint`.
    pub async fn requests_to(&self, endpoint: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == endpoint)
            .count()
    }
}

pub fn users(logins: &[&str]) -> Value {
    Value::Array(
        logins
            .iter()
            .enumerate()
            .map(|(id, login)| json!({ "login": login, "id": id + 1, "type": "User" }))
            .collect(),
    )
}

pub fn repos(stars: &[u64]) -> Value {
    Value::Array(
        stars
            .iter()
            .enumerate()
            .map(|(i, count)| json!({ "name": format!("repo-{}", i), "stargazers_count": count }))
            .collect(),
    )
}

pub fn profile(login: &str, followers: u64) -> Value {
    json!({ "login": login, "followers": followers, "following": 3, "public_repos": 2 })
}
