use crate::config::{Comparison, RunConfig};
use crate::error::Result;
use crate::github::GitHubClient;
use crate::models::{CandidateDecision, FollowOutcome, RunSummary};
use crate::types::GitHubUser;
use colored::*;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};

/// Lowercased logins of `followers` that are absent from `following`.
///
/// Returned as an ordered set so candidates are processed alphabetically.
pub fn not_following_back(followers: &[GitHubUser], following: &[GitHubUser]) -> BTreeSet<String> {
    let following: HashSet<String> = following
        .iter()
        .map(|user| user.login.to_lowercase())
        .collect();

    followers
        .iter()
        .map(|user| user.login.to_lowercase())
        .filter(|login| !following.contains(login))
        .collect()
}

fn skip_message(username: &str, comparison: Comparison, minimum: u64, unit: &str) -> String {
    format!(
        "Skipping {} ({} {} {})",
        username,
        comparison.shortfall(),
        minimum,
        unit
    )
}

pub struct FollowBackRunner<'a> {
    client: &'a GitHubClient,
    config: RunConfig,
}

impl<'a> FollowBackRunner<'a> {
    pub fn new(client: &'a GitHubClient, config: RunConfig) -> Self {
        Self { client, config }
    }

    /// Follows back every follower of `login` that clears the thresholds.
    pub async fn run(&self, login: &str) -> Result<RunSummary> {
        let followers = self.client.list_followers(login).await?;
        let following = self.client.list_following(login).await?;
        let candidates = not_following_back(&followers, &following);

        info!(
            login,
            followers = followers.len(),
            following = following.len(),
            candidates = candidates.len(),
            "Computed follow-back candidates"
        );
        println!(
            "{} has {} followers, follows {}, {} not followed back",
            login.bold(),
            followers.len(),
            following.len(),
            candidates.len()
        );

        let mut summary = RunSummary {
            followers: followers.len(),
            following: following.len(),
            candidates: candidates.len(),
            ..Default::default()
        };

        let clock = self.client.clock();
        for candidate in &candidates {
            let decision = self.process_candidate(candidate).await?;
            summary.record(&decision);

            // Throttle between candidates whatever the outcome.
            clock.sleep(self.config.throttle).await;
        }

        print_summary(&summary);
        Ok(summary)
    }

    /// Follower check first; the star check (and its repository fetches) only
    /// runs for candidates that passed it.
    pub async fn process_candidate(&self, username: &str) -> Result<CandidateDecision> {
        let thresholds = &self.config.thresholds;

        let followers = self.client.follower_count(username).await?;
        println!("{} has {} followers.", username, followers);

        if !thresholds.passes_followers(followers) {
            println!(
                "{}",
                skip_message(username, thresholds.comparison, thresholds.min_followers, "followers")
                    .dimmed()
            );
            return Ok(CandidateDecision::TooFewFollowers { followers });
        }

        if let Some(min_stars) = thresholds.min_stars {
            let stars = self.client.total_stars(username).await?;
            println!("{} has {} total stars.", username, stars);

            if !thresholds.passes_stars(stars) {
                println!(
                    "{}",
                    skip_message(username, thresholds.comparison, min_stars, "stars").dimmed()
                );
                return Ok(CandidateDecision::TooFewStars { followers, stars });
            }
        }

        if self.config.dry_run {
            println!("{}", format!("Would follow {}", username).cyan());
            return Ok(CandidateDecision::WouldFollow);
        }

        let outcome = self.client.follow(username).await?;
        match &outcome {
            FollowOutcome::Followed => {
                println!("{}", format!("Successfully followed {}", username).green());
            }
            FollowOutcome::RateLimited { attempts } => {
                println!(
                    "{}",
                    format!(
                        "Failed to follow {}. Still rate limited after {} attempts",
                        username, attempts
                    )
                    .red()
                );
            }
            FollowOutcome::Failed { status, body } => {
                println!(
                    "{}",
                    format!(
                        "Failed to follow {}. Status Code: {} - {}",
                        username,
                        status.as_u16(),
                        body
                    )
                    .red()
                );
            }
        }
        debug!(username, ?outcome, "Follow attempt finished");

        Ok(CandidateDecision::Follow(outcome))
    }
}

fn print_summary(summary: &RunSummary) {
    println!("\n{}", "Follow-back summary:".bold());
    println!("Candidates: {}", summary.candidates);
    println!("Followed: {}", summary.followed.to_string().green());
    if summary.would_follow > 0 {
        println!("Would follow (dry run): {}", summary.would_follow);
    }
    println!("Skipped (followers): {}", summary.skipped_followers);
    println!("Skipped (stars): {}", summary.skipped_stars);
    if summary.failed > 0 {
        println!("Failed: {}", summary.failed.to_string().red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(login: &str) -> GitHubUser {
        GitHubUser {
            login: login.to_string(),
        }
    }

    #[test]
    fn test_not_following_back_normalizes_case() {
        let followers = vec![user("bob"), user("Carol")];
        let following = vec![user("BOB")];

        let candidates = not_following_back(&followers, &following);
        assert_eq!(candidates.into_iter().collect::<Vec<_>>(), vec!["carol"]);
    }

    #[test]
    fn test_not_following_back_collapses_duplicates() {
        let followers = vec![user("Dave"), user("dave"), user("erin")];
        let candidates = not_following_back(&followers, &[]);
        assert_eq!(candidates.len(), 2);
        assert!(candidates.contains("dave"));
        assert!(candidates.contains("erin"));
    }

    #[test]
    fn test_skip_message_follows_comparison() {
        assert_eq!(
            skip_message("carol", Comparison::Inclusive, 100, "followers"),
            "Skipping carol (less than 100 followers)"
        );
        assert_eq!(
            skip_message("carol", Comparison::Strict, 50, "stars"),
            "Skipping carol (not more than 50 stars)"
        );
    }

    #[test]
    fn test_not_following_back_empty_followers() {
        assert!(not_following_back(&[], &[user("bob")]).is_empty());
    }
}
