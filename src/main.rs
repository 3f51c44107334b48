use anyhow::Context;
use clap::Parser;
use colored::*;
use follow_back::cli::Cli;
use follow_back::github::GitHubClient;
use follow_back::runner::FollowBackRunner;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    // Progress goes to stdout, diagnostics to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli.validate()?;

    println!("{}", "GitHub Follow Back".bold().green());
    println!("{}\n", "=".repeat(50).dimmed());

    if cli.dry_run {
        println!("{}", "Dry run: nobody will be followed".yellow());
    }

    let client = GitHubClient::with_base_url(cli.token.clone(), &cli.api_url)
        .context("Failed to create GitHub client")?
        .with_follow_retry(cli.follow_retry());

    let runner = FollowBackRunner::new(&client, cli.run_config());
    runner
        .run(&cli.github_username)
        .await
        .with_context(|| format!("Follow-back run for {} failed", cli.github_username))?;

    Ok(())
}
