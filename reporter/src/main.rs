//! Work Reporter
//!
//! Team reporting over GitHub and Jira: issue searches, the weekly sprint
//! report and the weekly sprint rotation.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod config;
mod domain;
mod error;
mod report;

#[cfg(test)]
mod test_utils;


use adapters::{GitHubSearchClient, JiraAgileClient, NoopNotifier, SlackNotifier, SystemClock};
use app::{ReportScope, SearchAggregator, SprintRotator, WeeklyReportService};
use config::Config;
use domain::entities::{DateRange, SearchQuery};
use domain::ports::Notifier;

#[derive(Parser)]
#[command(name = "work-reporter", version, about = "Team reports over GitHub and Jira")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search GitHub issues and pull requests in the configured repositories
    Search(SearchArgs),
    /// Weekly sprint workflows
    Weekly {
        #[command(subcommand)]
        command: WeeklyCommand,
    },
}

#[derive(Args)]
struct SearchArgs {
    #[arg(value_enum)]
    kind: SearchKind,
    /// Range start, RFC 3339 or YYYY-MM-DD (defaults to one week ago)
    #[arg(long, value_parser = parse_timestamp)]
    since: Option<DateTime<Utc>>,
    /// Range end, RFC 3339 or YYYY-MM-DD
    #[arg(long, value_parser = parse_timestamp)]
    until: Option<DateTime<Utc>>,
    /// GitHub login (required for reviewed-prs)
    #[arg(long)]
    user: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum SearchKind {
    CreatedIssues,
    CreatedPrs,
    MergedPrs,
    ReviewedPrs,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum WeeklyCommand {
    /// Render the report of the last finished sprint and announce it
    Report {
        /// Write the report to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Close the active sprint and carry unfinished issues into the next one
    RotateSprint,
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
        .ok_or_else(|| format!("'{}' is neither RFC 3339 nor YYYY-MM-DD", value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the reports
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,work_reporter=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Invalid configuration")?;

    match cli.command {
        Command::Search(args) => run_search(&config, args).await,
        Command::Weekly {
            command: WeeklyCommand::Report { output },
        } => run_weekly_report(&config, output).await,
        Command::Weekly {
            command: WeeklyCommand::RotateSprint,
        } => run_rotate_sprint(&config).await,
    }
}

fn search_aggregator(
    config: &Config,
) -> anyhow::Result<SearchAggregator<GitHubSearchClient, SystemClock>> {
    let github = config.github()?;
    let client = GitHubSearchClient::new(
        github.api_url.clone(),
        github.token.clone(),
        config.http_timeout,
    )?;
    Ok(SearchAggregator::new(
        Arc::new(client),
        Arc::new(SystemClock),
        config.backoff,
    ))
}

fn jira_client(config: &Config) -> anyhow::Result<Arc<JiraAgileClient>> {
    let jira = config.jira()?;
    Ok(Arc::new(JiraAgileClient::new(
        jira.endpoint.clone(),
        jira.user.clone(),
        jira.password.clone(),
        jira.epic_fields.clone(),
        config.http_timeout,
    )?))
}

fn notifier(config: &Config) -> anyhow::Result<Arc<dyn Notifier>> {
    match &config.slack {
        Some(slack) => Ok(Arc::new(SlackNotifier::new(
            slack.api_url.clone(),
            slack.token.clone(),
            &slack.channel,
            slack.user.clone(),
            config.http_timeout,
        )?)),
        None => Ok(Arc::new(NoopNotifier)),
    }
}

async fn run_search(config: &Config, args: SearchArgs) -> anyhow::Result<()> {
    let repos = &config.github()?.repos;
    let since = match (args.since, args.until) {
        (None, None) => Some(Utc::now() - Duration::days(7)),
        (since, _) => since,
    };
    let range = DateRange::new(since, args.until)?;

    let query = match args.kind {
        SearchKind::CreatedIssues => SearchQuery::created_issues(repos, &range),
        SearchKind::CreatedPrs => SearchQuery::created_pull_requests(repos, &range),
        SearchKind::MergedPrs => SearchQuery::merged_pull_requests(repos, &range),
        SearchKind::ReviewedPrs => {
            let user = args
                .user
                .as_deref()
                .context("--user is required for reviewed-prs")?;
            SearchQuery::reviewed_pull_requests(repos, user, &range)
        }
    };

    let records = search_aggregator(config)?.search(&query).await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Markdown => print!("{}", report::render_issue_list(&records, &config.team)),
    }
    Ok(())
}

async fn run_weekly_report(config: &Config, output: Option<PathBuf>) -> anyhow::Result<()> {
    let jira = config.jira()?;
    let service = WeeklyReportService::new(
        search_aggregator(config)?,
        jira_client(config)?,
        Arc::new(SystemClock),
        ReportScope {
            repos: config.github()?.repos.clone(),
            team: config.team.clone(),
            oncall_project: jira.oncall_project.clone(),
        },
    );

    let weekly = service.build(&jira.project).await?;
    let markdown = report::render_weekly_report(&weekly);

    match output {
        Some(path) => {
            std::fs::write(&path, &markdown)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            tracing::info!(path = %path.display(), "Weekly report written");
        }
        None => print!("{}", markdown),
    }

    notifier(config)?
        .notify(&report::render_report_summary(&weekly))
        .await?;
    Ok(())
}

async fn run_rotate_sprint(config: &Config) -> anyhow::Result<()> {
    let jira = config.jira()?;
    let rotator = SprintRotator::new(jira_client(config)?, jira.closed_status.clone());

    let outcome = rotator.rotate(&jira.project).await?;
    let message = report::render_rotation_summary(&outcome);
    tracing::info!(
        closed = %outcome.closed.name,
        activated = %outcome.activated.name,
        created = outcome.created,
        resumed = outcome.resumed,
        moved = outcome.moved,
        "Sprint rotation complete"
    );
    println!("{}", message);

    notifier(config)?.notify(&message).await?;
    Ok(())
}
