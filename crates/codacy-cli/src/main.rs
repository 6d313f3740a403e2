//! Codacy Status CLI
//!
//! The `codacy` command evaluates the quality and coverage status of a
//! commit or pull request, either from a saved JSON snapshot or live from
//! the Codacy API.
//!
//! ## Commands
//!
//! - `commit`: Evaluate a commit snapshot file
//! - `pull-request`: Evaluate a pull-request snapshot file
//! - `fetch`: Fetch snapshots from the Codacy API and evaluate them

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use codacy_client::{capture_remote_url, ClientConfig, CodacyClient, RepositoryRef};
use codacy_core::{
    emit_fetch_failed, emit_status_evaluated, load_commit_snapshot, load_coverage_reports,
    load_pull_request_snapshot, render_status_line, render_status_markdown,
    write_status_report_json, AnalysisContext, CoveragePullRequestResponse, StatusReport,
    SubjectSpan,
};

/// Page size used when listing pull requests.
const DEFAULT_LIST_LIMIT: u32 = 50;

#[derive(Parser)]
#[command(name = "codacy")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Codacy commit and pull-request status", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// How to render statuses on stdout
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Also write the status report as JSON to this path
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a commit snapshot (CommitWithAnalysis JSON)
    Commit {
        /// Path to the snapshot file
        #[arg(short, long)]
        file: PathBuf,

        /// Coverage is expected for this repository
        #[arg(long)]
        expect_coverage: bool,
    },

    /// Evaluate a pull-request snapshot (PullRequestWithAnalysis JSON)
    PullRequest {
        /// Path to the snapshot file
        #[arg(short, long)]
        file: PathBuf,

        /// Path to the pull request's coverage reports response
        #[arg(short, long)]
        reports: Option<PathBuf>,

        /// Coverage is expected for this repository
        #[arg(long)]
        expect_coverage: bool,
    },

    /// Fetch snapshots from the Codacy API and evaluate them
    Fetch {
        #[command(flatten)]
        api: ApiArgs,

        #[command(subcommand)]
        target: FetchTarget,
    },
}

#[derive(Args)]
struct ApiArgs {
    /// Codacy API token
    #[arg(long, env = "CODACY_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Codacy API root
    #[arg(long, env = "CODACY_API_BASE_URL", default_value = codacy_client::DEFAULT_BASE_URL)]
    base_url: String,

    /// Repository as provider/organization/repository (e.g. gh/acme/widgets)
    #[arg(long)]
    repo: Option<RepositoryRef>,

    /// Git remote to derive the repository from when --repo is omitted
    #[arg(long, default_value = "origin")]
    remote: String,

    /// Coverage is expected for this repository
    #[arg(long)]
    expect_coverage: bool,
}

#[derive(Subcommand)]
enum FetchTarget {
    /// A single commit
    Commit {
        /// Commit SHA
        sha: String,
    },

    /// A single pull request, with its coverage reports
    PullRequest {
        /// Pull request number
        number: u64,
    },

    /// Every pull request of the repository, one status line each
    PullRequests {
        /// Page size used while following cursors
        #[arg(short, long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    codacy_core::init_tracing(cli.json_logs, level);

    let rendered = match cli.command {
        Commands::Commit {
            file,
            expect_coverage,
        } => cmd_commit(&file, expect_coverage, cli.format, cli.output.as_deref())?,
        Commands::PullRequest {
            file,
            reports,
            expect_coverage,
        } => cmd_pull_request(
            &file,
            reports.as_deref(),
            expect_coverage,
            cli.format,
            cli.output.as_deref(),
        )?,
        Commands::Fetch { api, target } => {
            cmd_fetch(&api, target, cli.format, cli.output.as_deref()).await?
        }
    };

    println!("{}", rendered);
    Ok(())
}

/// Evaluate a context and render it in `format`.
fn evaluate_and_render(
    context: &AnalysisContext<'_>,
    expect_coverage: bool,
    reports: Option<&CoveragePullRequestResponse>,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<String> {
    let label = context.label();
    let _span = SubjectSpan::enter(&label);

    let report = StatusReport::evaluate_at(context, Utc::now(), expect_coverage, reports);
    emit_status_evaluated(&label, "quality", &report.status);
    emit_status_evaluated(&label, "coverage", &report.coverage);

    if let Some(path) = output {
        write_status_report_json(path, &report)?;
        info!("Wrote status report to {:?}", path);
    }

    render_report(&report, format)
}

fn render_report(report: &StatusReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => format!(
            "{}\n{}",
            render_status_line(&report.label, &report.status),
            render_status_line(&format!("{} coverage", report.label), &report.coverage),
        ),
        OutputFormat::Markdown => format!(
            "{}\n{}",
            render_status_markdown(&report.label, &report.status),
            render_status_markdown(&format!("{} coverage", report.label), &report.coverage),
        ),
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("serialize status report")?
        }
    })
}

/// Evaluate a commit snapshot file
fn cmd_commit(
    file: &Path,
    expect_coverage: bool,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<String> {
    let snapshot = load_commit_snapshot(file)
        .with_context(|| format!("Failed to load commit snapshot {:?}", file))?;
    evaluate_and_render(
        &AnalysisContext::from(&snapshot),
        expect_coverage,
        None,
        format,
        output,
    )
}

/// Evaluate a pull-request snapshot file
fn cmd_pull_request(
    file: &Path,
    reports: Option<&Path>,
    expect_coverage: bool,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<String> {
    let snapshot = load_pull_request_snapshot(file)
        .with_context(|| format!("Failed to load pull request snapshot {:?}", file))?;
    let reports = reports
        .map(|path| {
            load_coverage_reports(path)
                .with_context(|| format!("Failed to load coverage reports {:?}", path))
        })
        .transpose()?;

    evaluate_and_render(
        &AnalysisContext::from(&snapshot),
        expect_coverage,
        reports.as_ref(),
        format,
        output,
    )
}

fn build_client(api: &ApiArgs) -> Result<CodacyClient> {
    let mut config = ClientConfig::from_env();
    config.base_url = api.base_url.clone();
    if let Some(token) = &api.token {
        config = config.with_token(token);
    }
    CodacyClient::new(config).context("Failed to create Codacy API client")
}

fn resolve_repository(api: &ApiArgs) -> Result<RepositoryRef> {
    if let Some(repo) = &api.repo {
        return Ok(repo.clone());
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let url = capture_remote_url(&cwd, &api.remote)
        .with_context(|| format!("Failed to read git remote '{}'", api.remote))?;
    RepositoryRef::from_remote_url(&url)
        .with_context(|| format!("Remote '{}' is not a Codacy-supported repository", api.remote))
}

/// Fetch from the Codacy API and evaluate
async fn cmd_fetch(
    api: &ApiArgs,
    target: FetchTarget,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<String> {
    let client = build_client(api)?;
    let repo = resolve_repository(api)?;
    info!("Using repository {}", repo);

    match target {
        FetchTarget::Commit { sha } => {
            let snapshot = client
                .fetch_commit_analysis(&repo, &sha)
                .await
                .with_context(|| format!("Failed to fetch commit {} of {}", sha, repo))?;
            evaluate_and_render(
                &AnalysisContext::from(&snapshot),
                api.expect_coverage,
                None,
                format,
                output,
            )
        }
        FetchTarget::PullRequest { number } => {
            let (snapshot, reports) = futures::future::join(
                client.fetch_pull_request_analysis(&repo, number),
                client.fetch_pull_request_coverage_reports(&repo, number),
            )
            .await;
            let snapshot = snapshot
                .with_context(|| format!("Failed to fetch PR #{} of {}", number, repo))?;

            // Reports only refine details; the status stands without them.
            let reports = match reports {
                Ok(reports) => Some(reports),
                Err(e) => {
                    emit_fetch_failed(&format!("PR #{} coverage reports", number), &e);
                    None
                }
            };

            evaluate_and_render(
                &AnalysisContext::from(&snapshot),
                api.expect_coverage,
                reports.as_ref(),
                format,
                output,
            )
        }
        FetchTarget::PullRequests { limit } => {
            let pull_requests = client
                .list_all_pull_requests(&repo, limit)
                .await
                .with_context(|| format!("Failed to list pull requests of {}", repo))?;

            if pull_requests.is_empty() {
                return Ok(format!("No pull requests found for {}", repo));
            }

            let mut lines = Vec::with_capacity(pull_requests.len());
            for pr in &pull_requests {
                let context = AnalysisContext::from(pr);
                let status = context.quality_status(api.expect_coverage);
                emit_status_evaluated(&context.label(), "quality", &status);
                lines.push(render_status_line(
                    &format!("{} {}", context.label(), pr.pull_request.title),
                    &status,
                ));
            }
            Ok(lines.join("\n"))
        }
    }
}
