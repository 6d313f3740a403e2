//! Contract tests for `AnalysisSource` through the in-memory fake, wired
//! into status evaluation the way the CLI does it.

use std::sync::Arc;

use chrono::{Duration, Utc};
use codacy_client::{AnalysisSource, ClientError, MemoryAnalysisSource, Provider, RepositoryRef};
use codacy_core::{
    AnalysisContext, AnalysisMeta, Commit, CommitWithAnalysis, CoveragePullRequestResponse,
    CoverageReport, PullRequest, PullRequestWithAnalysis, QualityAnalysis, StatusValue,
};

fn repo() -> RepositoryRef {
    RepositoryRef::new(Provider::GitHub, "acme", "widgets")
}

#[tokio::test]
async fn commit_roundtrip_and_evaluation() {
    let source = MemoryAnalysisSource::new();
    let commit = Commit::new("0a1b2c3d4e5f", Utc::now() - Duration::hours(2)).with_analysis_window(
        Some(Utc::now() - Duration::hours(2)),
        Some(Utc::now() - Duration::hours(1)),
    );
    let snapshot = CommitWithAnalysis::new(commit, AnalysisMeta::analyzable()).with_quality(
        QualityAnalysis {
            is_up_to_standards: Some(true),
            ..Default::default()
        },
    );
    source.insert_commit(&repo(), snapshot.clone()).await;

    let fetched = source
        .fetch_commit_analysis(&repo(), "0a1b2c3d4e5f")
        .await
        .expect("fetch");
    assert_eq!(fetched, snapshot);

    let status = AnalysisContext::from(&fetched).quality_status(true);
    assert_eq!(status.value, StatusValue::Passed);
    assert_eq!(
        status.details.as_deref(),
        Some("Waiting for coverage reports...")
    );
}

#[tokio::test]
async fn unknown_commit_is_not_found() {
    let source = MemoryAnalysisSource::new();
    let err = source
        .fetch_commit_analysis(&repo(), "deadbeef")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound(msg) if msg.contains("deadbeef")));
}

#[tokio::test]
async fn snapshots_are_scoped_per_repository() {
    let source = MemoryAnalysisSource::new();
    let pr = PullRequestWithAnalysis::new(
        PullRequest::new(10, 4, "Bump deps", Utc::now()),
        AnalysisMeta::analyzable(),
    );
    source.insert_pull_request(&repo(), pr).await;

    let other = RepositoryRef::new(Provider::GitLab, "acme", "widgets");
    assert!(source.fetch_pull_request_analysis(&repo(), 4).await.is_ok());
    assert!(source.fetch_pull_request_analysis(&other, 4).await.is_err());
}

#[tokio::test]
async fn missing_reports_read_as_empty_response() {
    let source = MemoryAnalysisSource::new();
    let reports = source
        .fetch_pull_request_coverage_reports(&repo(), 99)
        .await
        .expect("reports");
    assert!(reports.data.is_none());
}

#[tokio::test]
async fn pull_request_with_reports_through_trait_object() {
    let memory = MemoryAnalysisSource::new();
    let pr = PullRequestWithAnalysis::new(
        PullRequest::new(11, 5, "Add cache", Utc::now() - Duration::minutes(10)),
        AnalysisMeta::analyzable(),
    )
    .analysing(true);
    memory.insert_pull_request(&repo(), pr).await;
    memory
        .insert_coverage_reports(
            &repo(),
            5,
            CoveragePullRequestResponse::new(
                vec![CoverageReport::default()],
                vec![CoverageReport::default()],
            ),
        )
        .await;

    let source: Arc<dyn AnalysisSource> = Arc::new(memory);
    let repo = repo();
    let (pr, reports) = tokio::try_join!(
        source.fetch_pull_request_analysis(&repo, 5),
        source.fetch_pull_request_coverage_reports(&repo, 5),
    )
    .expect("fetch");

    let status = AnalysisContext::from(&pr).coverage_status(Some(&reports));
    assert_eq!(status.value, StatusValue::Loading);
    assert_eq!(
        status.details.as_deref(),
        Some("Processing coverage reports...")
    );
}
