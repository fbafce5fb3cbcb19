//! Per-job pipeline and cross-job fan-out.

use std::collections::BTreeSet;
use std::fmt;
use tokio::task::JoinSet;
use tracing::info;

use crate::history::{HistoryBuilder, JobReport, Report, classify};
use crate::jenkins::{JenkinsClient, JenkinsError};

/// Errors that abort a detector run
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to analyze job '{job}'")]
    Job {
        job: String,
        #[source]
        source: JenkinsError,
    },

    #[error("job analysis task failed")]
    Task(#[from] tokio::task::JoinError),
}

/// Counters for one analyzed job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSummary {
    pub job: String,

    /// Builds listed by the server
    pub builds: usize,

    /// Builds that contributed to history
    pub contributing_builds: usize,

    /// Distinct tests seen in contributing builds
    pub tests_seen: usize,

    /// Tests flagged as flaky candidates
    pub flagged: usize,
}

impl fmt::Display for JobSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} build(s), {} contributing, {} test(s), {} flagged",
            self.job, self.builds, self.contributing_builds, self.tests_seen, self.flagged
        )
    }
}

/// Result of analyzing a single job
#[derive(Debug, Clone)]
pub struct JobAnalysis {
    pub summary: JobSummary,
    pub report: JobReport,
}

/// Reconstruct a job's test history and select its flaky candidates.
///
/// Builds are fetched and processed one at a time, in the order the server
/// lists them, so history entries stay newest first.
pub async fn analyze_job(client: &JenkinsClient, job: &str) -> Result<JobAnalysis, JenkinsError> {
    let info = client.job(job).await?;

    let mut builder = HistoryBuilder::new();
    for build in &info.builds {
        let record = client.build_record(job, build).await?;
        builder.push_build(&record);
    }

    let contributing_builds = builder.contributing_builds();
    let histories = builder.finish();
    let tests_seen = histories.len();
    let report = classify(histories);

    let summary = JobSummary {
        job: job.to_string(),
        builds: info.builds.len(),
        contributing_builds,
        tests_seen,
        flagged: report.len(),
    };
    info!(
        job,
        builds = summary.builds,
        contributing = summary.contributing_builds,
        tests = summary.tests_seen,
        flagged = summary.flagged,
        "job analyzed"
    );

    Ok(JobAnalysis { summary, report })
}

/// Merged report of a run, with one summary per job sorted by job name
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: Report,
    pub summaries: Vec<JobSummary>,
}

/// Analyze every job and merge the results into one [`Report`].
///
/// Up to `max_concurrent_jobs` jobs run at once; jobs share no state, so
/// their reports are only combined here. Duplicate names are analyzed once.
/// The first failing job aborts the run.
pub async fn run<I, S>(client: &JenkinsClient, jobs: I, max_concurrent_jobs: usize) -> Result<RunOutcome, RunError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let limit = max_concurrent_jobs.max(1);
    let mut pending = jobs
        .into_iter()
        .map(|job| job.as_ref().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter();

    let mut tasks = JoinSet::new();
    let mut reports = Vec::new();
    let mut summaries = Vec::new();

    loop {
        while tasks.len() < limit {
            let Some(job) = pending.next() else { break };
            let client = client.clone();
            tasks.spawn(async move {
                let result = analyze_job(&client, &job).await;
                (job, result)
            });
        }

        let Some(joined) = tasks.join_next().await else {
            break;
        };
        let (job, result) = joined?;
        let analysis = result.map_err(|source| RunError::Job {
            job: job.clone(),
            source,
        })?;
        reports.push((job, analysis.report));
        summaries.push(analysis.summary);
    }

    let report: Report = reports.into_iter().collect();
    summaries.sort_by(|a, b| a.job.cmp(&b.job));
    info!(jobs = report.len(), flagged = report.flagged_count(), "run complete");
    Ok(RunOutcome { report, summaries })
}
