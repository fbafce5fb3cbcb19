//! Flaky Detector - flaky test candidates from CI build history.
//!
//! This crate provides:
//! - Per-test pass/fail history reconstructed from a job's builds
//! - Selection of tests whose latest or second-latest run failed
//! - A Jenkins remote API client to fetch builds and test reports
//! - HTML, JSON and plain-text report rendering
//!
//! # Example
//!
//! ```rust
//! use flaky_detector::history::{
//!     BuildRecord, BuildResult, OutcomeGroup, ResultPayload, TestOutcome, TestStatus,
//!     build_history, classify,
//! };
//!
//! let payload = |status| ResultPayload {
//!     child_groups: vec![],
//!     outcome_groups: vec![OutcomeGroup {
//!         name: "FooTest".to_string(),
//!         outcomes: vec![TestOutcome::new("FooTest", "bar", status)],
//!     }],
//! };
//! let builds = vec![
//!     BuildRecord::new(2, false, BuildResult::Unstable).with_payload(payload(TestStatus::Failed)),
//!     BuildRecord::new(1, false, BuildResult::Success).with_payload(payload(TestStatus::Passed)),
//! ];
//!
//! let report = classify(build_history(&builds));
//! assert_eq!(report.len(), 1);
//! ```

pub mod config;
pub mod history;
pub mod jenkins;
pub mod logging;
pub mod report;
pub mod runner;

// Re-export the history engine
pub use history::{
    BuildRecord, BuildResult, HistoryBuilder, JobHistory, JobReport, Report, TestHistory, TestIdentity,
    TestOutcome, TestStatus, build_history, classify, is_flaky_candidate,
};

// Re-export the CI client
pub use jenkins::{JenkinsClient, JenkinsConfig, JenkinsError, JenkinsResult};

// Re-export rendering
pub use report::{ReportError, ReportFormat, render, write_report};

// Re-export the run pipeline
pub use runner::{JobAnalysis, JobSummary, RunError, RunOutcome, analyze_job, run};
