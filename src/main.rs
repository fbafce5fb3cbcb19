use clap::Parser;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use flaky_detector::jenkins::{JenkinsClient, JenkinsConfig};
use flaky_detector::logging::init_logging;
use flaky_detector::report::{ReportFormat, write_report};
use flaky_detector::runner;

/// Flaky Detector - flaky test candidates from Jenkins build history
#[derive(Parser, Debug)]
#[command(
    name = "flaky-detector",
    version,
    about = "Reports tests whose latest or second-latest run failed, per Jenkins job",
    after_help = "EXAMPLE:\n    \
        flaky-detector https://jenkins.example.com/platform report.html \\\n        \
        nightly-integration nightly-services\n\n\
        ENVIRONMENT VARIABLES:\n\
        FLAKY_DETECTOR_USER              User for HTTP basic auth\n\
        FLAKY_DETECTOR_TOKEN             API token for HTTP basic auth\n\
        FLAKY_DETECTOR_INSECURE          Accept invalid TLS certificates\n\
        FLAKY_DETECTOR_CONNECT_TIMEOUT   Connection timeout (seconds)\n\
        FLAKY_DETECTOR_TIMEOUT           Request timeout (seconds)\n\
        FLAKY_DETECTOR_MAX_JOBS          Jobs analyzed concurrently\n\
        FLAKY_DETECTOR_FORMAT            Report format (html, json, text)"
)]
struct Args {
    /// Jenkins base URL, may include a path prefix
    base_url: String,

    /// Report file to write, or `-` for stdout
    output: PathBuf,

    /// Jobs to check
    #[arg(required = true)]
    jobs: Vec<String>,

    /// Report format
    #[arg(long, short = 'f', value_enum, ignore_case = true, env = "FLAKY_DETECTOR_FORMAT", default_value = "html")]
    format: ReportFormat,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "FLAKY_DETECTOR_INSECURE")]
    insecure: bool,

    /// User for HTTP basic auth
    #[arg(long, requires = "token")]
    user: Option<String>,

    /// API token for HTTP basic auth
    #[arg(long, requires = "user")]
    token: Option<String>,

    /// Number of jobs analyzed at the same time
    #[arg(long, short = 'j', env = "FLAKY_DETECTOR_MAX_JOBS", default_value = "4")]
    max_concurrent_jobs: usize,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut jenkins_config = JenkinsConfig::new(&args.base_url);
    if args.insecure {
        jenkins_config = jenkins_config.accept_invalid_certs(true);
    }
    if let (Some(user), Some(token)) = (args.user, args.token) {
        jenkins_config = jenkins_config.credentials(user, token);
    }
    if let Some(timeout) = args.timeout {
        jenkins_config = jenkins_config.request_timeout(Duration::from_secs(timeout));
    }

    let client = JenkinsClient::new(&jenkins_config)?;
    let outcome = runner::run(&client, &args.jobs, args.max_concurrent_jobs).await?;
    let report = &outcome.report;

    write_report(report, args.format, &args.output)?;

    if args.output.as_path() != Path::new("-") {
        for summary in &outcome.summaries {
            println!("  {summary}");
        }
        println!(
            "Checked {} job(s), {} flaky candidate(s): {}",
            report.len(),
            report.flagged_count(),
            args.output.display()
        );
    }

    Ok(())
}
