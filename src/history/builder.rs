use tracing::trace;

use crate::history::types::{BuildRecord, JobHistory, PayloadShape};

/// Accumulates per-test history from a job's builds.
///
/// Builds must be pushed in the order the CI server returned them; the
/// position of each entry in a [`TestHistory`](crate::history::TestHistory)
/// is the position of its build in that sequence (ineligible builds skipped).
#[derive(Debug, Default)]
pub struct HistoryBuilder {
    histories: JobHistory,
    contributing_builds: usize,
}

impl HistoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one build. Returns whether the build contributed to history.
    ///
    /// Running, failed, aborted and otherwise unfinished builds are skipped
    /// entirely: no test gets an entry for them, not even a failure.
    pub fn push_build(&mut self, build: &BuildRecord) -> bool {
        if !build.is_eligible() {
            trace!(build = build.number, result = ?build.result, building = build.building, "skipping build");
            return false;
        }
        self.contributing_builds += 1;

        let Some(payload) = &build.payload else {
            trace!(build = build.number, "eligible build without test results");
            return true;
        };

        let shape = payload.shape();
        if let PayloadShape::Both { .. } = shape {
            trace!(build = build.number, "payload carries aggregated and simple results");
        }

        for group in shape.groups() {
            for outcome in &group.outcomes {
                self.histories
                    .entry(outcome.identity())
                    .or_default()
                    .push(outcome.status.is_non_failing());
            }
        }
        true
    }

    /// Number of eligible builds pushed so far
    pub fn contributing_builds(&self) -> usize {
        self.contributing_builds
    }

    pub fn finish(self) -> JobHistory {
        self.histories
    }
}

/// Build the history of every test seen in `builds`, in order
pub fn build_history<'a, I>(builds: I) -> JobHistory
where
    I: IntoIterator<Item = &'a BuildRecord>,
{
    let mut builder = HistoryBuilder::new();
    for build in builds {
        builder.push_build(build);
    }
    builder.finish()
}
