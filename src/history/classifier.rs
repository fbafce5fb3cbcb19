use crate::history::types::{JobHistory, JobReport, TestHistory};

/// Whether a test's most recent or second most recent outcome failed
pub fn is_flaky_candidate(history: &TestHistory) -> bool {
    matches!(history.get(0), Some(false)) || matches!(history.get(1), Some(false))
}

/// Keep only flaky candidates, each with its full history
pub fn classify(histories: JobHistory) -> JobReport {
    histories
        .into_iter()
        .filter(|(_, history)| is_flaky_candidate(history))
        .collect()
}
