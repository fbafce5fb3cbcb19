use std::fmt::Write;

use crate::history::{Report, TestHistory};

/// Encode a history as `.` (non-failing) and `X` (failing), newest first
pub fn history_markers(history: &TestHistory) -> String {
    history.iter().map(|passed| if passed { '.' } else { 'X' }).collect()
}

/// Plain-text report for terminals and CI logs
pub fn render(report: &Report) -> String {
    let mut out = String::new();

    for (job, tests) in report.iter() {
        let _ = writeln!(out, "JOB: {} ({} flagged)", job, tests.len());
        for (identity, history) in tests.iter() {
            let _ = writeln!(out, "  {} {}", identity, history_markers(history));
        }
        out.push('\n');
    }

    if report.is_empty() {
        out.push_str("No jobs analyzed\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{JobReport, TestIdentity};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_history_markers() {
        assert_eq!(history_markers(&TestHistory::from(vec![false, true, true, false])), "X..X");
        assert_eq!(history_markers(&TestHistory::new()), "");
    }

    #[test]
    fn test_render() {
        let nightly: JobReport = [
            (TestIdentity::new("Foo", "bar"), TestHistory::from(vec![false, true])),
            (TestIdentity::new("Foo", "baz"), TestHistory::from(vec![true, false, false])),
        ]
        .into_iter()
        .collect();
        let report: Report = [
            ("nightly".to_string(), nightly),
            ("clean".to_string(), JobReport::default()),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            render(&report),
            "JOB: clean (0 flagged)\n\nJOB: nightly (2 flagged)\n  Foo#bar X.\n  Foo#baz .XX\n\n"
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&Report::default()), "No jobs analyzed\n");
    }
}
