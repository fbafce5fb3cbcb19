use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Final outcome of a CI build, as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildResult {
    Success,
    Unstable,
    Failure,
    Aborted,
    /// Anything else, including a result that is not known yet
    Other,
}

impl BuildResult {
    /// Map a raw result string (`"SUCCESS"`, `"UNSTABLE"`, ...) to a result.
    /// Unknown or missing values become [`BuildResult::Other`].
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("SUCCESS") => BuildResult::Success,
            Some("UNSTABLE") => BuildResult::Unstable,
            Some("FAILURE") => BuildResult::Failure,
            Some("ABORTED") => BuildResult::Aborted,
            _ => BuildResult::Other,
        }
    }
}

/// Status of one reported test execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestStatus {
    Passed,
    Failed,
    Regression,
    Fixed,
    Skipped,
    Other,
}

impl TestStatus {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "PASSED" => TestStatus::Passed,
            "FAILED" => TestStatus::Failed,
            "REGRESSION" => TestStatus::Regression,
            "FIXED" => TestStatus::Fixed,
            "SKIPPED" => TestStatus::Skipped,
            _ => TestStatus::Other,
        }
    }

    /// Whether this status counts as non-failing in a test's history.
    ///
    /// Only `FAILED` and `REGRESSION` are failures; a skipped test is
    /// recorded as passing.
    pub fn is_non_failing(self) -> bool {
        !matches!(self, TestStatus::Failed | TestStatus::Regression)
    }
}

/// Logical test identity, stable across builds.
///
/// Kept as two fields so that a `#` inside either name can never collide;
/// it is only flattened to `class#test` when rendered or serialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestIdentity {
    pub class_name: String,
    pub test_name: String,
}

impl TestIdentity {
    pub fn new(class_name: impl Into<String>, test_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            test_name: test_name.into(),
        }
    }
}

impl fmt::Display for TestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.class_name, self.test_name)
    }
}

impl Serialize for TestIdentity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// One reported test execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub class_name: String,
    pub test_name: String,
    pub status: TestStatus,
}

impl TestOutcome {
    pub fn new(class_name: impl Into<String>, test_name: impl Into<String>, status: TestStatus) -> Self {
        Self {
            class_name: class_name.into(),
            test_name: test_name.into(),
            status,
        }
    }

    pub fn identity(&self) -> TestIdentity {
        TestIdentity::new(self.class_name.clone(), self.test_name.clone())
    }
}

/// A group of outcomes, e.g. one test suite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeGroup {
    pub name: String,
    pub outcomes: Vec<TestOutcome>,
}

/// One child result of an aggregated (fan-out / matrix) build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildGroup {
    pub outcome_groups: Vec<OutcomeGroup>,
}

/// Test results published by a single build.
///
/// A payload may carry the aggregated shape (`child_groups`), the simple
/// shape (`outcome_groups`), both, or neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPayload {
    pub child_groups: Vec<ChildGroup>,
    pub outcome_groups: Vec<OutcomeGroup>,
}

/// The groups of a payload that actually contribute to history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape<'a> {
    /// No groups at all
    Empty,
    /// Only the first child group is consulted
    Aggregated(&'a ChildGroup),
    Simple(&'a [OutcomeGroup]),
    /// Both shapes present; the aggregated groups are processed first
    Both {
        aggregated: &'a ChildGroup,
        simple: &'a [OutcomeGroup],
    },
}

impl ResultPayload {
    /// Resolve which groups of this payload contribute to history
    pub fn shape(&self) -> PayloadShape<'_> {
        let simple = (!self.outcome_groups.is_empty()).then_some(self.outcome_groups.as_slice());
        match (self.child_groups.first(), simple) {
            (None, None) => PayloadShape::Empty,
            (Some(aggregated), None) => PayloadShape::Aggregated(aggregated),
            (None, Some(simple)) => PayloadShape::Simple(simple),
            (Some(aggregated), Some(simple)) => PayloadShape::Both { aggregated, simple },
        }
    }
}

impl<'a> PayloadShape<'a> {
    /// Outcome groups to process, in processing order
    pub fn groups(&self) -> Vec<&'a OutcomeGroup> {
        match *self {
            PayloadShape::Empty => Vec::new(),
            PayloadShape::Aggregated(child) => child.outcome_groups.iter().collect(),
            PayloadShape::Simple(simple) => simple.iter().collect(),
            PayloadShape::Both { aggregated, simple } => {
                aggregated.outcome_groups.iter().chain(simple.iter()).collect()
            }
        }
    }
}

/// A build of a job, in the order the CI server returned it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRecord {
    pub number: u64,
    pub building: bool,
    pub result: BuildResult,
    /// Published test results, if any were retrieved
    pub payload: Option<ResultPayload>,
}

impl BuildRecord {
    pub fn new(number: u64, building: bool, result: BuildResult) -> Self {
        Self {
            number,
            building,
            result,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: ResultPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// A build contributes to history only once it has finished and
    /// reached the test stage (`SUCCESS` or `UNSTABLE`).
    pub fn is_eligible(&self) -> bool {
        !self.building && matches!(self.result, BuildResult::Success | BuildResult::Unstable)
    }
}

/// Ordered outcomes of one test, `true` meaning non-failing.
/// Index 0 is the first processed build (normally the newest).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TestHistory(Vec<bool>);

impl TestHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, non_failing: bool) {
        self.0.push(non_failing);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.0.get(index).copied()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<bool>> for TestHistory {
    fn from(entries: Vec<bool>) -> Self {
        Self(entries)
    }
}

/// Every test seen in a job's eligible builds
pub type JobHistory = BTreeMap<TestIdentity, TestHistory>;

/// Flagged tests of one job, each with its full history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct JobReport {
    tests: BTreeMap<TestIdentity, TestHistory>,
}

impl JobReport {
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn get(&self, identity: &TestIdentity) -> Option<&TestHistory> {
        self.tests.get(identity)
    }

    pub fn contains(&self, identity: &TestIdentity) -> bool {
        self.tests.contains_key(identity)
    }

    /// Flagged tests in identity order
    pub fn iter(&self) -> impl Iterator<Item = (&TestIdentity, &TestHistory)> {
        self.tests.iter()
    }
}

impl FromIterator<(TestIdentity, TestHistory)> for JobReport {
    fn from_iter<I: IntoIterator<Item = (TestIdentity, TestHistory)>>(iter: I) -> Self {
        Self {
            tests: iter.into_iter().collect(),
        }
    }
}

/// Job name to [`JobReport`], built once per run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report {
    jobs: BTreeMap<String, JobReport>,
}

impl Report {
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn job(&self, name: &str) -> Option<&JobReport> {
        self.jobs.get(name)
    }

    /// Jobs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &JobReport)> {
        self.jobs.iter().map(|(name, report)| (name.as_str(), report))
    }

    /// Total number of flagged tests across all jobs
    pub fn flagged_count(&self) -> usize {
        self.jobs.values().map(JobReport::len).sum()
    }
}

impl FromIterator<(String, JobReport)> for Report {
    fn from_iter<I: IntoIterator<Item = (String, JobReport)>>(iter: I) -> Self {
        Self {
            jobs: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(outcomes: Vec<TestOutcome>) -> OutcomeGroup {
        OutcomeGroup {
            name: "suite".to_string(),
            outcomes,
        }
    }

    #[test]
    fn test_identity_display() {
        let id = TestIdentity::new("com.acme.FooTest", "bar");
        assert_eq!(id.to_string(), "com.acme.FooTest#bar");
    }

    #[test]
    fn test_identity_keeps_delimiter_distinct() {
        let a = TestIdentity::new("A#b", "c");
        let b = TestIdentity::new("A", "b#c");
        assert_ne!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_status_from_raw() {
        assert_eq!(TestStatus::from_raw("PASSED"), TestStatus::Passed);
        assert_eq!(TestStatus::from_raw("REGRESSION"), TestStatus::Regression);
        assert_eq!(TestStatus::from_raw("passed"), TestStatus::Other);
        assert_eq!(TestStatus::from_raw(""), TestStatus::Other);
    }

    #[test]
    fn test_status_non_failing() {
        assert!(TestStatus::Passed.is_non_failing());
        assert!(TestStatus::Fixed.is_non_failing());
        assert!(TestStatus::Skipped.is_non_failing());
        assert!(TestStatus::Other.is_non_failing());
        assert!(!TestStatus::Failed.is_non_failing());
        assert!(!TestStatus::Regression.is_non_failing());
    }

    #[test]
    fn test_build_result_from_raw() {
        assert_eq!(BuildResult::from_raw(Some("UNSTABLE")), BuildResult::Unstable);
        assert_eq!(BuildResult::from_raw(Some("NOT_BUILT")), BuildResult::Other);
        assert_eq!(BuildResult::from_raw(None), BuildResult::Other);
    }

    #[test]
    fn test_build_eligibility() {
        assert!(BuildRecord::new(1, false, BuildResult::Success).is_eligible());
        assert!(BuildRecord::new(1, false, BuildResult::Unstable).is_eligible());
        assert!(!BuildRecord::new(1, true, BuildResult::Success).is_eligible());
        assert!(!BuildRecord::new(1, false, BuildResult::Failure).is_eligible());
        assert!(!BuildRecord::new(1, false, BuildResult::Aborted).is_eligible());
        assert!(!BuildRecord::new(1, false, BuildResult::Other).is_eligible());
    }

    #[test]
    fn test_payload_shape_resolution() {
        let simple = group(vec![TestOutcome::new("A", "a", TestStatus::Passed)]);
        let child = ChildGroup {
            outcome_groups: vec![group(vec![TestOutcome::new("B", "b", TestStatus::Failed)])],
        };

        assert_eq!(ResultPayload::default().shape(), PayloadShape::Empty);

        let payload = ResultPayload {
            child_groups: vec![child.clone()],
            outcome_groups: vec![],
        };
        assert_eq!(payload.shape(), PayloadShape::Aggregated(&child));

        let payload = ResultPayload {
            child_groups: vec![],
            outcome_groups: vec![simple.clone()],
        };
        assert!(matches!(payload.shape(), PayloadShape::Simple(groups) if groups.len() == 1));

        let payload = ResultPayload {
            child_groups: vec![child.clone()],
            outcome_groups: vec![simple.clone()],
        };
        let groups = payload.shape().groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].outcomes[0].class_name, "B");
        assert_eq!(groups[1].outcomes[0].class_name, "A");
    }

    #[test]
    fn test_only_first_child_group_consulted() {
        let first = ChildGroup {
            outcome_groups: vec![group(vec![TestOutcome::new("A", "a", TestStatus::Passed)])],
        };
        let second = ChildGroup {
            outcome_groups: vec![group(vec![TestOutcome::new("Z", "z", TestStatus::Failed)])],
        };
        let payload = ResultPayload {
            child_groups: vec![first, second],
            outcome_groups: vec![],
        };
        let groups = payload.shape().groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].outcomes[0].class_name, "A");
    }

    #[test]
    fn test_report_serializes_flat_identity_keys() {
        let job: JobReport = [(TestIdentity::new("Foo", "bar"), TestHistory::from(vec![false, true]))]
            .into_iter()
            .collect();
        let report: Report = [("nightly".to_string(), job)].into_iter().collect();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({ "nightly": { "Foo#bar": [false, true] } }));
        assert_eq!(report.flagged_count(), 1);
    }
}
