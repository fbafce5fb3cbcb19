//! JSON shapes returned by the Jenkins remote API.
//!
//! Only the fields the detector needs are modelled. Every field defaults
//! when missing or `null`, so partially populated responses still decode.

use serde::{Deserialize, Deserializer};

use crate::history::{BuildResult, ChildGroup, OutcomeGroup, ResultPayload, TestOutcome, TestStatus};

/// Decode `null` as the type's default value
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `GET <base>/job/<job>/api/json`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobInfo {
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub display_name: String,
    pub description: Option<String>,
    /// Newest build first
    #[serde(deserialize_with = "null_default")]
    pub builds: Vec<BuildRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildRef {
    #[serde(deserialize_with = "null_default")]
    pub number: u64,
    #[serde(deserialize_with = "null_default")]
    pub url: String,
}

/// `GET <base>/job/<job>/<number>/api/json`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildStatus {
    #[serde(deserialize_with = "null_default")]
    pub building: bool,
    /// `null` while the build is running
    pub result: Option<String>,
}

impl BuildStatus {
    pub fn result(&self) -> BuildResult {
        BuildResult::from_raw(self.result.as_deref())
    }
}

/// `GET <base>/job/<job>/<number>/testReport/api/json`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestReport {
    #[serde(deserialize_with = "null_default")]
    pub child_reports: Vec<ChildReport>,
    #[serde(deserialize_with = "null_default")]
    pub suites: Vec<Suite>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChildReport {
    #[serde(deserialize_with = "null_default")]
    pub result: ChildResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChildResult {
    #[serde(deserialize_with = "null_default")]
    pub duration: f64,
    #[serde(deserialize_with = "null_default")]
    pub suites: Vec<Suite>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Suite {
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub cases: Vec<Case>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Case {
    #[serde(deserialize_with = "null_default")]
    pub class_name: String,
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub status: String,
    #[serde(deserialize_with = "null_default")]
    pub duration: f64,
    #[serde(deserialize_with = "null_default")]
    pub skipped: bool,
    #[serde(deserialize_with = "null_default")]
    pub failed_since: u64,
}

impl From<Case> for TestOutcome {
    fn from(case: Case) -> Self {
        let status = TestStatus::from_raw(&case.status);
        TestOutcome::new(case.class_name, case.name, status)
    }
}

impl From<Suite> for OutcomeGroup {
    fn from(suite: Suite) -> Self {
        OutcomeGroup {
            name: suite.name,
            outcomes: suite.cases.into_iter().map(TestOutcome::from).collect(),
        }
    }
}

impl From<ChildReport> for ChildGroup {
    fn from(child: ChildReport) -> Self {
        ChildGroup {
            outcome_groups: child.result.suites.into_iter().map(OutcomeGroup::from).collect(),
        }
    }
}

impl From<TestReport> for ResultPayload {
    fn from(report: TestReport) -> Self {
        ResultPayload {
            child_groups: report.child_reports.into_iter().map(ChildGroup::from).collect(),
            outcome_groups: report.suites.into_iter().map(OutcomeGroup::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::PayloadShape;

    #[test]
    fn test_decode_job_info() {
        let json = r#"{
            "_class": "hudson.model.FreeStyleProject",
            "name": "platform-integration",
            "displayName": "Platform integration",
            "description": null,
            "builds": [
                {"_class": "hudson.model.FreeStyleBuild", "number": 42, "url": "https://ci/job/platform-integration/42/"},
                {"number": 41, "url": "https://ci/job/platform-integration/41/"}
            ]
        }"#;
        let job: JobInfo = serde_json::from_str(json).unwrap();
        assert_eq!(job.display_name, "Platform integration");
        assert_eq!(job.builds.iter().map(|b| b.number).collect::<Vec<_>>(), vec![42, 41]);
    }

    #[test]
    fn test_decode_build_status() {
        let running: BuildStatus = serde_json::from_str(r#"{"building": true, "result": null}"#).unwrap();
        assert!(running.building);
        assert_eq!(running.result(), BuildResult::Other);

        let done: BuildStatus = serde_json::from_str(r#"{"building": false, "result": "UNSTABLE"}"#).unwrap();
        assert_eq!(done.result(), BuildResult::Unstable);

        let empty: BuildStatus = serde_json::from_str("{}").unwrap();
        assert!(!empty.building);
        assert_eq!(empty.result(), BuildResult::Other);
    }

    #[test]
    fn test_decode_simple_report() {
        let json = r#"{
            "duration": 1.5,
            "suites": [{
                "name": "com.acme.FooTest",
                "cases": [
                    {"className": "com.acme.FooTest", "name": "bar", "status": "FAILED", "duration": 0.2, "skipped": false, "failedSince": 12},
                    {"className": "com.acme.FooTest", "name": "baz", "status": "SKIPPED", "skipped": true}
                ]
            }]
        }"#;
        let report: TestReport = serde_json::from_str(json).unwrap();
        let payload = ResultPayload::from(report);

        let PayloadShape::Simple(groups) = payload.shape() else {
            panic!("expected simple shape, got {:?}", payload.shape());
        };
        assert_eq!(groups[0].name, "com.acme.FooTest");
        assert_eq!(groups[0].outcomes[0].status, TestStatus::Failed);
        assert_eq!(groups[0].outcomes[1].status, TestStatus::Skipped);
    }

    #[test]
    fn test_decode_aggregated_report() {
        let json = r#"{
            "childReports": [
                {"child": {"number": 7}, "result": {"duration": 3.0, "suites": [
                    {"name": "s", "cases": [{"className": "A", "name": "a", "status": "REGRESSION"}]}
                ]}},
                {"child": {"number": 7}, "result": {"suites": []}}
            ]
        }"#;
        let payload = ResultPayload::from(serde_json::from_str::<TestReport>(json).unwrap());
        let PayloadShape::Aggregated(child) = payload.shape() else {
            panic!("expected aggregated shape, got {:?}", payload.shape());
        };
        assert_eq!(child.outcome_groups[0].outcomes[0].status, TestStatus::Regression);
    }

    #[test]
    fn test_null_child_result_is_empty() {
        let json = r#"{
            "childReports": [
                {"child": {"number": 1}, "result": null},
                {"child": {"number": 1}, "result": {"suites": [{"name": "s", "cases": []}]}}
            ],
            "suites": null
        }"#;
        let report: TestReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.child_reports.len(), 2);
        assert!(report.child_reports[0].result.suites.is_empty());
        assert!(report.suites.is_empty());

        let payload = ResultPayload::from(report);
        let PayloadShape::Aggregated(child) = payload.shape() else {
            panic!("expected aggregated shape, got {:?}", payload.shape());
        };
        assert!(child.outcome_groups.is_empty());
    }

    #[test]
    fn test_null_fields_default() {
        let json = r#"{
            "suites": [{
                "name": null,
                "cases": [
                    {"className": "A", "name": "a", "status": "PASSED", "duration": null, "failedSince": null, "skipped": null},
                    {"className": null, "name": null, "status": null}
                ]
            }]
        }"#;
        let report: TestReport = serde_json::from_str(json).unwrap();
        let suite = &report.suites[0];
        assert_eq!(suite.name, "");
        assert_eq!(suite.cases[0].duration, 0.0);
        assert_eq!(suite.cases[0].failed_since, 0);
        assert!(!suite.cases[0].skipped);

        let outcome = TestOutcome::from(suite.cases[1].clone());
        assert_eq!(outcome.identity(), crate::history::TestIdentity::new("", ""));
        assert_eq!(outcome.status, TestStatus::Other);

        let job: JobInfo = serde_json::from_str(r#"{"name": null, "builds": null}"#).unwrap();
        assert!(job.builds.is_empty());
    }

    #[test]
    fn test_unknown_status_is_other() {
        let case: Case = serde_json::from_str(r#"{"className": "A", "name": "a", "status": "WEIRD"}"#).unwrap();
        assert_eq!(TestOutcome::from(case).status, TestStatus::Other);
    }
}
