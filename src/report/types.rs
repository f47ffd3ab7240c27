use crate::runner::state::{SuiteReport, TestCaseReport, TestSummary};
use serde::{Deserialize, Serialize};

/// Test results for report generation
///
/// This is the shape of `test-results.json`, so any saved run can be
/// rendered again with `firstcry-e2e report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    pub session_id: String,
    pub suite_name: String,
    pub tests: Vec<TestCaseReport>,
    pub summary: TestSummary,
    pub generated_at: String,
}

impl TestResults {
    pub fn from_report(report: SuiteReport) -> Self {
        Self {
            session_id: report.session_id,
            suite_name: report.suite_name,
            tests: report.tests,
            summary: report.summary,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}
