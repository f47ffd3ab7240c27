use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Test execution status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TestStatus {
    Pending,
    Running,
    Passed,
    Failed { error: String },
    Skipped { reason: String },
}

impl TestStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TestStatus::Pending => "pending",
            TestStatus::Running => "running",
            TestStatus::Passed => "passed",
            TestStatus::Failed { .. } => "failed",
            TestStatus::Skipped { .. } => "skipped",
        }
    }
}

/// Outcome of one named report step inside a test
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub name: String,
    pub status: StepStatus,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Text,
    Png,
}

/// Note or file attached to a test's report entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    pub kind: AttachmentKind,
    /// Inline body for text attachments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// File path for file attachments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Attachment {
    pub fn text(name: &str, body: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: AttachmentKind::Text,
            body: Some(body.to_string()),
            path: None,
        }
    }

    pub fn png(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: AttachmentKind::Png,
            body: None,
            path: Some(path.to_string()),
        }
    }
}

/// State for a single test execution
#[derive(Debug, Clone)]
pub struct TestCaseState {
    pub index: usize,
    pub name: String,
    pub title: String,
    pub feature: String,
    pub status: TestStatus,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub duration_ms: Option<u64>,
    pub steps: Vec<StepRecord>,
    pub attachments: Vec<Attachment>,
    pub screenshot_path: Option<String>,
}

impl TestCaseState {
    pub fn new(index: usize, name: &str, title: &str, feature: &str) -> Self {
        Self {
            index,
            name: name.to_string(),
            title: title.to_string(),
            feature: feature.to_string(),
            status: TestStatus::Pending,
            started_at: None,
            finished_at: None,
            duration_ms: None,
            steps: Vec::new(),
            attachments: Vec::new(),
            screenshot_path: None,
        }
    }

    pub fn start(&mut self) {
        self.status = TestStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn pass(&mut self) {
        self.finish(TestStatus::Passed);
    }

    pub fn fail(&mut self, error: String) {
        self.finish(TestStatus::Failed { error });
    }

    pub fn skip(&mut self, reason: String) {
        self.finish(TestStatus::Skipped { reason });
    }

    fn finish(&mut self, status: TestStatus) {
        self.status = status;
        self.finished_at = Some(Instant::now());
        if let Some(start) = self.started_at {
            self.duration_ms = Some(start.elapsed().as_millis() as u64);
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == TestStatus::Passed
    }

    /// Serialize state for reporting (without Instant which isn't serializable)
    pub fn to_report(&self) -> TestCaseReport {
        TestCaseReport {
            index: self.index,
            name: self.name.clone(),
            title: self.title.clone(),
            feature: self.feature.clone(),
            status: self.status.clone(),
            duration_ms: self.duration_ms,
            steps: self.steps.clone(),
            attachments: self.attachments.clone(),
            screenshot_path: self.screenshot_path.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseReport {
    pub index: usize,
    pub name: String,
    pub title: String,
    pub feature: String,
    pub status: TestStatus,
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub steps: Vec<StepRecord>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub screenshot_path: Option<String>,
}

/// State for one suite run
#[derive(Debug, Clone)]
pub struct SuiteState {
    pub session_id: String,
    pub suite_name: String,
    pub tests: Vec<TestCaseState>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl SuiteState {
    pub fn new(session_id: &str, suite_name: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            suite_name: suite_name.to_string(),
            tests: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn add_test(&mut self, test: TestCaseState) {
        self.tests.push(test);
    }

    pub fn test(&self, name: &str) -> Option<&TestCaseState> {
        self.tests.iter().find(|t| t.name == name)
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
    }

    pub fn summary(&self) -> TestSummary {
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;

        for test in &self.tests {
            match test.status {
                TestStatus::Passed => passed += 1,
                TestStatus::Failed { .. } => failed += 1,
                TestStatus::Skipped { .. } => skipped += 1,
                _ => {}
            }
        }

        let total_duration_ms = self.started_at.map(|start| {
            self.finished_at
                .unwrap_or_else(Instant::now)
                .duration_since(start)
                .as_millis() as u64
        });

        TestSummary {
            session_id: self.session_id.clone(),
            total_tests: self.tests.len() as u32,
            passed,
            failed,
            skipped,
            screenshots: self
                .tests
                .iter()
                .filter(|t| t.screenshot_path.is_some())
                .count() as u32,
            total_duration_ms,
        }
    }

    /// Serialize state for reporting
    pub fn to_report(&self) -> SuiteReport {
        SuiteReport {
            session_id: self.session_id.clone(),
            suite_name: self.suite_name.clone(),
            tests: self.tests.iter().map(|t| t.to_report()).collect(),
            summary: self.summary(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub session_id: String,
    pub total_tests: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    #[serde(default)]
    pub screenshots: u32,
    pub total_duration_ms: Option<u64>,
}

impl TestSummary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.skipped == 0 && self.passed == self.total_tests
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteReport {
    pub session_id: String,
    pub suite_name: String,
    pub tests: Vec<TestCaseReport>,
    pub summary: TestSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_each_terminal_status() {
        let mut suite = SuiteState::new("s1", "storefront");
        suite.start();

        let mut passed = TestCaseState::new(0, "a", "A", "F");
        passed.start();
        passed.pass();

        let mut failed = TestCaseState::new(1, "b", "B", "F");
        failed.start();
        failed.fail("boom".to_string());
        failed.screenshot_path = Some("shots/b.png".to_string());

        let mut skipped = TestCaseState::new(2, "c", "C", "F");
        skipped.skip("login did not pass".to_string());

        suite.add_test(passed);
        suite.add_test(failed);
        suite.add_test(skipped);
        suite.finish();

        let summary = suite.summary();
        assert_eq!(summary.total_tests, 3);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.screenshots, 1);
        assert!(!summary.all_passed());
        assert!(summary.total_duration_ms.is_some());
    }

    #[test]
    fn skipped_test_has_no_duration_when_never_started() {
        let mut test = TestCaseState::new(0, "a", "A", "F");
        test.skip("gate".to_string());
        assert_eq!(test.duration_ms, None);
        assert_eq!(test.status.label(), "skipped");
    }

    #[test]
    fn report_status_serializes_with_type_tag() {
        let mut test = TestCaseState::new(0, "a", "A", "F");
        test.start();
        test.fail("Login failed after OTP".to_string());
        let json = serde_json::to_string(&test.to_report()).unwrap();
        assert!(json.contains(r#""status":{"type":"failed","error":"Login failed after OTP"}"#));
        assert!(json.contains(r#""screenshotPath":null"#));
    }
}
