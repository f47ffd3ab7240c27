use super::types::TestResults;
use crate::runner::state::{TestCaseReport, TestStatus};
use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

/// Generate JUnit XML report string from TestResults
pub fn generate_junit_xml(results: &TestResults) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let total_tests = results.tests.len();
    let failures = results
        .tests
        .iter()
        .filter(|t| matches!(t.status, TestStatus::Failed { .. }))
        .count();
    let skipped = results
        .tests
        .iter()
        .filter(|t| matches!(t.status, TestStatus::Skipped { .. }))
        .count();
    let total_duration: u64 = results.tests.iter().map(|t| t.duration_ms.unwrap_or(0)).sum();
    let time = seconds(total_duration);

    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", results.suite_name.as_str()));
    suites_start.push_attribute(("tests", total_tests.to_string().as_str()));
    suites_start.push_attribute(("failures", failures.to_string().as_str()));
    suites_start.push_attribute(("skipped", skipped.to_string().as_str()));
    suites_start.push_attribute(("time", time.as_str()));
    writer.write_event(Event::Start(suites_start))?;

    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", results.suite_name.as_str()));
    suite_start.push_attribute(("tests", total_tests.to_string().as_str()));
    suite_start.push_attribute(("failures", failures.to_string().as_str()));
    suite_start.push_attribute(("skipped", skipped.to_string().as_str()));
    suite_start.push_attribute(("id", results.session_id.as_str()));
    suite_start.push_attribute(("time", time.as_str()));
    suite_start.push_attribute(("timestamp", results.generated_at.as_str()));
    writer.write_event(Event::Start(suite_start))?;

    for test in &results.tests {
        write_test_case(&mut writer, &results.suite_name, test)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let xml = String::from_utf8(writer.into_inner().into_inner())?;
    Ok(xml)
}

fn write_test_case<W: std::io::Write>(
    writer: &mut Writer<W>,
    suite_name: &str,
    test: &TestCaseReport,
) -> Result<()> {
    // Feature names carry spaces and ampersands; keep the classname dotted
    let classname = format!(
        "{}.{}",
        suite_name,
        test.feature.to_lowercase().replace(" & ", "_").replace(' ', "_")
    );

    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", test.name.as_str()));
    case_start.push_attribute(("classname", classname.as_str()));
    case_start.push_attribute(("time", seconds(test.duration_ms.unwrap_or(0)).as_str()));
    writer.write_event(Event::Start(case_start))?;

    match &test.status {
        TestStatus::Failed { error } => {
            let mut fail_start = BytesStart::new("failure");
            fail_start.push_attribute(("message", error.as_str()));
            fail_start.push_attribute(("type", "AssertionError"));
            writer.write_event(Event::Start(fail_start))?;
            writer.write_event(Event::Text(BytesText::new(error)))?;
            writer.write_event(Event::End(BytesEnd::new("failure")))?;
        }
        TestStatus::Skipped { reason } => {
            let mut skip = BytesStart::new("skipped");
            skip.push_attribute(("message", reason.as_str()));
            writer.write_event(Event::Empty(skip))?;
        }
        _ => {}
    }

    // Jenkins' JUnit plugin picks up attachments from system-out
    if let Some(path) = &test.screenshot_path {
        writer.write_event(Event::Start(BytesStart::new("system-out")))?;
        writer.write_event(Event::Text(BytesText::new(&format!(
            "[[ATTACHMENT|{}]]",
            path
        ))))?;
        writer.write_event(Event::End(BytesEnd::new("system-out")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

fn seconds(ms: u64) -> String {
    (ms as f64 / 1000.0).to_string()
}

/// Write report to file
pub fn write_report(results: &TestResults, output_dir: &Path) -> Result<()> {
    let xml = generate_junit_xml(results)?;
    let path = output_dir.join("junit.xml");
    std::fs::write(&path, xml).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("JUnit report saved to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::state::TestSummary;

    fn case(index: usize, name: &str, feature: &str, status: TestStatus) -> TestCaseReport {
        TestCaseReport {
            index,
            name: name.to_string(),
            title: name.to_string(),
            feature: feature.to_string(),
            status,
            duration_ms: Some(1500),
            steps: vec![],
            attachments: vec![],
            screenshot_path: None,
        }
    }

    #[test]
    fn test_generate_junit_xml() {
        let mut login = case(
            0,
            "test_login_with_mobile_number_and_otp",
            "Login",
            TestStatus::Failed {
                error: "Login failed after OTP".to_string(),
            },
        );
        login.screenshot_path =
            Some("screenshots/test_login_with_mobile_number_and_otp_20250101-120000.png".into());

        let results = TestResults {
            session_id: "test-session".to_string(),
            suite_name: "firstcry".to_string(),
            tests: vec![
                login,
                case(
                    1,
                    "test_add_to_cart_and_manage_wishlist",
                    "Cart & Wishlist",
                    TestStatus::Skipped {
                        reason: "depends on test_add_to_wishlist which did not pass".to_string(),
                    },
                ),
            ],
            summary: TestSummary {
                session_id: "test-session".to_string(),
                total_tests: 2,
                passed: 0,
                failed: 1,
                skipped: 1,
                screenshots: 1,
                total_duration_ms: Some(3000),
            },
            generated_at: "2025-01-01 12:00:00".to_string(),
        };

        let xml = generate_junit_xml(&results).expect("Failed to generate XML");

        assert!(xml.contains(r#"<testsuites name="firstcry""#));
        assert!(xml.contains(r#"tests="2""#));
        assert!(xml.contains(r#"failures="1""#));
        assert!(xml.contains(r#"skipped="1""#));
        assert!(xml.contains(r#"<testcase name="test_login_with_mobile_number_and_otp""#));
        assert!(xml.contains(r#"message="Login failed after OTP""#));
        assert!(xml.contains(
            r#"<skipped message="depends on test_add_to_wishlist which did not pass"/>"#
        ));
        assert!(xml.contains(r#"classname="firstcry.cart_wishlist""#));
        assert!(xml.contains("[[ATTACHMENT|screenshots/test_login_with_mobile_number_and_otp_20250101-120000.png]]"));
    }
}
