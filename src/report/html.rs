use super::types::TestResults;
use crate::runner::state::{AttachmentKind, StepStatus, TestCaseReport, TestStatus};
use anyhow::{Context, Result};
use std::path::Path;

/// Generate HTML report
pub async fn generate(results: &TestResults, output: Option<&Path>) -> Result<()> {
    let html = generate_html(results);

    if let Some(path) = output {
        std::fs::write(path, html)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("HTML report saved to: {}", path.display());
    } else {
        println!("{}", html);
    }

    Ok(())
}

fn generate_html(results: &TestResults) -> String {
    let summary = &results.summary;
    let pass_rate = if summary.total_tests > 0 {
        (summary.passed as f64 / summary.total_tests as f64 * 100.0) as u32
    } else {
        0
    };

    let tests_html: String = results.tests.iter().map(test_card).collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{suite} - Test Report</title>
    <style>
        :root {{
            --bg: #0a0f1d;
            --card: #141b2d;
            --border: #374151;
            --text: #f9fafb;
            --muted: #9ca3af;
            --green: #10b981;
            --red: #ef4444;
            --yellow: #f59e0b;
            --blue: #3b82f6;
        }}
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{ font-family: system-ui, -apple-system, sans-serif; background: var(--bg); color: var(--text); padding: 2rem 1rem; line-height: 1.5; }}
        .container {{ max-width: 1000px; margin: 0 auto; }}
        header {{ display: flex; justify-content: space-between; align-items: flex-end; margin-bottom: 2rem; }}
        h1 {{ font-size: 2rem; font-weight: 800; }}
        .summary {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); gap: 1rem; margin-bottom: 2rem; }}
        .stat {{ background: var(--card); border: 1px solid var(--border); border-radius: 0.75rem; padding: 1.25rem; }}
        .stat-value {{ font-size: 2rem; font-weight: 800; }}
        .stat-label {{ color: var(--muted); font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.05em; }}
        .stat.passed .stat-value {{ color: var(--green); }}
        .stat.failed .stat-value {{ color: var(--red); }}
        .stat.skipped .stat-value {{ color: var(--yellow); }}
        .progress-bar {{ background: var(--card); height: 10px; border-radius: 5px; overflow: hidden; border: 1px solid var(--border); margin-bottom: 2.5rem; }}
        .progress-fill {{ height: 100%; background: var(--green); }}
        .test {{ background: var(--card); border: 1px solid var(--border); border-radius: 1rem; margin-bottom: 1.5rem; overflow: hidden; }}
        .test-header {{ padding: 1rem 1.25rem; display: flex; justify-content: space-between; align-items: center; border-bottom: 1px solid var(--border); }}
        .test-header h3 {{ font-size: 1.1rem; }}
        .feature {{ color: var(--muted); font-size: 0.8rem; }}
        .badge {{ padding: 0.2rem 0.7rem; border-radius: 9999px; font-size: 0.7rem; font-weight: 600; text-transform: uppercase; }}
        .test.passed .badge {{ background: rgba(16, 185, 129, 0.1); color: var(--green); }}
        .test.failed .badge {{ background: rgba(239, 68, 68, 0.1); color: var(--red); }}
        .test.skipped .badge {{ background: rgba(245, 158, 11, 0.1); color: var(--yellow); }}
        .steps, .attachments {{ padding: 0.75rem 1.25rem; }}
        .step {{ display: flex; gap: 0.75rem; padding: 0.4rem 0; font-family: monospace; font-size: 0.9rem; }}
        .step.passed .icon {{ color: var(--green); }}
        .step.failed .icon {{ color: var(--red); }}
        .duration {{ color: var(--muted); font-size: 0.75rem; }}
        .attachment {{ color: var(--muted); font-size: 0.85rem; padding: 0.15rem 0; }}
        .attachment a {{ color: var(--blue); }}
        .message {{ margin: 0.75rem 1.25rem; padding: 0.75rem; border-radius: 0.5rem; font-family: monospace; font-size: 0.8rem; white-space: pre-wrap; }}
        .message.error {{ background: rgba(239, 68, 68, 0.1); color: #fca5a5; border: 1px solid rgba(239, 68, 68, 0.2); }}
        .message.skip {{ background: rgba(245, 158, 11, 0.1); color: #fcd34d; border: 1px solid rgba(245, 158, 11, 0.2); }}
        .screenshot img {{ display: block; max-width: calc(100% - 2.5rem); margin: 0 1.25rem 1.25rem; border-radius: 0.5rem; border: 1px solid var(--border); }}
        .meta {{ margin-top: 3rem; padding-top: 1.5rem; border-top: 1px solid var(--border); color: var(--muted); font-size: 0.85rem; display: flex; justify-content: center; gap: 2rem; }}
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>{suite}</h1>
            <div style="text-align: right;">
                <div class="stat-label">Duration</div>
                <div style="font-size: 1.2rem; font-weight: 700;">{duration}</div>
            </div>
        </header>

        <div class="summary">
            <div class="stat"><div class="stat-value">{total}</div><div class="stat-label">Tests</div></div>
            <div class="stat passed"><div class="stat-value">{passed}</div><div class="stat-label">Passed</div></div>
            <div class="stat failed"><div class="stat-value">{failed}</div><div class="stat-label">Failed</div></div>
            <div class="stat skipped"><div class="stat-value">{skipped}</div><div class="stat-label">Skipped</div></div>
        </div>

        <div class="progress-bar"><div class="progress-fill" style="width: {pass_rate}%"></div></div>

        {tests_html}

        <div class="meta">
            <span>Session: {session}</span>
            <span>Generated: {generated}</span>
        </div>
    </div>
</body>
</html>"#,
        suite = html_escape(&results.suite_name),
        duration = format_duration(summary.total_duration_ms.unwrap_or(0)),
        total = summary.total_tests,
        passed = summary.passed,
        failed = summary.failed,
        skipped = summary.skipped,
        pass_rate = pass_rate,
        tests_html = tests_html,
        session = html_escape(&results.session_id),
        generated = html_escape(&results.generated_at),
    )
}

fn test_card(test: &TestCaseReport) -> String {
    let status_class = test.status.label();

    let message_html = match &test.status {
        TestStatus::Failed { error } => {
            format!(r#"<div class="message error">{}</div>"#, html_escape(error))
        }
        TestStatus::Skipped { reason } => {
            format!(r#"<div class="message skip">{}</div>"#, html_escape(reason))
        }
        _ => String::new(),
    };

    let steps_html: String = test
        .steps
        .iter()
        .map(|step| {
            let (icon, class) = match step.status {
                StepStatus::Passed => ("✓", "passed"),
                StepStatus::Failed { .. } => ("✗", "failed"),
            };
            format!(
                r#"<div class="step {class}"><span class="icon">{icon}</span><span>{}</span><span class="duration">{}ms</span></div>"#,
                html_escape(&step.name),
                step.duration_ms,
            )
        })
        .collect();

    let attachments_html: String = test
        .attachments
        .iter()
        .filter_map(|a| match a.kind {
            AttachmentKind::Text => a.body.as_ref().map(|body| {
                let line = if a.name == "note" {
                    html_escape(body)
                } else {
                    format!("{}: {}", html_escape(&a.name), html_escape(body))
                };
                format!(r#"<div class="attachment">📎 {}</div>"#, line)
            }),
            AttachmentKind::Png => a.path.as_ref().map(|path| {
                format!(
                    r#"<div class="attachment">📸 <a href="{0}">{0}</a></div>"#,
                    html_escape(path)
                )
            }),
        })
        .collect();

    let screenshot_html = test
        .screenshot_path
        .as_ref()
        .map(|path| {
            format!(
                r#"<div class="screenshot"><img src="{}" alt="Failure screenshot"></div>"#,
                html_escape(path)
            )
        })
        .unwrap_or_default();

    let duration_html = test
        .duration_ms
        .map(|d| format!(r#"<span class="duration">{}</span>"#, format_duration(d)))
        .unwrap_or_default();

    format!(
        r#"
        <div class="test {status_class}">
            <div class="test-header">
                <div>
                    <h3>{title} <span class="badge">{status_class}</span></h3>
                    <div class="feature">{feature} · {name}</div>
                </div>
                {duration_html}
            </div>
            {message_html}
            <div class="steps">{steps_html}</div>
            <div class="attachments">{attachments_html}</div>
            {screenshot_html}
        </div>
        "#,
        title = html_escape(&test.title),
        feature = html_escape(&test.feature),
        name = html_escape(&test.name),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 59_950 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        // round before splitting so 119.6s reads 2m 0s
        let total = (ms + 500) / 1000;
        format!("{}m {}s", total / 60, total % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::state::{Attachment, StepRecord, TestSummary};

    fn failed_login() -> TestResults {
        TestResults {
            session_id: "run-1".to_string(),
            suite_name: "firstcry".to_string(),
            tests: vec![TestCaseReport {
                index: 0,
                name: "test_login_with_mobile_number_and_otp".to_string(),
                title: "TC_LOGIN_001 - Login with Mobile Number and OTP".to_string(),
                feature: "Login".to_string(),
                status: TestStatus::Failed {
                    error: "Manual OTP not entered in time".to_string(),
                },
                duration_ms: Some(61_200),
                steps: vec![StepRecord {
                    name: "Clicking Login button".to_string(),
                    status: StepStatus::Passed,
                    duration_ms: 420,
                }],
                attachments: vec![Attachment::png(
                    "test_login_with_mobile_number_and_otp",
                    "shots/test_login_with_mobile_number_and_otp_20250101-120000.png",
                )],
                screenshot_path: Some(
                    "shots/test_login_with_mobile_number_and_otp_20250101-120000.png".to_string(),
                ),
            }],
            summary: TestSummary {
                session_id: "run-1".to_string(),
                total_tests: 1,
                passed: 0,
                failed: 1,
                skipped: 0,
                screenshots: 1,
                total_duration_ms: Some(61_500),
            },
            generated_at: "2025-01-01 12:00:00".to_string(),
        }
    }

    #[test]
    fn failed_test_shows_error_and_screenshot() {
        let html = generate_html(&failed_login());
        assert!(html.contains("Manual OTP not entered in time"));
        assert!(html.contains(
            r#"<img src="shots/test_login_with_mobile_number_and_otp_20250101-120000.png""#
        ));
        assert!(html.contains("Clicking Login button"));
        assert!(html.contains("1m 2s"));
    }

    #[test]
    fn durations_are_humanized() {
        assert_eq!(format_duration(950), "950ms");
        assert_eq!(format_duration(1500), "1.5s");
        assert_eq!(format_duration(125_000), "2m 5s");
    }

    #[test]
    fn seconds_never_round_up_to_sixty() {
        assert_eq!(format_duration(119_600), "2m 0s");
        assert_eq!(format_duration(59_960), "1m 0s");
        assert_eq!(format_duration(59_940), "59.9s");
        assert_eq!(format_duration(60_400), "1m 0s");
    }
}
