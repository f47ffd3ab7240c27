use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use super::context::{StepReporter, WorkflowContext, WorkflowState, RUN_INTERRUPTED};
use super::events::{EventEmitter, TestEvent};
use super::otp::OtpMode;
use super::state::{Attachment, SuiteState, TestCaseState, TestSummary};
use crate::driver::traits::BrowserDriver;
use crate::error::SuiteError;
use crate::utils::config::SuiteConfig;
use crate::workflows::WorkflowTest;

/// Runs the ordered workflow tests against one shared browser
///
/// Wraps every test with the lifecycle hook: start event, dependency gate,
/// outcome recording, and a screenshot when the test fails.
pub struct SuiteExecutor<'a> {
    driver: &'a dyn BrowserDriver,
    config: &'a SuiteConfig,
    otp: OtpMode,
    suite: SuiteState,
    workflow: WorkflowState,
    emitter: EventEmitter,
    interrupted: Arc<AtomicBool>,
}

impl<'a> SuiteExecutor<'a> {
    pub fn new(
        driver: &'a dyn BrowserDriver,
        config: &'a SuiteConfig,
        otp: OtpMode,
        emitter: EventEmitter,
    ) -> Self {
        Self {
            driver,
            config,
            otp,
            suite: SuiteState::new(&Uuid::new_v4().to_string(), "firstcry"),
            workflow: WorkflowState::default(),
            emitter,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share a flag that, once set, skips every test not yet started
    pub fn with_interrupt_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = flag;
        self
    }

    pub fn state(&self) -> &SuiteState {
        &self.suite
    }

    pub fn workflow(&self) -> &WorkflowState {
        &self.workflow
    }

    /// Run every test in order and return the summary
    pub async fn run(&mut self, tests: &[Box<dyn WorkflowTest>]) -> TestSummary {
        self.suite.start();
        self.emitter.emit(TestEvent::SuiteStarted {
            session_id: self.suite.session_id.clone(),
            suite_name: self.suite.suite_name.clone(),
            test_count: tests.len(),
        });

        for (index, test) in tests.iter().enumerate() {
            let record = self.run_test(index, test.as_ref()).await;
            self.suite.add_test(record);
        }

        self.suite.finish();
        let summary = self.suite.summary();
        self.emitter.emit(TestEvent::SuiteFinished {
            summary: summary.clone(),
        });
        summary
    }

    async fn run_test(&mut self, index: usize, test: &dyn WorkflowTest) -> TestCaseState {
        let name = test.name().to_string();
        let mut record = TestCaseState::new(index, &name, test.title(), test.feature());

        if self.interrupted.load(Ordering::SeqCst) {
            record.skip(RUN_INTERRUPTED.to_string());
            self.emitter.emit(TestEvent::TestSkipped {
                name,
                reason: RUN_INTERRUPTED.to_string(),
            });
            return record;
        }

        self.emitter.emit(TestEvent::TestStarted {
            index,
            name: name.clone(),
            title: test.title().to_string(),
        });
        record.start();

        let reporter = StepReporter::new(&name, self.emitter.clone());
        let outcome = match self.workflow.gate.check(test.depends_on()) {
            Ok(()) => {
                let mut ctx = WorkflowContext {
                    driver: self.driver,
                    config: self.config,
                    otp: &self.otp,
                    state: &mut self.workflow,
                    reporter: reporter.clone(),
                    interrupted: &*self.interrupted,
                };
                test.run(&mut ctx).await
            }
            Err(skip) => Err(skip),
        };

        let recorded = reporter.take();
        record.steps = recorded.steps;
        record.attachments = recorded.attachments;

        match outcome {
            Ok(()) => {
                record.pass();
                self.workflow.gate.record_pass(&name);
                self.emitter.emit(TestEvent::TestPassed {
                    name,
                    duration_ms: record.duration_ms.unwrap_or(0),
                });
            }
            Err(SuiteError::Skipped(reason)) => {
                record.skip(reason.clone());
                self.emitter.emit(TestEvent::TestSkipped { name, reason });
            }
            // Abandoned by Ctrl+C, not a product failure
            Err(SuiteError::Failed(e)) if self.interrupted.load(Ordering::SeqCst) => {
                log::info!("{} abandoned: {:#}", name, e);
                record.skip(RUN_INTERRUPTED.to_string());
                self.emitter.emit(TestEvent::TestSkipped {
                    name,
                    reason: RUN_INTERRUPTED.to_string(),
                });
            }
            Err(SuiteError::Failed(e)) => {
                let error = format!("{:#}", e);
                record.fail(error.clone());
                log::debug!("{} failed: {:?}", name, e);

                let screenshot = self.handle_failure(&name).await;
                if let Some(path) = &screenshot {
                    record.attachments.push(Attachment::png(&name, path));
                    record.screenshot_path = Some(path.clone());
                }
                self.emitter.emit(TestEvent::TestFailed {
                    name,
                    error,
                    duration_ms: record.duration_ms.unwrap_or(0),
                    screenshot,
                });
            }
        }

        record
    }

    /// Capture the failure screenshot; errors are reported, never raised
    async fn handle_failure(&self, test_name: &str) -> Option<String> {
        match capture_screenshot(self.driver, &self.config.screenshot_dir, test_name).await {
            Ok(path) => Some(path.to_string_lossy().to_string()),
            Err(e) => {
                log::warn!("screenshot for {} failed: {:#}", test_name, e);
                self.emitter.emit(TestEvent::Log {
                    message: format!("{} Failed to take screenshot: {:#}", "⚠".yellow(), e),
                });
                None
            }
        }
    }

    /// Write JSON, HTML and JUnit reports when reporting is enabled
    pub async fn finish(&mut self) -> Result<TestSummary> {
        if self.suite.finished_at.is_none() {
            self.suite.finish();
        }
        let summary = self.suite.summary();

        if !self.config.report {
            return Ok(summary);
        }

        // Let the console listener drain SuiteFinished before report lines
        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

        let output_dir = &self.config.output_dir;
        std::fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory {}", output_dir.display())
        })?;

        let results = crate::report::types::TestResults::from_report(self.suite.to_report());

        let json_path = output_dir.join("test-results.json");
        crate::report::json::generate(&results, Some(&json_path)).await?;

        let html_path = output_dir.join("report.html");
        crate::report::html::generate(&results, Some(&html_path)).await?;

        crate::report::junit::write_report(&results, output_dir)?;

        Ok(summary)
    }
}

/// Save a PNG named `<test>_<YYYYmmdd-HHMMSS>.png` under `dir`
///
/// The returned path is absolute so report links resolve from any output
/// directory.
pub async fn capture_screenshot(
    driver: &dyn BrowserDriver,
    dir: &Path,
    test_name: &str,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create screenshot directory {}", dir.display()))?;

    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let mut path = dir.join(format!("{}_{}.png", test_name, timestamp));
    if path.is_relative() {
        path = std::env::current_dir()
            .context("Failed to resolve the working directory")?
            .join(path);
    }
    driver.take_screenshot(&path).await?;
    Ok(path)
}
