use anyhow::Result;
use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use super::events::{EventEmitter, TestEvent};
use super::otp::OtpMode;
use super::state::{Attachment, StepRecord, StepStatus};
use crate::driver::traits::BrowserDriver;
use crate::error::{SuiteError, SuiteResult};
use crate::utils::config::SuiteConfig;

/// Tracks which tests passed and whether login succeeded
///
/// The login flag can only be raised; nothing lowers it within a run.
#[derive(Debug, Default)]
pub struct DependencyGate {
    logged_in: bool,
    passed: HashSet<String>,
}

impl DependencyGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_logged_in(&mut self) {
        self.logged_in = true;
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn record_pass(&mut self, test: &str) {
        self.passed.insert(test.to_string());
    }

    pub fn has_passed(&self, test: &str) -> bool {
        self.passed.contains(test)
    }

    /// Skip signal when `dependency` has not passed in this run
    pub fn check(&self, dependency: Option<&str>) -> SuiteResult {
        match dependency {
            Some(dep) if !self.has_passed(dep) => Err(SuiteError::skip(format!(
                "depends on {} which did not pass",
                dep
            ))),
            _ => Ok(()),
        }
    }

    /// Skip signal when login has not succeeded in this run
    pub fn require_login(&self, what: &str) -> SuiteResult {
        if self.logged_in {
            Ok(())
        } else {
            Err(SuiteError::skip(format!(
                "Skipping {} because login was not successful",
                what
            )))
        }
    }
}

/// State threaded through the ordered workflow tests
#[derive(Debug, Default)]
pub struct WorkflowState {
    pub gate: DependencyGate,
    /// Product page reached by the search test
    pub product_url: Option<String>,
    /// Items removed by the cart cleanup loop
    pub cart_removals: usize,
}

/// Steps and attachments recorded while one test runs
#[derive(Debug, Default)]
pub struct StepLog {
    pub steps: Vec<StepRecord>,
    pub attachments: Vec<Attachment>,
}

/// Records named report steps and attachments for the running test
///
/// Cloneable so step futures can attach notes while the step itself is
/// being recorded.
#[derive(Clone)]
pub struct StepReporter {
    test: String,
    emitter: EventEmitter,
    log: Arc<Mutex<StepLog>>,
}

impl StepReporter {
    pub fn new(test: &str, emitter: EventEmitter) -> Self {
        Self {
            test: test.to_string(),
            emitter,
            log: Arc::new(Mutex::new(StepLog::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StepLog> {
        self.log.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `fut` as a named step, recording its duration and outcome
    pub async fn step<T, Fut>(&self, name: &str, fut: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        self.emitter.emit(TestEvent::StepStarted {
            test: self.test.clone(),
            step: name.to_string(),
        });

        let start = Instant::now();
        let result = fut.await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let status = match &result {
            Ok(_) => StepStatus::Passed,
            Err(e) => StepStatus::Failed {
                error: e.to_string(),
            },
        };
        self.lock().steps.push(StepRecord {
            name: name.to_string(),
            status,
            duration_ms,
        });

        self.emitter.emit(TestEvent::StepFinished {
            test: self.test.clone(),
            step: name.to_string(),
            passed: result.is_ok(),
            duration_ms,
        });

        result
    }

    /// Attach a free-form text note
    pub fn note(&self, text: &str) {
        self.attach(Attachment::text("note", text));
    }

    pub fn attach_text(&self, name: &str, body: &str) {
        self.attach(Attachment::text(name, body));
    }

    fn attach(&self, attachment: Attachment) {
        self.emitter.emit(TestEvent::Attached {
            test: self.test.clone(),
            name: attachment.name.clone(),
            body: attachment.body.clone().or_else(|| attachment.path.clone()),
        });
        self.lock().attachments.push(attachment);
    }

    /// Drain everything recorded so far
    pub fn take(&self) -> StepLog {
        std::mem::take(&mut *self.lock())
    }
}

/// Error text for work abandoned after Ctrl+C
pub const RUN_INTERRUPTED: &str = "Run interrupted";

/// Everything a workflow test can touch while it runs
pub struct WorkflowContext<'a> {
    pub driver: &'a dyn BrowserDriver,
    pub config: &'a SuiteConfig,
    pub otp: &'a OtpMode,
    pub state: &'a mut WorkflowState,
    pub reporter: StepReporter,
    /// Raised by the Ctrl+C handler
    pub interrupted: &'a AtomicBool,
}

impl<'a> WorkflowContext<'a> {
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Fixed pause tolerating animation and rendering lag
    pub async fn pause(&self, ms: u64) {
        if ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(ms)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_skips_until_dependency_passes() {
        let mut gate = DependencyGate::new();
        let err = gate.check(Some("test_login")).unwrap_err();
        assert!(err.is_skip());

        gate.record_pass("test_login");
        assert!(gate.check(Some("test_login")).is_ok());
        assert!(gate.check(None).is_ok());
    }

    #[test]
    fn login_flag_defaults_false_and_stays_set() {
        let mut gate = DependencyGate::new();
        assert!(!gate.is_logged_in());
        assert!(gate.require_login("search test").unwrap_err().is_skip());

        gate.mark_logged_in();
        gate.mark_logged_in();
        assert!(gate.is_logged_in());
        assert!(gate.require_login("search test").is_ok());
    }

    #[tokio::test]
    async fn step_records_outcome_and_attachments() {
        let reporter = StepReporter::new("test_add_to_wishlist", EventEmitter::default());

        let ok: Result<u32> = reporter
            .step("Adding product to wishlist", async {
                reporter.note("Added product to wishlist");
                Ok(1)
            })
            .await;
        assert_eq!(ok.unwrap(), 1);

        let err: Result<()> = reporter
            .step("Opening wishlist", async { anyhow::bail!("heart icon not found") })
            .await;
        assert!(err.is_err());

        let log = reporter.take();
        assert_eq!(log.steps.len(), 2);
        assert_eq!(log.steps[0].status, StepStatus::Passed);
        assert_eq!(
            log.steps[1].status,
            StepStatus::Failed {
                error: "heart icon not found".to_string()
            }
        );
        assert_eq!(log.attachments.len(), 1);
        assert_eq!(
            log.attachments[0].body.as_deref(),
            Some("Added product to wishlist")
        );

        assert!(reporter.take().steps.is_empty());
    }
}
