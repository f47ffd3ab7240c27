pub mod context;
pub mod events;
pub mod executor;
pub mod otp;
pub mod session;
pub mod state;
pub mod wait;

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use events::*;
pub use state::*;

use executor::SuiteExecutor;
use otp::OtpMode;
use session::BrowserSession;

use crate::utils::config::SuiteConfig;
use crate::workflows::storefront_suite;

/// Command-line overrides applied on top of the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub screenshots: Option<PathBuf>,
    pub headless: bool,
    pub report: bool,
    pub otp_code: Option<String>,
}

impl RunOptions {
    /// Load the configuration file (if any) and apply the overrides
    pub fn resolve_config(&self) -> Result<SuiteConfig> {
        let mut config = SuiteConfig::load(self.config.as_deref())?;
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(dir) = &self.screenshots {
            config.screenshot_dir = dir.clone();
        }
        if self.headless {
            config.browser.headless = true;
        }
        if self.report {
            config.report = true;
        }
        Ok(config)
    }

    /// An explicit code always wins over environment detection
    pub fn otp_mode(&self, config: &SuiteConfig) -> OtpMode {
        match &self.otp_code {
            Some(code) => OtpMode::automated(code),
            None => OtpMode::detect(&config.otp),
        }
    }
}

/// Run the storefront suite in one browser session
pub async fn run_suite(options: RunOptions) -> Result<TestSummary> {
    let config = options.resolve_config()?;
    let otp = options.otp_mode(&config);

    println!("  Target: {}", config.base_url.cyan());
    println!(
        "  OTP: {}",
        if otp.is_automated() {
            "fixed code".yellow()
        } else {
            "manual entry".cyan()
        }
    );
    println!(
        "  Screenshots: {}",
        config.screenshot_dir.display().to_string().cyan()
    );
    if config.report {
        println!(
            "  Reports: {}",
            config.output_dir.display().to_string().cyan()
        );
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || {
        // A second Ctrl+C means the graceful stop is not getting through
        if flag.swap(true, Ordering::SeqCst) {
            eprintln!("\n{} Interrupted again, exiting", "⏹️ ".red());
            std::process::exit(130);
        }
        println!(
            "\n{} Interrupted, skipping remaining tests (Ctrl+C again to exit)...",
            "⏹️ ".yellow()
        );
    })
    .context("Failed to install Ctrl+C handler")?;

    let session = BrowserSession::launch(&config.browser).await?;
    run_with_session(session, &config, otp, interrupted).await
}

/// Run the suite in an already launched session, closing it afterwards
///
/// The browser is closed whether the tests pass, fail or the reports cannot
/// be written.
pub async fn run_with_session(
    session: BrowserSession,
    config: &SuiteConfig,
    otp: OtpMode,
    interrupted: Arc<AtomicBool>,
) -> Result<TestSummary> {
    let (emitter, receiver) = EventEmitter::new();
    let listener = tokio::spawn(ConsoleEventListener::listen(receiver));

    let suite = storefront_suite();
    let result = {
        let mut executor = SuiteExecutor::new(session.driver(), config, otp, emitter)
            .with_interrupt_flag(interrupted);
        executor.run(&suite).await;
        executor.finish().await
    };

    // Close regardless of how the run went
    if let Err(e) = session.close().await {
        log::warn!("{:#}", e);
        println!("  {} {:#}", "⚠".yellow(), e);
    }

    // Emitter dropped with the executor, so the listener drains and exits
    listener.await.ok();

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fake::FakeBrowser;
    use crate::workflows::selectors;

    #[test]
    fn cli_overrides_config() {
        let options = RunOptions {
            output: Some(PathBuf::from("reports")),
            screenshots: Some(PathBuf::from("shots")),
            headless: true,
            report: true,
            ..RunOptions::default()
        };
        let config = options.resolve_config().unwrap();
        assert_eq!(config.output_dir, PathBuf::from("reports"));
        assert_eq!(config.screenshot_dir, PathBuf::from("shots"));
        assert!(config.browser.headless);
        assert!(config.report);
    }

    #[test]
    fn explicit_otp_code_forces_automated_mode() {
        let options = RunOptions {
            otp_code: Some("654321".to_string()),
            ..RunOptions::default()
        };
        let config = SuiteConfig::default();
        assert_eq!(options.otp_mode(&config), OtpMode::automated("654321"));
    }

    #[tokio::test(start_paused = true)]
    async fn browser_is_closed_when_tests_and_reports_fail() {
        let dir = std::env::temp_dir().join(format!("firstcry-e2e-close-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        // a plain file where the output directory should go
        let blocked = dir.join("output");
        std::fs::write(&blocked, "not a directory").unwrap();
        let config = SuiteConfig {
            screenshot_dir: dir.join("screenshots"),
            output_dir: blocked,
            report: true,
            ..SuiteConfig::default()
        };

        let fake = FakeBrowser::new()
            .with_url("https://www.firstcry.com/")
            .with_missing(selectors::submit_otp_button());
        let session = BrowserSession::from_driver(Box::new(fake.clone()));

        let result = run_with_session(
            session,
            &config,
            OtpMode::automated("123456"),
            Arc::new(AtomicBool::new(false)),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(fake.state().screenshots.len(), 1);
        assert!(fake.state().closed);

        std::fs::remove_dir_all(&dir).ok();
    }
}
