//! OTP entry for the mobile-number login.
//!
//! In an automated build environment the fixed test code is typed into the
//! digit fields. Locally a human types the code sent to the phone and the
//! suite polls the fields until every digit is filled.

use anyhow::{Context, Result};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use super::wait::poll_until;
use crate::driver::traits::{BrowserDriver, ElementState, Selector};
use crate::utils::config::OtpConfig;

/// How the OTP gets into the digit fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpMode {
    /// Type a known code, one digit per field
    Automated { code: String },
    /// Wait for a human to type the code
    Manual { timeout: Duration, interval: Duration },
}

impl OtpMode {
    /// Select the mode from the process environment
    pub fn detect(config: &OtpConfig) -> Self {
        Self::detect_with(config, |name| std::env::var(name).ok())
    }

    /// Automated when the configured CI variable is set to a non-empty value
    pub fn detect_with<F>(config: &OtpConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(&config.ci_env_var) {
            Some(v) if !v.is_empty() => Self::automated(&config.fixed_code),
            _ => OtpMode::Manual {
                timeout: Duration::from_secs(config.manual_timeout_secs),
                interval: Duration::from_millis(config.poll_interval_ms),
            },
        }
    }

    pub fn automated(code: &str) -> Self {
        OtpMode::Automated {
            code: code.to_string(),
        }
    }

    pub fn is_automated(&self) -> bool {
        matches!(self, OtpMode::Automated { .. })
    }
}

/// Digit field selectors `notp0`, `notp1`, ...
pub fn otp_fields(digits: usize) -> Vec<Selector> {
    (0..digits)
        .map(|i| Selector::id(format!("notp{}", i)))
        .collect()
}

/// Poll until every field holds a value, `timeout` elapses or `stop` is raised.
///
/// Lookup errors (fields re-rendering, stale nodes) count as "not yet".
pub async fn wait_for_manual_otp_entry(
    driver: &dyn BrowserDriver,
    fields: &[Selector],
    timeout: Duration,
    interval: Duration,
    stop: &AtomicBool,
) -> bool {
    let outcome = poll_until(timeout, interval, stop, || async move {
        for field in fields {
            if driver.value_of(field).await?.is_empty() {
                return Ok(false);
            }
        }
        Ok::<bool, anyhow::Error>(true)
    })
    .await;

    if outcome.cancelled {
        log::info!("OTP wait abandoned after {} polls", outcome.attempts);
    } else if !outcome.satisfied {
        log::warn!(
            "OTP not entered after {} polls ({}ms), last error: {}",
            outcome.attempts,
            outcome.elapsed.as_millis(),
            outcome.last_error.as_deref().unwrap_or("none")
        );
    }
    outcome.satisfied
}

/// Type `code` into the fields, one character each
pub async fn fill_fixed_otp(
    driver: &dyn BrowserDriver,
    fields: &[Selector],
    code: &str,
    timeout: Duration,
) -> Result<()> {
    let digits: Vec<char> = code.chars().collect();
    anyhow::ensure!(
        digits.len() == fields.len(),
        "OTP code has {} digits but the form has {} fields",
        digits.len(),
        fields.len()
    );

    for (field, digit) in fields.iter().zip(digits) {
        driver
            .wait_for(field, ElementState::Visible, timeout)
            .await
            .with_context(|| format!("OTP field {} did not appear", field))?;
        driver.type_text(field, &digit.to_string()).await?;
    }
    Ok(())
}
