use thiserror::Error;

/// Outcome error of a suite test
///
/// A skip is a deliberate signal from the dependency gate and is never
/// reported as a failure. Everything else (assertions, driver errors,
/// timeouts) is a failure and triggers failure capture.
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("skipped: {0}")]
    Skipped(String),

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl SuiteError {
    pub fn skip(reason: impl Into<String>) -> Self {
        SuiteError::Skipped(reason.into())
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, SuiteError::Skipped(_))
    }
}

pub type SuiteResult<T = ()> = std::result::Result<T, SuiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_step() -> anyhow::Result<()> {
        anyhow::bail!("Manual OTP not entered in time")
    }

    fn run() -> SuiteResult {
        failing_step()?;
        Ok(())
    }

    #[test]
    fn anyhow_errors_become_failures() {
        let err = run().unwrap_err();
        assert!(!err.is_skip());
        assert_eq!(err.to_string(), "Manual OTP not entered in time");
    }

    #[test]
    fn skip_keeps_reason() {
        let err = SuiteError::skip("login was not successful");
        assert!(err.is_skip());
        assert_eq!(err.to_string(), "skipped: login was not successful");
    }
}
