use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Suite configuration
///
/// Every field has a default matching the production storefront, so an empty
/// YAML document (or no file at all) yields a runnable configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuiteConfig {
    /// Storefront landing page
    pub base_url: String,

    /// Mobile number used for OTP login
    pub mobile_number: String,

    /// Product searched for and opened by the search test
    pub product_query: String,

    /// Directory receiving failure screenshots
    pub screenshot_dir: PathBuf,

    /// Directory receiving JSON/HTML/JUnit reports
    pub output_dir: PathBuf,

    /// Write report files when the suite finishes
    pub report: bool,

    pub browser: BrowserConfig,
    pub otp: OtpConfig,
    pub timeouts: TimeoutConfig,
    pub pauses: PauseConfig,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.firstcry.com/".to_string(),
            mobile_number: "9363025780".to_string(),
            product_query: "Babyhug Cosy Cosmo Stroller".to_string(),
            screenshot_dir: PathBuf::from("src/test/resources/screenshots"),
            output_dir: PathBuf::from("output"),
            report: false,
            browser: BrowserConfig::default(),
            otp: OtpConfig::default(),
            timeouts: TimeoutConfig::default(),
            pauses: PauseConfig::default(),
        }
    }
}

impl SuiteConfig {
    /// Load from a YAML file, or defaults when no path is given,
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config file {}", p.display()))?;
                Self::from_yaml(&content)
                    .with_context(|| format!("Invalid config file {}", p.display()))?
            }
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply `FIRSTCRY_HEADLESS` and `PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("FIRSTCRY_HEADLESS") {
            self.browser.headless = v == "true" || v == "1";
        }
        if let Some(path) = lookup("PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH") {
            if !path.is_empty() {
                self.browser.executable = Some(PathBuf::from(path));
            }
        }
    }

    /// Host portion of the base URL, used by the URL-based login check
    pub fn site_host(&self) -> String {
        let without_scheme = self
            .base_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.base_url);
        let host = without_scheme.split('/').next().unwrap_or(without_scheme);
        host.trim_start_matches("www.").to_lowercase()
    }
}

/// Web browser type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowserConfig {
    pub browser_type: BrowserType,
    pub headless: bool,
    pub maximized: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Implicit wait applied to element lookups (ms)
    pub implicit_wait_ms: u64,
    pub executable: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            browser_type: BrowserType::Chromium,
            headless: false,
            maximized: true,
            window_width: 1920,
            window_height: 1080,
            implicit_wait_ms: 10_000,
            executable: None,
        }
    }
}

impl BrowserConfig {
    pub fn implicit_wait(&self) -> Duration {
        Duration::from_millis(self.implicit_wait_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OtpConfig {
    /// Environment variable marking an automated build environment
    pub ci_env_var: String,
    /// Code typed when running in the automated environment
    pub fixed_code: String,
    /// Number of OTP digit fields (`notp0`..)
    pub digits: usize,
    /// How long to wait for a human to type the OTP (s)
    pub manual_timeout_secs: u64,
    /// Polling interval of the manual-entry loop (ms)
    pub poll_interval_ms: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ci_env_var: "JENKINS_HOME".to_string(),
            fixed_code: "123456".to_string(),
            digits: 6,
            manual_timeout_secs: 60,
            poll_interval_ms: 1000,
        }
    }
}

/// Explicit wait budgets per test (ms)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeoutConfig {
    pub login_ms: u64,
    pub login_confirm_ms: u64,
    pub search_ms: u64,
    pub step_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            login_ms: 20_000,
            login_confirm_ms: 15_000,
            search_ms: 30_000,
            step_ms: 20_000,
        }
    }
}

/// Fixed pauses tolerating animation and rendering lag (ms)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PauseConfig {
    pub settle_ms: u64,
    pub cart_open_ms: u64,
    pub cart_load_ms: u64,
    pub after_removal_ms: u64,
}

impl Default for PauseConfig {
    fn default() -> Self {
        Self {
            settle_ms: 1000,
            cart_open_ms: 2000,
            cart_load_ms: 3000,
            after_removal_ms: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = SuiteConfig::from_yaml("").unwrap();
        assert_eq!(config.product_query, "Babyhug Cosy Cosmo Stroller");
        assert_eq!(config.browser.implicit_wait_ms, 10_000);
        assert_eq!(config.otp.digits, 6);
        assert_eq!(config.otp.ci_env_var, "JENKINS_HOME");
    }

    #[test]
    fn partial_yaml_overrides_only_named_fields() {
        let yaml = r#"
productQuery: "Babyhug Stroller"
browser:
  headless: true
otp:
  manualTimeoutSecs: 30
"#;
        let config = SuiteConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.product_query, "Babyhug Stroller");
        assert!(config.browser.headless);
        assert!(config.browser.maximized);
        assert_eq!(config.otp.manual_timeout_secs, 30);
        assert_eq!(config.otp.poll_interval_ms, 1000);
        assert_eq!(config.mobile_number, "9363025780");
    }

    #[test]
    fn env_overrides_headless_and_executable() {
        let mut config = SuiteConfig::default();
        config.apply_env(|name| match name {
            "FIRSTCRY_HEADLESS" => Some("1".to_string()),
            "PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH" => Some("/opt/chrome".to_string()),
            _ => None,
        });
        assert!(config.browser.headless);
        assert_eq!(config.browser.executable, Some(PathBuf::from("/opt/chrome")));
    }

    #[test]
    fn site_host_strips_scheme_and_www() {
        let config = SuiteConfig::default();
        assert_eq!(config.site_host(), "firstcry.com");

        let mut other = SuiteConfig::default();
        other.base_url = "http://staging.FirstCry.com:8080/home".to_string();
        assert_eq!(other.site_host(), "staging.firstcry.com:8080");
    }
}
