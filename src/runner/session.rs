//! Session-scoped browser shared by every test in a run.

use anyhow::{Context, Result};

use crate::driver::traits::BrowserDriver;
use crate::driver::web::WebDriver;
use crate::utils::config::BrowserConfig;

/// One browser for the whole suite
///
/// The handle is valid from [`BrowserSession::launch`] until
/// [`BrowserSession::close`]; tests only ever borrow it.
pub struct BrowserSession {
    driver: Box<dyn BrowserDriver>,
}

impl BrowserSession {
    /// Launch the configured browser
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let driver = WebDriver::launch(config.clone())
            .await
            .context("Failed to launch browser for the suite")?;
        println!("🚀 Browser launched once for the entire suite");
        Ok(Self::from_driver(Box::new(driver)))
    }

    pub fn from_driver(driver: Box<dyn BrowserDriver>) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &dyn BrowserDriver {
        self.driver.as_ref()
    }

    /// Close the browser, consuming the session
    pub async fn close(self) -> Result<()> {
        let name = self.driver.browser_name().to_string();
        self.driver
            .close()
            .await
            .with_context(|| format!("Failed to close {} browser", name))?;
        println!("🧹 Browser closed after entire suite completed");
        Ok(())
    }
}
