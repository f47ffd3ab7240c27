//! Web Driver implementation using Playwright
//!
//! One `WebDriver` owns one browser process, one context and the page that
//! currently has focus. Popups opened by the site join the same context and can
//! be switched to with [`BrowserDriver::switch_to_new_tab`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::Colorize;
use playwright::api::{Browser, BrowserContext, Page, Viewport};
use playwright::Playwright;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::driver::traits::{BrowserDriver, ElementState, Selector};
use crate::utils::config::{BrowserConfig, BrowserType};

/// Poll interval for element state checks
const POLL_INTERVAL: Duration = Duration::from_millis(100);

const PRESENT_JS: &str = "el => el.isConnected";

const VISIBLE_JS: &str = "el => {
    if (!el.isConnected) return false;
    const style = window.getComputedStyle(el);
    const rect = el.getBoundingClientRect();
    return style.display !== 'none' && style.visibility !== 'hidden'
        && style.opacity !== '0' && rect.width > 0 && rect.height > 0;
}";

const CLICKABLE_JS: &str = "el => {
    if (!el.isConnected || el.disabled) return false;
    const style = window.getComputedStyle(el);
    const rect = el.getBoundingClientRect();
    return style.display !== 'none' && style.visibility !== 'hidden'
        && style.pointerEvents !== 'none' && rect.width > 0 && rect.height > 0;
}";

/// Web Driver using Playwright
pub struct WebDriver {
    #[allow(dead_code)]
    playwright: Playwright,
    browser: Browser,
    context: BrowserContext,
    page: Mutex<Page>,
    config: BrowserConfig,
}

impl WebDriver {
    /// Launch a browser and open a blank page
    pub async fn launch(config: BrowserConfig) -> Result<Self> {
        let playwright = Playwright::initialize()
            .await
            .context("Failed to initialize Playwright")?;

        let browser = match config.browser_type {
            BrowserType::Chromium => launch_chromium_browser(&playwright.chromium(), &config).await?,
            BrowserType::Firefox => {
                playwright
                    .firefox()
                    .launcher()
                    .headless(config.headless)
                    .launch()
                    .await?
            }
            BrowserType::Webkit => {
                playwright
                    .webkit()
                    .launcher()
                    .headless(config.headless)
                    .launch()
                    .await?
            }
        };

        let context = browser.context_builder().build().await?;
        let page = context.new_page().await?;

        page.set_viewport_size(Viewport {
            width: config.window_width as i32,
            height: config.window_height as i32,
        })
        .await?;

        log::info!(
            "browser launched: {:?} headless={} implicit_wait={}ms",
            config.browser_type,
            config.headless,
            config.implicit_wait_ms
        );

        Ok(Self {
            playwright,
            browser,
            context,
            page: Mutex::new(page),
            config,
        })
    }

    /// Poll `predicate` against the first element matching `sel` until it
    /// returns true or `timeout` elapses.
    async fn poll_element(
        &self,
        page: &Page,
        sel: &str,
        predicate: &str,
        timeout: Duration,
    ) -> Result<bool> {
        let start = Instant::now();
        loop {
            let ready: bool = page
                .evaluate_on_selector(sel, predicate, None::<String>)
                .await
                .unwrap_or(false);
            if ready {
                return Ok(true);
            }
            if start.elapsed() >= timeout {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Implicit wait: the element must at least be attached
    async fn require(&self, page: &Page, selector: &Selector, predicate: &str) -> Result<String> {
        let sel = selector_to_playwright(selector);
        if self
            .poll_element(page, &sel, predicate, self.config.implicit_wait())
            .await?
        {
            Ok(sel)
        } else {
            anyhow::bail!(
                "Element not found within {}ms: {}",
                self.config.implicit_wait_ms,
                selector
            )
        }
    }
}

/// Convert Selector to Playwright selector string
fn selector_to_playwright(selector: &Selector) -> String {
    match selector {
        Selector::Id(id) => format!("[id=\"{}\"]", id),
        Selector::XPath(xpath) => format!("xpath={}", xpath),
        Selector::Css(css) => css.clone(),
    }
}

#[async_trait]
impl BrowserDriver for WebDriver {
    fn browser_name(&self) -> &str {
        match self.config.browser_type {
            BrowserType::Chromium => "chromium",
            BrowserType::Firefox => "firefox",
            BrowserType::Webkit => "webkit",
        }
    }

    async fn goto(&self, url: &str) -> Result<()> {
        let page = self.page.lock().await;
        page.goto_builder(url)
            .goto()
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;
        Ok(())
    }

    async fn wait_for(
        &self,
        selector: &Selector,
        state: ElementState,
        timeout: Duration,
    ) -> Result<()> {
        let page = self.page.lock().await;
        let sel = selector_to_playwright(selector);
        let predicate = match state {
            ElementState::Present => PRESENT_JS,
            ElementState::Visible => VISIBLE_JS,
            ElementState::Clickable => CLICKABLE_JS,
        };

        if self.poll_element(&page, &sel, predicate, timeout).await? {
            Ok(())
        } else {
            anyhow::bail!(
                "Timed out after {}ms waiting for {} to be {}",
                timeout.as_millis(),
                selector,
                state
            )
        }
    }

    async fn count(&self, selector: &Selector) -> Result<usize> {
        let page = self.page.lock().await;
        let sel = selector_to_playwright(selector);
        Ok(page.query_selector_all(&sel).await?.len())
    }

    async fn value_of(&self, selector: &Selector) -> Result<String> {
        let page = self.page.lock().await;
        let sel = self.require(&page, selector, PRESENT_JS).await?;
        let value: String = page
            .evaluate_on_selector(&sel, "el => el.value || ''", None::<String>)
            .await?;
        Ok(value)
    }

    async fn is_displayed(&self, selector: &Selector) -> Result<bool> {
        let page = self.page.lock().await;
        let sel = selector_to_playwright(selector);
        match page.query_selector(&sel).await? {
            Some(el) => Ok(el.is_visible().await?),
            None => Ok(false),
        }
    }

    async fn click(&self, selector: &Selector) -> Result<()> {
        let page = self.page.lock().await;
        let sel = self.require(&page, selector, PRESENT_JS).await?;
        match page.click_builder(&sel).click().await {
            Ok(_) => Ok(()),
            Err(e) => {
                log::debug!("click failed for '{}': {:?}", sel, e);
                Err(anyhow::anyhow!("Failed to click: {}. Error: {:?}", selector, e))
            }
        }
    }

    async fn js_click(&self, selector: &Selector) -> Result<()> {
        let page = self.page.lock().await;
        let sel = self.require(&page, selector, PRESENT_JS).await?;
        page.evaluate_on_selector::<String, ()>(&sel, "el => { el.click(); }", None)
            .await?;
        Ok(())
    }

    async fn scroll_into_view(&self, selector: &Selector) -> Result<()> {
        let page = self.page.lock().await;
        let sel = self.require(&page, selector, PRESENT_JS).await?;
        page.evaluate_on_selector::<String, ()>(&sel, "el => { el.scrollIntoView(true); }", None)
            .await?;
        Ok(())
    }

    async fn scroll_by(&self, dx: i32, dy: i32) -> Result<()> {
        let page = self.page.lock().await;
        let js = format!("window.scrollBy({}, {})", dx, dy);
        page.evaluate::<(), ()>(&js, ()).await?;
        Ok(())
    }

    async fn clear(&self, selector: &Selector) -> Result<()> {
        let page = self.page.lock().await;
        let sel = self.require(&page, selector, PRESENT_JS).await?;
        page.evaluate_on_selector::<String, ()>(
            &sel,
            "el => { el.value = ''; el.dispatchEvent(new Event('input', { bubbles: true })); }",
            None,
        )
        .await?;
        Ok(())
    }

    async fn type_text(&self, selector: &Selector, text: &str) -> Result<()> {
        let page = self.page.lock().await;
        let sel = self.require(&page, selector, VISIBLE_JS).await?;
        page.evaluate_on_selector::<String, ()>(&sel, "el => { el.focus(); }", None)
            .await?;
        page.keyboard.input_text(text).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let page = self.page.lock().await;
        let url: String = page.evaluate("() => window.location.href", ()).await?;
        Ok(url)
    }

    async fn switch_to_new_tab(&self) -> Result<Option<String>> {
        let pages = self.context.pages()?;
        if pages.len() < 2 {
            return Ok(None);
        }

        let Some(newest) = pages.into_iter().last() else {
            return Ok(None);
        };
        newest.bring_to_front().await.ok();
        let url: String = newest.evaluate("() => window.location.href", ()).await?;

        let mut page = self.page.lock().await;
        *page = newest;
        log::debug!("switched to tab {}", url);
        Ok(Some(url))
    }

    async fn take_screenshot(&self, path: &Path) -> Result<()> {
        let page = self.page.lock().await;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        page.screenshot_builder()
            .path(path.to_path_buf())
            .screenshot()
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.browser
            .close()
            .await
            .context("Failed to close browser")?;
        log::info!("browser closed");
        Ok(())
    }
}

/// Launch a new Chromium browser, maximized unless configured otherwise
async fn launch_chromium_browser(
    chromium: &playwright::api::BrowserType,
    config: &BrowserConfig,
) -> Result<Browser> {
    let mut launcher = chromium.launcher();
    launcher = launcher.headless(config.headless);

    let executable = config.executable.clone().or_else(find_system_browser);
    if let Some(ref path) = executable {
        println!("{} Using browser: {}", "🌐".blue(), path.display());
        launcher = launcher.executable(path);
    } else {
        println!(
            "{} No browser executable found. Using Playwright's bundled Chromium",
            "ℹ".blue()
        );
    }

    let mut args: Vec<String> = vec![
        "--no-sandbox",
        "--disable-setuid-sandbox",
        "--disable-dev-shm-usage",
        "--ignore-certificate-errors",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    if config.maximized {
        args.push("--start-maximized".to_string());
    } else {
        args.push(format!(
            "--window-size={},{}",
            config.window_width, config.window_height
        ));
    }

    launcher = launcher.args(&args);

    Ok(launcher.launch().await?)
}

fn find_system_browser() -> Option<PathBuf> {
    let common_paths = [
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
    ];

    for path in common_paths {
        let p = Path::new(path);
        if p.exists() {
            return Some(p.to_path_buf());
        }
    }

    ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"]
        .iter()
        .find_map(|name| which::which(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_to_playwright() {
        assert_eq!(
            selector_to_playwright(&Selector::id("notp0")),
            "[id=\"notp0\"]"
        );
        assert_eq!(
            selector_to_playwright(&Selector::xpath("//span[text()='SUBMIT']")),
            "xpath=//span[text()='SUBMIT']"
        );
        assert_eq!(
            selector_to_playwright(&Selector::css(".search-button")),
            ".search-button"
        );
    }
}
