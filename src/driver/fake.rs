//! Scripted in-memory browser for exercising the runner without Playwright.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

use super::traits::{BrowserDriver, ElementState, Selector};

#[derive(Default)]
pub(crate) struct FakeState {
    /// Selectors that never appear; waits, lookups and clicks on them fail
    pub missing: HashSet<Selector>,
    /// Input values by selector; `type_text` appends here
    pub values: HashMap<Selector, String>,
    /// Fields that a "human" fills in at the given instant
    pub filled_at: HashMap<Selector, Instant>,
    /// `value_of` fails until this instant
    pub lookup_errors_until: Option<Instant>,
    /// Native clicks on these fail; script clicks still work
    pub failing_clicks: HashSet<Selector>,
    /// Selector whose matches disappear one per click (cart remove buttons)
    pub removable: Option<(Selector, usize)>,
    pub url: String,
    pub new_tab_url: Option<String>,
    pub actions: Vec<String>,
    pub value_reads: usize,
    pub screenshots: Vec<PathBuf>,
    pub closed: bool,
}

/// Clones share one state, so a test can keep a handle to a driver it gave away
#[derive(Default, Clone)]
pub(crate) struct FakeBrowser {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn with_missing(self, selector: Selector) -> Self {
        self.state().missing.insert(selector);
        self
    }

    pub fn with_removable(self, selector: Selector, count: usize) -> Self {
        self.state().removable = Some((selector, count));
        self
    }

    pub fn with_url(self, url: &str) -> Self {
        self.state().url = url.to_string();
        self
    }

    pub fn with_new_tab(self, url: &str) -> Self {
        self.state().new_tab_url = Some(url.to_string());
        self
    }

    pub fn remaining(&self) -> usize {
        self.state().removable.as_ref().map(|(_, n)| *n).unwrap_or(0)
    }

    pub fn actions(&self) -> Vec<String> {
        self.state().actions.clone()
    }

    fn check_present(state: &FakeState, selector: &Selector) -> Result<()> {
        if state.missing.contains(selector) {
            anyhow::bail!("Element not found: {}", selector);
        }
        Ok(())
    }

    fn record_click(state: &mut FakeState, kind: &str, selector: &Selector) {
        if let Some((removable, remaining)) = state.removable.as_mut() {
            if removable == selector {
                *remaining = remaining.saturating_sub(1);
            }
        }
        state.actions.push(format!("{} {}", kind, selector));
    }
}

#[async_trait]
impl BrowserDriver for FakeBrowser {
    fn browser_name(&self) -> &str {
        "fake"
    }

    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.state();
        state.url = url.to_string();
        state.actions.push(format!("goto {}", url));
        Ok(())
    }

    async fn wait_for(
        &self,
        selector: &Selector,
        state: ElementState,
        _timeout: Duration,
    ) -> Result<()> {
        let guard = self.state();
        if guard.missing.contains(selector) {
            anyhow::bail!("Timed out waiting for {} to be {}", selector, state);
        }
        Ok(())
    }

    async fn count(&self, selector: &Selector) -> Result<usize> {
        let state = self.state();
        if let Some((removable, remaining)) = state.removable.as_ref() {
            if removable == selector {
                return Ok(*remaining);
            }
        }
        Ok(if state.missing.contains(selector) { 0 } else { 1 })
    }

    async fn value_of(&self, selector: &Selector) -> Result<String> {
        let mut state = self.state();
        state.value_reads += 1;
        Self::check_present(&state, selector)?;
        let now = Instant::now();
        if state.lookup_errors_until.is_some_and(|until| now < until) {
            anyhow::bail!("stale element: {}", selector);
        }
        if state.filled_at.get(selector).is_some_and(|at| now >= *at) {
            return Ok("7".to_string());
        }
        Ok(state.values.get(selector).cloned().unwrap_or_default())
    }

    async fn is_displayed(&self, selector: &Selector) -> Result<bool> {
        Ok(!self.state().missing.contains(selector))
    }

    async fn click(&self, selector: &Selector) -> Result<()> {
        let mut state = self.state();
        Self::check_present(&state, selector)?;
        if state.failing_clicks.contains(selector) {
            anyhow::bail!("element click intercepted: {}", selector);
        }
        Self::record_click(&mut state, "click", selector);
        Ok(())
    }

    async fn js_click(&self, selector: &Selector) -> Result<()> {
        let mut state = self.state();
        Self::check_present(&state, selector)?;
        Self::record_click(&mut state, "js_click", selector);
        Ok(())
    }

    async fn scroll_into_view(&self, selector: &Selector) -> Result<()> {
        let mut state = self.state();
        Self::check_present(&state, selector)?;
        state.actions.push(format!("scroll {}", selector));
        Ok(())
    }

    async fn scroll_by(&self, dx: i32, dy: i32) -> Result<()> {
        self.state().actions.push(format!("scroll_by {} {}", dx, dy));
        Ok(())
    }

    async fn clear(&self, selector: &Selector) -> Result<()> {
        let mut state = self.state();
        Self::check_present(&state, selector)?;
        state.values.remove(selector);
        Ok(())
    }

    async fn type_text(&self, selector: &Selector, text: &str) -> Result<()> {
        let mut state = self.state();
        Self::check_present(&state, selector)?;
        state
            .values
            .entry(selector.clone())
            .or_default()
            .push_str(text);
        state.actions.push(format!("type {} {}", selector, text));
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state().url.clone())
    }

    async fn switch_to_new_tab(&self) -> Result<Option<String>> {
        let mut state = self.state();
        match state.new_tab_url.take() {
            Some(url) => {
                state.url = url.clone();
                Ok(Some(url))
            }
            None => Ok(None),
        }
    }

    async fn take_screenshot(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, b"\x89PNG\r\n\x1a\n")?;
        self.state().screenshots.push(path.to_path_buf());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.state().closed = true;
        Ok(())
    }
}
