use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Element selector for page elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Select by element `id` attribute
    Id(String),
    /// Select by XPath expression
    XPath(String),
    /// Select by CSS selector
    Css(String),
}

impl Selector {
    pub fn id(id: impl Into<String>) -> Self {
        Selector::Id(id.into())
    }

    pub fn xpath(xpath: impl Into<String>) -> Self {
        Selector::XPath(xpath.into())
    }

    pub fn css(css: impl Into<String>) -> Self {
        Selector::Css(css.into())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Id(id) => write!(f, "id={}", id),
            Selector::XPath(xpath) => write!(f, "xpath={}", xpath),
            Selector::Css(css) => write!(f, "css={}", css),
        }
    }
}

/// Condition an element must reach before an explicit wait returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    /// Attached to the DOM, visible or not
    Present,
    /// Attached and rendered
    Visible,
    /// Visible and not disabled
    Clickable,
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementState::Present => "present",
            ElementState::Visible => "visible",
            ElementState::Clickable => "clickable",
        };
        f.write_str(name)
    }
}

/// Browser automation interface used by the workflow steps
///
/// Lookups without an explicit timeout honour the driver's implicit wait.
/// All methods take `&self`; implementations keep their page handle behind
/// interior mutability so a single session can be shared by every test.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Browser name (e.g., "chromium")
    fn browser_name(&self) -> &str;

    /// Navigate the current tab to a URL
    async fn goto(&self, url: &str) -> Result<()>;

    /// Wait until an element reaches `state`
    ///
    /// # Errors
    /// Returns an error if the element does not reach the state within `timeout`.
    async fn wait_for(&self, selector: &Selector, state: ElementState, timeout: Duration)
        -> Result<()>;

    /// Count elements currently matching a selector (no implicit wait)
    async fn count(&self, selector: &Selector) -> Result<usize>;

    /// Read the `value` property of an input element
    async fn value_of(&self, selector: &Selector) -> Result<String>;

    /// Check whether the first matching element is rendered
    async fn is_displayed(&self, selector: &Selector) -> Result<bool>;

    /// Native click on the first matching element
    async fn click(&self, selector: &Selector) -> Result<()>;

    /// Click dispatched from page script, bypassing overlay checks
    async fn js_click(&self, selector: &Selector) -> Result<()>;

    /// Scroll the first matching element into view (aligned to top)
    async fn scroll_into_view(&self, selector: &Selector) -> Result<()>;

    /// Scroll the window by a pixel offset
    async fn scroll_by(&self, dx: i32, dy: i32) -> Result<()>;

    /// Clear an input element
    async fn clear(&self, selector: &Selector) -> Result<()>;

    /// Type text into an input element, appending to its current value
    async fn type_text(&self, selector: &Selector, text: &str) -> Result<()>;

    /// URL of the current tab
    async fn current_url(&self) -> Result<String>;

    /// Switch to the most recently opened tab if one exists besides the current one
    ///
    /// # Returns
    /// The new tab's URL, or None if no other tab is open
    async fn switch_to_new_tab(&self) -> Result<Option<String>>;

    /// Save a PNG screenshot of the current tab
    async fn take_screenshot(&self, path: &Path) -> Result<()>;

    /// Close the browser and terminate its process
    async fn close(&self) -> Result<()>;
}
