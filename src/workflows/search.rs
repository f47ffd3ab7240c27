use async_trait::async_trait;
use std::time::Duration;

use super::{selectors, WorkflowTest};
use crate::driver::traits::ElementState;
use crate::error::SuiteResult;
use crate::runner::context::WorkflowContext;

pub struct SearchAndOpenProductPage;

#[async_trait]
impl WorkflowTest for SearchAndOpenProductPage {
    fn name(&self) -> &str {
        "test_search_and_open_product_page"
    }

    fn feature(&self) -> &str {
        "Search"
    }

    fn depends_on(&self) -> Option<&str> {
        Some("test_login_with_mobile_number_and_otp")
    }

    async fn run(&self, ctx: &mut WorkflowContext<'_>) -> SuiteResult {
        ctx.state.gate.require_login("search test")?;

        let driver = ctx.driver;
        let query = ctx.config.product_query.as_str();
        let wait = Duration::from_millis(ctx.config.timeouts.search_ms);

        ctx.reporter
            .step("Searching for product", async {
                let search_box = selectors::search_box();
                driver
                    .wait_for(&search_box, ElementState::Clickable, wait)
                    .await?;
                driver.clear(&search_box).await?;
                driver.type_text(&search_box, query).await?;
                driver.js_click(&selectors::search_button()).await
            })
            .await?;

        ctx.reporter
            .step("Clicking product link", async {
                let product = selectors::product_link(query);
                driver.wait_for(&product, ElementState::Clickable, wait).await?;
                driver.scroll_into_view(&product).await?;
                driver.js_click(&product).await
            })
            .await?;

        if let Some(tab) = driver.switch_to_new_tab().await? {
            ctx.reporter.note(&format!("Switched to new tab: {}", tab));
        }

        let url = ctx
            .reporter
            .step("Verifying product page load", async {
                driver
                    .wait_for(&selectors::product_image_info(), ElementState::Present, wait)
                    .await?;
                driver.current_url().await
            })
            .await?;

        ctx.reporter.attach_text("Product Page URL", &url);
        ctx.state.product_url = Some(url);
        Ok(())
    }
}
