use async_trait::async_trait;
use std::time::Duration;

use super::{selectors, WorkflowTest};
use crate::driver::traits::ElementState;
use crate::error::SuiteResult;
use crate::runner::context::WorkflowContext;

pub struct AddToWishlist;

#[async_trait]
impl WorkflowTest for AddToWishlist {
    fn name(&self) -> &str {
        "test_add_to_wishlist"
    }

    fn feature(&self) -> &str {
        "Wishlist"
    }

    fn depends_on(&self) -> Option<&str> {
        Some("test_search_and_open_product_page")
    }

    async fn run(&self, ctx: &mut WorkflowContext<'_>) -> SuiteResult {
        let driver = ctx.driver;
        let wait = Duration::from_millis(ctx.config.timeouts.step_ms);
        let settle = ctx.config.pauses.settle_ms;
        let ctx = &*ctx;

        ctx.reporter
            .step("Adding product to wishlist", async {
                let toggle = selectors::wishlist_toggle();
                driver.wait_for(&toggle, ElementState::Present, wait).await?;
                driver.scroll_into_view(&toggle).await?;
                ctx.pause(settle).await;
                driver.js_click(&toggle).await?;
                ctx.reporter.note("Added product to wishlist");
                Ok(())
            })
            .await?;
        Ok(())
    }
}
