use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use super::{selectors, WorkflowTest};
use crate::driver::traits::{ElementState, Selector};
use crate::error::SuiteResult;
use crate::runner::context::{WorkflowContext, RUN_INTERRUPTED};

pub struct AddToCartAndManageWishlist;

#[async_trait]
impl WorkflowTest for AddToCartAndManageWishlist {
    fn name(&self) -> &str {
        "test_add_to_cart_and_manage_wishlist"
    }

    fn feature(&self) -> &str {
        "Cart & Wishlist"
    }

    fn depends_on(&self) -> Option<&str> {
        Some("test_add_to_wishlist")
    }

    async fn run(&self, ctx: &mut WorkflowContext<'_>) -> SuiteResult {
        let driver = ctx.driver;
        let wait = Duration::from_millis(ctx.config.timeouts.step_ms);
        let pauses = &ctx.config.pauses;
        let ctx = &*ctx;

        ctx.reporter
            .step("Adding product to cart", async {
                driver.scroll_by(0, 400).await?;
                reveal_and_js_click(
                    ctx,
                    &selectors::add_to_cart_button(),
                    ElementState::Present,
                    wait,
                )
                .await?;
                ctx.reporter.note("Added product to cart");
                Ok(())
            })
            .await?;

        ctx.reporter
            .step("Navigating to cart", async {
                let cart = selectors::cart_icon();
                driver.wait_for(&cart, ElementState::Clickable, wait).await?;
                driver.js_click(&cart).await?;
                ctx.reporter.note("Opened Cart page");
                ctx.pause(pauses.cart_open_ms).await;
                Ok(())
            })
            .await?;

        ctx.reporter
            .step("Opening wishlist", async {
                reveal_and_js_click(
                    ctx,
                    &selectors::wishlist_tab_heart(),
                    ElementState::Clickable,
                    wait,
                )
                .await?;
                ctx.reporter.note("Opened Wishlist page");
                Ok(())
            })
            .await?;

        ctx.reporter
            .step("Removing item from wishlist", async {
                reveal_and_js_click(
                    ctx,
                    &selectors::wishlist_remove_item(),
                    ElementState::Clickable,
                    wait,
                )
                .await?;
                ctx.reporter.note("Removed item from Wishlist successfully");
                Ok(())
            })
            .await?;
        Ok(())
    }
}

pub struct RemoveAllItemsFromCart;

#[async_trait]
impl WorkflowTest for RemoveAllItemsFromCart {
    fn name(&self) -> &str {
        "test_remove_all_items_from_cart"
    }

    fn feature(&self) -> &str {
        "Cart Cleanup"
    }

    fn depends_on(&self) -> Option<&str> {
        Some("test_add_to_cart_and_manage_wishlist")
    }

    async fn run(&self, ctx: &mut WorkflowContext<'_>) -> SuiteResult {
        let driver = ctx.driver;
        let wait = Duration::from_millis(ctx.config.timeouts.step_ms);
        let shared = &*ctx;

        let removed = shared
            .reporter
            .step("Navigating to cart and removing all items", async {
                let cart = selectors::cart_total_count();
                driver.wait_for(&cart, ElementState::Clickable, wait).await?;
                driver.scroll_into_view(&cart).await?;
                driver.js_click(&cart).await?;
                shared.reporter.note("Navigated to Cart page");
                shared.pause(shared.config.pauses.cart_load_ms).await;

                remove_all_items(shared).await
            })
            .await?;

        ctx.state.cart_removals += removed;
        Ok(())
    }
}

/// Click the first remove button until none are left, returning how many
/// removals were performed.
///
/// The loop ends when the page reports zero remove buttons, or with an
/// error once the run is interrupted.
pub async fn remove_all_items(ctx: &WorkflowContext<'_>) -> Result<usize> {
    let driver = ctx.driver;
    let pauses = &ctx.config.pauses;
    let remove = selectors::cart_remove_buttons();
    let mut removed = 0;

    loop {
        if ctx.is_interrupted() {
            log::info!("cart cleanup stopped after {} removals", removed);
            anyhow::bail!(RUN_INTERRUPTED);
        }

        let found = driver.count(&remove).await?;
        ctx.reporter.note(&format!("Found {} remove buttons", found));
        if found == 0 {
            ctx.reporter.note("Cart is empty now");
            break;
        }

        driver.scroll_into_view(&remove).await?;
        ctx.pause(pauses.settle_ms).await;
        if let Err(e) = driver.click(&remove).await {
            log::debug!("native click on remove button failed ({}), using script click", e);
            driver.js_click(&remove).await?;
        }
        ctx.pause(pauses.after_removal_ms).await;

        removed += 1;
        ctx.reporter.note("Removed one item from cart");
    }

    Ok(removed)
}

async fn reveal_and_js_click(
    ctx: &WorkflowContext<'_>,
    selector: &Selector,
    state: ElementState,
    wait: Duration,
) -> Result<()> {
    ctx.driver.wait_for(selector, state, wait).await?;
    ctx.driver.scroll_into_view(selector).await?;
    ctx.pause(ctx.config.pauses.settle_ms).await;
    ctx.driver.js_click(selector).await
}
