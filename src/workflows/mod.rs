//! The ordered storefront workflow tests.
//!
//! Each test runs against the shared browser session and depends on the one
//! before it, forming the chain Login -> Search -> Wishlist -> Cart -> Cleanup.

pub mod cart;
pub mod login;
pub mod search;
pub mod selectors;
pub mod wishlist;

use async_trait::async_trait;

use crate::error::SuiteResult;
use crate::runner::context::WorkflowContext;

pub use cart::{AddToCartAndManageWishlist, RemoveAllItemsFromCart};
pub use login::LoginWithMobileNumberAndOtp;
pub use search::SearchAndOpenProductPage;
pub use wishlist::AddToWishlist;

/// One named test in the suite
#[async_trait]
pub trait WorkflowTest: Send + Sync {
    /// Name used in reports and screenshot file names
    fn name(&self) -> &str;

    /// Human-readable title shown in reports
    fn title(&self) -> &str {
        self.name()
    }

    /// Feature group
    fn feature(&self) -> &str;

    /// Test that must have passed before this one may run
    fn depends_on(&self) -> Option<&str> {
        None
    }

    async fn run(&self, ctx: &mut WorkflowContext<'_>) -> SuiteResult;
}

/// The five storefront tests in execution order
pub fn storefront_suite() -> Vec<Box<dyn WorkflowTest>> {
    vec![
        Box::new(LoginWithMobileNumberAndOtp),
        Box::new(SearchAndOpenProductPage),
        Box::new(AddToWishlist),
        Box::new(AddToCartAndManageWishlist),
        Box::new(RemoveAllItemsFromCart),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suite_is_a_single_dependency_chain() {
        let suite = storefront_suite();
        assert_eq!(suite.len(), 5);
        assert_eq!(suite[0].depends_on(), None);
        for pair in suite.windows(2) {
            assert_eq!(pair[1].depends_on(), Some(pair[0].name()));
        }
    }

    #[test]
    fn names_match_report_identifiers() {
        let suite = storefront_suite();
        let names: Vec<&str> = suite.iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec![
                "test_login_with_mobile_number_and_otp",
                "test_search_and_open_product_page",
                "test_add_to_wishlist",
                "test_add_to_cart_and_manage_wishlist",
                "test_remove_all_items_from_cart",
            ]
        );
    }
}
