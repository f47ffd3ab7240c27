//! Storefront element locators.

use crate::driver::traits::Selector;

pub fn login_button() -> Selector {
    Selector::xpath("//span[contains(text(), 'Login')]")
}

pub fn mobile_input() -> Selector {
    Selector::id("lemail")
}

pub fn continue_button() -> Selector {
    Selector::xpath("//span[normalize-space()='CONTINUE']")
}

pub fn submit_otp_button() -> Selector {
    Selector::xpath("//div[contains(@class, 'loginSignup_submitOtpBtn_block')]/span[text()='SUBMIT']")
}

pub fn account_marker() -> Selector {
    Selector::xpath("//span[contains(text(),'My Account') or contains(text(),'Logout')]")
}

pub fn search_box() -> Selector {
    Selector::id("search_box")
}

pub fn search_button() -> Selector {
    Selector::css(".search-button")
}

/// Result link whose title contains the product name
pub fn product_link(product: &str) -> Selector {
    Selector::xpath(format!("//a[contains(@title,{})]", xpath_literal(product)))
}

pub fn product_image_info() -> Selector {
    Selector::id("prodImgInfo")
}

pub fn wishlist_toggle() -> Selector {
    Selector::xpath("//label[@data-fc-ricon='y']")
}

pub fn add_to_cart_button() -> Selector {
    Selector::xpath(
        "//*[contains(translate(text(),'abcdefghijklmnopqrstuvwxyz','ABCDEFGHIJKLMNOPQRSTUVWXYZ'),'ADD TO CART')]",
    )
}

pub fn cart_icon() -> Selector {
    Selector::xpath("//span[contains(@class,'cart-icon')]")
}

pub fn wishlist_tab_heart() -> Selector {
    Selector::xpath("//*[@id='ShortlistTab1']/a/span[1]")
}

pub fn wishlist_remove_item() -> Selector {
    Selector::xpath("//label[contains(@class,'delete_sec')]")
}

pub fn cart_total_count() -> Selector {
    Selector::id("cart_TotalCount")
}

pub fn cart_remove_buttons() -> Selector {
    Selector::xpath(
        "//div[contains(@class,'shortcomm')]//span[contains(text(),'REMOVE') or contains(text(),'Remove')]",
    )
}

/// Quote a string for use inside an XPath expression
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_link_quotes_the_name() {
        assert_eq!(
            product_link("Babyhug Cosy Cosmo Stroller"),
            Selector::xpath("//a[contains(@title,'Babyhug Cosy Cosmo Stroller')]")
        );
    }

    #[test]
    fn xpath_literal_handles_apostrophes() {
        assert_eq!(xpath_literal("Mom's Pick"), "\"Mom's Pick\"");
        assert_eq!(
            xpath_literal(r#"Mom's "Best""#),
            r#"concat('Mom', "'", 's "Best"')"#
        );
    }
}
