mod driver;

pub use driver::WebDriver;
