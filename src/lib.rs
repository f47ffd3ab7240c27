pub mod driver;
pub mod error;
pub mod report;
pub mod runner;
pub mod utils;
pub mod workflows;

// Re-export common items
pub use error::{SuiteError, SuiteResult};
pub use report::generate_report;
pub use runner::{run_suite, RunOptions};
