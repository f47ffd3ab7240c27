pub mod html;
pub mod json;
pub mod junit;
pub mod types;

use anyhow::{Context, Result};
use std::path::Path;

/// Generate report from a saved `test-results.json`
pub async fn generate_report(
    results_path: &Path,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let results = std::fs::read_to_string(results_path)
        .with_context(|| format!("Failed to read {}", results_path.display()))?;
    let test_results: types::TestResults = serde_json::from_str(&results)
        .with_context(|| format!("{} is not a test results file", results_path.display()))?;

    match format {
        "json" => json::generate(&test_results, output).await,
        "html" => html::generate(&test_results, output).await,
        "junit" => match output {
            Some(path) => {
                let xml = junit::generate_junit_xml(&test_results)?;
                std::fs::write(path, xml)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("JUnit report saved to: {}", path.display());
                Ok(())
            }
            None => {
                println!("{}", junit::generate_junit_xml(&test_results)?);
                Ok(())
            }
        },
        _ => anyhow::bail!("Unknown format: {}", format),
    }
}
