use super::types::TestResults;
use anyhow::{Context, Result};
use std::path::Path;

/// Generate JSON report
pub async fn generate(results: &TestResults, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;

    if let Some(path) = output {
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("JSON report saved to: {}", path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}
