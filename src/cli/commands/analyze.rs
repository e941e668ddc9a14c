//! One-off analysis of a local file.

use std::path::Path;

use anyhow::Context;
use console::style;

use crate::analysis::{Analysis, Analyzer};
use crate::config::Settings;

/// Analyze a report file and print the response JSON to stdout.
pub async fn cmd_analyze(
    settings: &Settings,
    file: &Path,
    media_type: Option<&str>,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let media_type = media_type.map(str::to_string).unwrap_or_else(|| {
        mime_guess::from_path(file)
            .first_or_octet_stream()
            .to_string()
    });

    let analyzer = Analyzer::from_config(&settings.llm)?;
    let analysis = analyzer.analyze(&bytes, &media_type).await;

    if let Analysis::Fallback { reason, .. } = &analysis {
        eprintln!(
            "{} Real analysis unavailable ({}), showing sample data",
            style("!").yellow(),
            reason
        );
    }

    let json = serde_json::to_string_pretty(&analysis.into_response())?;
    println!("{}", json);

    Ok(())
}
