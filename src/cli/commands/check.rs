//! Credential and connectivity diagnostic.

use console::style;

use crate::config::Settings;
use crate::llm::{GeminiClient, VisionModel};

const CHECK_PROMPT: &str = "Say 'Gemini is working' if you hear me.";

/// Report whether an API key is configured and whether the model answers.
pub async fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    println!("\n{}", style("Medilens Diagnostics").bold());
    println!("{}", "-".repeat(50));

    let Some(api_key) = settings.llm.api_key.as_deref().filter(|k| !k.is_empty()) else {
        println!(
            "  {:<12} {}",
            "API key",
            style("✗ GEMINI_API_KEY not set (.env or environment)").red()
        );
        if let Ok(cwd) = std::env::current_dir() {
            println!("  {:<12} {}", "Directory", cwd.display());
        }
        return Ok(());
    };

    println!(
        "  {:<12} {} (starts with {}...)",
        "API key",
        style("✓ found").green(),
        key_prefix(api_key)
    );

    let client = GeminiClient::new(settings.llm.clone())?;
    println!("  {:<12} {}", "Model", client.model_name());

    match client.generate(CHECK_PROMPT, None).await {
        Ok(reply) => println!(
            "  {:<12} {} {}",
            "Response",
            style("✓").green(),
            reply.trim()
        ),
        Err(e) => println!(
            "  {:<12} {} {}",
            "Response",
            style("✗ API connection failed:").red(),
            e
        ),
    }

    Ok(())
}

/// First five characters of the key, enough to tell keys apart.
fn key_prefix(key: &str) -> &str {
    match key.char_indices().nth(5) {
        Some((idx, _)) => &key[..idx],
        None => key,
    }
}
