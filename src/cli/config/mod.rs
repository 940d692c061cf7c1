//! Config command - prints the merged configuration as JSON

use crate::config::AppConfig;

/// Load every configuration layer and print the result with secrets masked
pub async fn run() -> anyhow::Result<()> {
    let loaded = AppConfig::load().await?;
    if let Some(reason) = &loaded.remote_fallback {
        eprintln!("warning: remote configuration unavailable, using local sources: {}", reason);
    }
    println!("{}", render(&loaded.config)?);
    Ok(())
}

fn render(config: &AppConfig) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&config.redacted())?)
}
