//! Remote configuration document fetched at startup

use std::time::Duration;

use config::ConfigError;
use tracing::debug;

/// Fetch the JSON configuration document at `url`
pub async fn fetch_remote_document(url: &str, timeout: Duration) -> Result<String, ConfigError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ConfigError::Message(format!("Failed to build HTTP client: {}", e)))?;

    debug!(url = %url, "Fetching remote configuration");

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| ConfigError::Message(format!("Failed to fetch remote config: {}", e)))?;

    let body = response
        .text()
        .await
        .map_err(|e| ConfigError::Message(format!("Failed to read remote config: {}", e)))?;

    serde_json::from_str::<serde_json::Value>(&body)
        .map_err(|e| ConfigError::Message(format!("Remote config is not JSON: {}", e)))?;

    Ok(body)
}
