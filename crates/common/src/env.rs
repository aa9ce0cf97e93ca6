//! Environment/runtime helpers
//!
//! Sanity checks to ensure the local document bucket exists at startup.

use tracing::warn;

/// Ensure the bucket directory exists; warn if it had to be created.
pub async fn ensure_env(data_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(data_dir).await.is_err() {
        warn!(%data_dir, "document bucket directory not found; creating it");
    }
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    Ok(())
}
