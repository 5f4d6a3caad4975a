//! `export` and `restore`: the glue between tab lists, files, and the vault.

use std::path::Path;

use anyhow::{Context, Result};
use common::session::{decode_urls, encode_urls};
use tracing::info;

use crate::client::VaultClient;

/// Gather URLs from the command line and, optionally, a file with one URL
/// per line. Blank lines are skipped; order is preserved.
pub async fn collect_urls(mut urls: Vec<String>, input: Option<&Path>) -> Result<Vec<String>> {
    if let Some(path) = input {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read URL list {}", path.display()))?;
        urls.extend(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned),
        );
    }
    Ok(urls)
}

/// Encrypt `urls` through the vault and write the envelope to `output`.
///
/// The file is only written after the vault has returned an envelope, so a
/// failed encryption leaves no file behind.
pub async fn export(client: &VaultClient, urls: &[String], output: &Path) -> Result<()> {
    let plain_text = encode_urls(urls);
    let envelope = client
        .encrypt(&plain_text)
        .await
        .context("error saving tabs")?;

    tokio::fs::write(output, envelope)
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(count = urls.len(), path = %output.display(), "tabs encrypted and saved");
    Ok(())
}

/// Read an envelope file, decrypt it through the vault and return its URLs.
pub async fn restore(client: &VaultClient, file: &Path) -> Result<Vec<String>> {
    let envelope = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let plain_text = client
        .decrypt(&envelope)
        .await
        .context("error restoring tabs")?;
    let urls = decode_urls(&plain_text).context("error restoring tabs")?;
    info!(count = urls.len(), "tabs restored successfully");
    Ok(urls)
}
