use std::path::Path;

use crate::CoreError;
use crate::fetch::Fetch;

/// Fetch `locator` and write the body verbatim to `dest`, replacing any
/// existing file. Returns the number of bytes written.
///
/// Nothing is written unless the server answers 200. The body is not checked
/// for being a PDF, and a write interrupted halfway is not repaired.
pub async fn download_resource(
    fetcher: &dyn Fetch,
    locator: &str,
    dest: &Path,
) -> Result<u64, CoreError> {
    tracing::info!(locator, dest = %dest.display(), "downloading paper");

    let resp = fetcher
        .get(locator)
        .await
        .map_err(|e| CoreError::DownloadFailed {
            locator: locator.to_string(),
            reason: e.to_string(),
        })?;

    if !resp.is_ok() {
        return Err(CoreError::DownloadFailed {
            locator: locator.to_string(),
            reason: format!("HTTP {}", resp.status),
        });
    }

    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(dest, &resp.body).await?;

    let written = resp.body.len() as u64;
    tracing::info!(bytes = written, "paper saved");
    Ok(written)
}
