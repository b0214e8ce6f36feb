//! Model artifact acquisition
//!
//! The artifact lives at `model.path`. When that file is missing and
//! `model.download_url` is set, it is downloaded once and written atomically
//! next to its final location.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::AirqError;
use crate::config::AirqConfig;

/// Local artifact path, downloading it first if necessary
#[instrument(skip(config), fields(path = %config.model.path))]
pub async fn ensure_local(config: &AirqConfig) -> Result<PathBuf, AirqError> {
    let path = PathBuf::from(&config.model.path);
    let exists = tokio::fs::try_exists(&path).await.map_err(|e| {
        AirqError::model_unavailable(format!("cannot check {}: {e}", path.display()))
    })?;
    if exists {
        return Ok(path);
    }

    let Some(url) = config.model.download_url.as_deref() else {
        return Err(AirqError::model_unavailable(format!(
            "{} does not exist and no download URL is configured",
            path.display()
        )));
    };

    info!("Model artifact not found locally, downloading from {}", url);
    let bytes = download(url, config).await?;
    write_atomically(&path, &bytes).await?;
    info!("Saved model artifact ({} bytes) to {}", bytes.len(), path.display());
    Ok(path)
}

async fn download(url: &str, config: &AirqConfig) -> Result<Vec<u8>, AirqError> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(|e| AirqError::model_unavailable(format!("cannot create HTTP client: {e}")))?;

    let response = client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| AirqError::model_unavailable(format!("download failed: {e}")))?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AirqError::model_unavailable(format!("download interrupted: {e}")))?;
    Ok(bytes.to_vec())
}

async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), AirqError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    let result = match tokio::fs::write(&partial, bytes).await {
        Ok(()) => tokio::fs::rename(&partial, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e.into());
    }
    Ok(())
}
