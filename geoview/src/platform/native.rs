//! Platform service backed by `reqwest` and `tokio::fs`.

use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use log::info;
use reqwest::StatusCode;

use crate::error::GeoviewError;
use crate::platform::PlatformService;

const USER_AGENT: &str = concat!("geoview/", env!("CARGO_PKG_VERSION"));

/// Platform service for native targets.
#[derive(Debug, Clone)]
pub struct NativePlatformService {
    http_client: reqwest::Client,
}

#[async_trait]
impl PlatformService for NativePlatformService {
    fn new() -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|err| {
                log::warn!("Failed to configure HTTP client, using defaults: {err}");
                reqwest::Client::new()
            });

        Self { http_client }
    }

    async fn load_bytes_from_url(&self, url: &str) -> Result<Bytes, GeoviewError> {
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            info!("Failed to load {url}: {status}");
            return Err(match status {
                StatusCode::NOT_FOUND => GeoviewError::NotFound,
                _ => GeoviewError::Status(status.as_u16()),
            });
        }

        Ok(response.bytes().await?)
    }

    async fn load_bytes_from_file(&self, path: &Path) -> Result<Bytes, GeoviewError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(bytes.into()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("Dataset file {} does not exist", path.display());
                Err(GeoviewError::NotFound)
            }
            Err(err) => Err(err.into()),
        }
    }
}
