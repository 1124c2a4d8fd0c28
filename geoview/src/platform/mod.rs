//! Provides platform specific logic and [`PlatformService`] to access it.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::GeoviewError;

pub mod native;

/// Service providing platform specific I/O in a generic way.
#[async_trait]
pub trait PlatformService {
    /// Creates a new instance of the service. This method is a part of the trait to allow other
    /// types be agnostic of the specific type of the platform service they work with.
    fn new() -> Self;
    /// Loads a byte array from the given url with an HTTP `GET` request.
    async fn load_bytes_from_url(&self, url: &str) -> Result<Bytes, GeoviewError>;
    /// Loads a byte array from a local file.
    async fn load_bytes_from_file(&self, path: &Path) -> Result<Bytes, GeoviewError>;
}

/// Default implementation of the [`PlatformService`] for the current platform.
pub type PlatformServiceImpl = native::NativePlatformService;
