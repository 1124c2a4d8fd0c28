use std::path::PathBuf;

use async_trait::async_trait;
use geojson::FeatureCollection;

use super::{decode_feature_collection, DatasetProvider};
use crate::error::GeoviewError;
use crate::platform::{PlatformService, PlatformServiceImpl};

/// Base that relative dataset locations are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetRoot {
    /// Datasets are served over HTTP under the given base url.
    Url(String),
    /// Datasets are files under the given directory.
    Directory(PathBuf),
}

impl DatasetRoot {
    /// Creates a root that serves datasets from a web server.
    pub fn url(base: impl Into<String>) -> Self {
        Self::Url(base.into())
    }

    /// Creates a root that reads datasets from a local directory.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::Directory(path.into())
    }

    /// Resolves a dataset location against the root. Absolute `http(s)` urls are used as is.
    pub fn resolve(&self, location: &str) -> DatasetLocation {
        if is_absolute_url(location) {
            return DatasetLocation::Remote(location.to_owned());
        }

        let relative = location.trim_start_matches('/');
        match self {
            DatasetRoot::Url(base) => {
                DatasetLocation::Remote(format!("{}/{relative}", base.trim_end_matches('/')))
            }
            DatasetRoot::Directory(dir) => DatasetLocation::Local(dir.join(relative)),
        }
    }
}

impl Default for DatasetRoot {
    fn default() -> Self {
        Self::Directory(PathBuf::from("."))
    }
}

fn is_absolute_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Resolved location of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetLocation {
    /// Fetched with an HTTP `GET`.
    Remote(String),
    /// Read from the file system.
    Local(PathBuf),
}

/// Dataset provider that loads GeoJSON documents over HTTP or from local files.
pub struct UrlDatasetProvider {
    root: DatasetRoot,
    platform_service: PlatformServiceImpl,
}

impl UrlDatasetProvider {
    /// Creates a new provider resolving relative locations against `root`.
    pub fn new(root: DatasetRoot) -> Self {
        Self {
            root,
            platform_service: PlatformServiceImpl::new(),
        }
    }

    /// Root of relative dataset locations.
    pub fn root(&self) -> &DatasetRoot {
        &self.root
    }
}

#[async_trait]
impl DatasetProvider for UrlDatasetProvider {
    async fn load(&self, location: &str) -> Result<FeatureCollection, GeoviewError> {
        let resolved = self.root.resolve(location);
        log::trace!("Loading dataset {location} from {resolved:?}");

        let bytes = match &resolved {
            DatasetLocation::Remote(url) => self.platform_service.load_bytes_from_url(url).await?,
            DatasetLocation::Local(path) => self.platform_service.load_bytes_from_file(path).await?,
        };

        log::trace!("Dataset {location} loaded. Byte size: {}", bytes.len());

        decode_feature_collection(&bytes)
    }
}
