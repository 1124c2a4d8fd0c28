//! Sources of layer datasets.

mod memory_dataset_provider;
mod url_dataset_provider;

use async_trait::async_trait;
use geojson::{FeatureCollection, GeoJson};

pub use memory_dataset_provider::MemoryDatasetProvider;
pub use url_dataset_provider::{DatasetLocation, DatasetRoot, UrlDatasetProvider};

use crate::error::GeoviewError;

/// Fetches and decodes the feature collection stored at a dataset location.
#[async_trait]
pub trait DatasetProvider: Send + Sync {
    /// Loads the collection from `location`.
    async fn load(&self, location: &str) -> Result<FeatureCollection, GeoviewError>;
}

/// Decodes a GeoJSON document that must be a `FeatureCollection`.
pub fn decode_feature_collection(bytes: &[u8]) -> Result<FeatureCollection, GeoviewError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| GeoviewError::Generic(format!("dataset is not valid UTF-8: {err}")))?;

    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        _ => Err(GeoviewError::NotFeatureCollection),
    }
}
