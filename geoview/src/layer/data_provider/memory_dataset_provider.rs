use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use geojson::FeatureCollection;
use parking_lot::RwLock;

use super::{decode_feature_collection, DatasetProvider};
use crate::error::GeoviewError;

/// Dataset provider serving documents kept in memory, keyed by location.
///
/// Useful for bundled datasets and for running the viewer without a server. Unknown locations
/// fail with [`GeoviewError::NotFound`].
#[derive(Debug, Default)]
pub struct MemoryDatasetProvider {
    documents: RwLock<HashMap<String, Bytes>>,
}

impl MemoryDatasetProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a document under the location, replacing any previous one.
    pub fn insert(&self, location: impl Into<String>, document: impl Into<Bytes>) {
        self.documents.write().insert(location.into(), document.into());
    }

    /// Removes the document stored under the location.
    pub fn remove(&self, location: &str) -> Option<Bytes> {
        self.documents.write().remove(location)
    }
}

#[async_trait]
impl DatasetProvider for MemoryDatasetProvider {
    async fn load(&self, location: &str) -> Result<FeatureCollection, GeoviewError> {
        let document = self
            .documents
            .read()
            .get(location)
            .cloned()
            .ok_or(GeoviewError::NotFound)?;

        decode_feature_collection(&document)
    }
}
