//! Concurrent loading of layer datasets.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use geojson::FeatureCollection;
use web_time::Instant;

use crate::error::GeoviewError;
use crate::layer::data_provider::DatasetProvider;
use crate::layer::{LayerData, LayerDescriptor, LoadState};

/// Loads the datasets of a list of layers.
///
/// All datasets of a batch are fetched concurrently and the batch completes once every fetch has
/// settled. A failing fetch marks only its own layer as [`LoadState::Failed`]; the failure is
/// logged and never returned to the caller.
#[derive(Clone)]
pub struct LayerDataLoader {
    provider: Arc<dyn DatasetProvider>,
    timeout: Option<Duration>,
}

impl LayerDataLoader {
    /// Creates a loader fetching datasets from the provider, with no time limit.
    pub fn new(provider: impl DatasetProvider + 'static) -> Self {
        Self::from_shared(Arc::new(provider))
    }

    /// Creates a loader from a provider shared with other components.
    pub fn from_shared(provider: Arc<dyn DatasetProvider>) -> Self {
        Self {
            provider,
            timeout: None,
        }
    }

    /// Limits the time a single dataset fetch may take. A fetch that runs over the limit fails
    /// like any other.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }

    /// Returns new descriptors with the datasets attached, in the order of `descriptors`. The
    /// input descriptors are not modified.
    pub async fn load(&self, descriptors: &[LayerDescriptor]) -> Vec<LayerDescriptor> {
        let started = Instant::now();
        let loaded = join_all(descriptors.iter().map(|layer| self.load_layer(layer))).await;

        log::debug!(
            "Loaded batch of {} layers in {:?} ({} failed)",
            loaded.len(),
            started.elapsed(),
            loaded.iter().filter(|l| !l.is_available()).count()
        );

        loaded
    }

    async fn load_layer(&self, layer: &LayerDescriptor) -> LayerDescriptor {
        match self.fetch(layer.source()).await {
            Ok(collection) => {
                let data = LayerData::new(layer.id, collection);
                log::info!(
                    "Loaded layer {} ({}): {} features",
                    layer.id,
                    layer.name,
                    data.len()
                );
                layer.with_state(LoadState::Loaded(Arc::new(data)))
            }
            Err(err) => {
                log::warn!(
                    "Failed to load dataset for layer {} ({}) from {}: {err}",
                    layer.id,
                    layer.name,
                    layer.source()
                );
                layer.with_state(LoadState::Failed)
            }
        }
    }

    async fn fetch(&self, location: &str) -> Result<FeatureCollection, GeoviewError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.provider.load(location))
                .await
                .map_err(|_| GeoviewError::Timeout)?,
            None => self.provider.load(location).await,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;
    use crate::catalog::Catalog;
    use crate::layer::data_provider::MemoryDatasetProvider;
    use crate::layer::LayerId;
    use crate::Color;

    pub(crate) fn document(names: &[&str]) -> String {
        let features: Vec<_> = names
            .iter()
            .map(|name| {
                serde_json::json!({
                    "type": "Feature",
                    "geometry": { "type": "LineString", "coordinates": [[-78.5, -7.16], [-78.51, -7.17]] },
                    "properties": { "name": name }
                })
            })
            .collect();

        serde_json::json!({ "type": "FeatureCollection", "features": features }).to_string()
    }

    fn descriptors() -> Vec<LayerDescriptor> {
        vec![
            LayerDescriptor::new(LayerId(1), "Parques", true, Color::BLACK, "/one.json"),
            LayerDescriptor::new(LayerId(2), "Calles", true, Color::BLACK, "/two.json"),
            LayerDescriptor::new(LayerId(3), "Límites", false, Color::BLACK, "/three.json"),
        ]
    }

    #[tokio::test]
    async fn failing_layer_does_not_affect_others() {
        let provider = MemoryDatasetProvider::new();
        provider.insert("/one.json", document(&["a", "b"]));
        provider.insert("/three.json", document(&["c"]));

        let input = descriptors();
        let loaded = LayerDataLoader::new(provider).load(&input).await;

        let ids: Vec<_> = loaded.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![LayerId(1), LayerId(2), LayerId(3)]);

        assert_eq!(loaded[0].data().expect("layer 1 not loaded").len(), 2);
        assert_matches!(loaded[1].state(), LoadState::Failed);
        assert_eq!(loaded[2].data().expect("layer 3 not loaded").len(), 1);

        assert!(!loaded[2].visible);
        assert!(input.iter().all(|l| matches!(l.state(), LoadState::Pending)));
    }

    #[tokio::test]
    async fn malformed_documents_fail() {
        let provider = MemoryDatasetProvider::new();
        provider.insert("/one.json", "not json");
        provider.insert("/two.json", r#"{"type":"Point","coordinates":[0,0]}"#);
        provider.insert("/three.json", document(&[]));

        let loaded = LayerDataLoader::new(provider).load(&descriptors()).await;
        assert_matches!(loaded[0].state(), LoadState::Failed);
        assert_matches!(loaded[1].state(), LoadState::Failed);
        assert!(loaded[2].data().expect("not loaded").is_empty());
    }

    #[tokio::test]
    async fn loaded_features_are_tagged() {
        let provider = MemoryDatasetProvider::new();
        for location in ["/one.json", "/two.json", "/three.json"] {
            provider.insert(location, document(&["x", "y"]));
        }

        let loaded = LayerDataLoader::new(provider).load(&descriptors()).await;
        for layer in &loaded {
            let data = layer.data().expect("not loaded");
            assert!(data.features().iter().all(|f| f.layer() == layer.id));
        }
    }

    #[tokio::test]
    async fn empty_batch() {
        let loader = LayerDataLoader::new(MemoryDatasetProvider::new());
        assert!(loader.load(&Catalog::default().resolve(42)).await.is_empty());
    }

    struct ConcurrencyProbe {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl DatasetProvider for ConcurrencyProbe {
        async fn load(&self, _location: &str) -> Result<FeatureCollection, GeoviewError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            Err(GeoviewError::NotFound)
        }
    }

    #[tokio::test]
    async fn fetches_run_concurrently() {
        let probe = Arc::new(ConcurrencyProbe {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        });

        let loader = LayerDataLoader::from_shared(probe.clone());
        let loaded = loader.load(&descriptors()).await;

        assert_eq!(loaded.len(), 3);
        assert_eq!(probe.max_in_flight.load(Ordering::SeqCst), 3);
    }

    struct NeverResponds;

    #[async_trait]
    impl DatasetProvider for NeverResponds {
        async fn load(&self, _location: &str) -> Result<FeatureCollection, GeoviewError> {
            futures::future::pending().await
        }
    }

    #[tokio::test]
    async fn hung_fetch_times_out() {
        let loader = LayerDataLoader::new(NeverResponds).with_timeout(Duration::from_millis(10));
        let loaded = loader.load(&descriptors()[..1]).await;
        assert_matches!(loaded[0].state(), LoadState::Failed);
    }
}
