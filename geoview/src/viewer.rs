//! Application state of the viewer and the operations that mutate it.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::task::JoinHandle;

use crate::async_runtime;
use crate::camera::Camera;
use crate::catalog::{Catalog, SelectionConfig, SelectionId};
use crate::config::GeoviewConfig;
use crate::layer::data_provider::{DatasetProvider, DatasetRoot, UrlDatasetProvider};
use crate::layer::{LayerDescriptor, LayerId};
use crate::loader::LayerDataLoader;
use crate::messenger::Messenger;
use crate::style::Theme;

/// Result of committing a load batch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The batch replaced the layer list.
    Applied,
    /// The batch belonged to a selection that is no longer active and was dropped.
    Discarded,
}

/// Descriptors to load for a selection, tagged with the generation they belong to.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    generation: u64,
    selection: SelectionId,
    layers: Vec<LayerDescriptor>,
}

impl LoadRequest {
    /// Generation of the viewer state the request was issued for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Selection the layers belong to.
    pub fn selection(&self) -> SelectionId {
        self.selection
    }

    /// Layers to load.
    pub fn layers(&self) -> &[LayerDescriptor] {
        &self.layers
    }
}

/// State of the viewer: active selection, its layers, camera and theme.
///
/// Every selection change starts a new generation. A load batch is committed only if it was
/// issued for the current generation and nothing was committed for that generation yet, so
/// results for an abandoned selection never reach the layer list.
pub struct Viewer {
    catalog: Arc<Catalog>,
    selection: SelectionId,
    layers: Vec<LayerDescriptor>,
    camera: Camera,
    theme: Theme,
    generation: u64,
    awaiting: Option<u64>,
    messenger: Option<Box<dyn Messenger>>,
}

impl Viewer {
    /// Creates the state with the given selection active. Its layers are pending until a load
    /// batch for [`Viewer::generation`] is committed.
    pub fn new(catalog: Arc<Catalog>, selection: SelectionId, theme: Theme) -> Self {
        let camera = catalog
            .default_camera(selection)
            .unwrap_or(Camera::new(Default::default(), 2));

        Self {
            layers: catalog.resolve(selection),
            catalog,
            selection,
            camera,
            theme,
            generation: 0,
            awaiting: Some(0),
            messenger: None,
        }
    }

    /// Sets the messenger notified after every state change.
    pub fn set_messenger(&mut self, messenger: Option<Box<dyn Messenger>>) {
        self.messenger = messenger;
    }

    /// Catalog of selections.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Active selection.
    pub fn selection(&self) -> SelectionId {
        self.selection
    }

    /// Configuration of the active selection, if it is in the catalog.
    pub fn selection_config(&self) -> Option<&SelectionConfig> {
        self.catalog.get(self.selection)
    }

    /// Layers of the active selection in catalog order.
    pub fn layers(&self) -> &[LayerDescriptor] {
        &self.layers
    }

    /// Current camera.
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Current theme.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Generation of the active selection.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns true if the layers of the active selection are still being loaded.
    pub fn is_loading(&self) -> bool {
        self.awaiting.is_some()
    }

    /// Request to load the active selection again.
    pub fn load_request(&self) -> LoadRequest {
        LoadRequest {
            generation: self.generation,
            selection: self.selection,
            layers: self.catalog.resolve(self.selection),
        }
    }

    /// Activates a selection: the layer list is replaced by the selection's pending layers and
    /// the camera is reset to the selection's default. Returns the request to load the layers.
    pub fn select_map(&mut self, selection: SelectionId) -> LoadRequest {
        self.generation += 1;
        self.awaiting = Some(self.generation);
        self.selection = selection;
        self.layers = self.catalog.resolve(selection);
        if let Some(camera) = self.catalog.default_camera(selection) {
            self.camera = camera;
        }

        log::debug!(
            "Selected map {selection} (generation {}), {} layers",
            self.generation,
            self.layers.len()
        );
        self.redraw();

        self.load_request()
    }

    /// Swaps in a loaded batch. Visibility changes made while the batch was loading are kept.
    pub fn commit(&mut self, generation: u64, mut loaded: Vec<LayerDescriptor>) -> CommitOutcome {
        if self.awaiting != Some(generation) {
            log::debug!(
                "Discarding stale batch of generation {generation}, current generation is {}",
                self.generation
            );
            return CommitOutcome::Discarded;
        }

        for layer in &mut loaded {
            if let Some(current) = self.layers.iter().find(|l| l.id == layer.id) {
                layer.visible = current.visible;
            }
        }

        self.layers = loaded;
        self.awaiting = None;
        self.redraw();

        CommitOutcome::Applied
    }

    /// Flips the visibility of a layer. Returns false if the layer is not in the list.
    pub fn toggle_layer(&mut self, id: LayerId) -> bool {
        let Some(layer) = self.layers.iter_mut().find(|l| l.id == id) else {
            log::debug!("Toggle of unknown layer {id} ignored");
            return false;
        };

        layer.toggle();
        self.redraw();
        true
    }

    /// Changes the theme.
    pub fn set_theme(&mut self, theme: Theme) {
        if self.theme != theme {
            self.theme = theme;
            self.redraw();
        }
    }

    /// Switches between the dark and light theme.
    pub fn toggle_theme(&mut self) {
        self.set_theme(self.theme.toggle());
    }

    /// Changes the camera, for example after the user panned the map.
    pub fn set_camera(&mut self, camera: Camera) {
        if self.camera != camera {
            self.camera = camera;
            self.redraw();
        }
    }

    fn redraw(&self) {
        if let Some(messenger) = &self.messenger {
            messenger.request_redraw();
        }
    }
}

/// Shared handle to the viewer state that runs load batches on the async runtime.
#[derive(Clone)]
pub struct ViewerHandle {
    viewer: Arc<RwLock<Viewer>>,
    loader: LayerDataLoader,
}

impl ViewerHandle {
    /// Creates a handle for the state, loading datasets with the loader.
    pub fn new(viewer: Viewer, loader: LayerDataLoader) -> Self {
        Self {
            viewer: Arc::new(RwLock::new(viewer)),
            loader,
        }
    }

    /// Locks the state for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, Viewer> {
        self.viewer.read()
    }

    /// Locks the state for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, Viewer> {
        self.viewer.write()
    }

    /// Activates the selection and loads its layers in the background.
    ///
    /// The selection is active when this method returns. Only loading runs in the background.
    pub fn select_map(&self, selection: SelectionId) -> JoinHandle<CommitOutcome> {
        let request = self.viewer.write().select_map(selection);
        let handle = self.clone();
        async_runtime::spawn(async move { handle.complete(request).await })
    }

    /// Activates the selection and waits until its layers are loaded and committed.
    pub async fn select_map_and_wait(&self, selection: SelectionId) -> CommitOutcome {
        let request = self.viewer.write().select_map(selection);
        self.complete(request).await
    }

    /// Loads the layers of the active selection, if they were not loaded yet. Returns
    /// [`CommitOutcome::Discarded`] without fetching anything if they were.
    pub async fn load_pending(&self) -> CommitOutcome {
        let request = {
            let viewer = self.viewer.read();
            if !viewer.is_loading() {
                log::debug!("Layers of map {} are already loaded", viewer.selection());
                return CommitOutcome::Discarded;
            }
            viewer.load_request()
        };
        self.complete(request).await
    }

    /// Loads the request's layers and commits them.
    pub async fn complete(&self, request: LoadRequest) -> CommitOutcome {
        let loaded = self.loader.load(request.layers()).await;
        self.viewer.write().commit(request.generation(), loaded)
    }

    /// Flips the visibility of a layer without refetching anything.
    pub fn toggle_layer(&self, id: LayerId) -> bool {
        self.viewer.write().toggle_layer(id)
    }

    /// Changes the theme.
    pub fn set_theme(&self, theme: Theme) {
        self.viewer.write().set_theme(theme)
    }

    /// Switches between the dark and light theme.
    pub fn toggle_theme(&self) {
        self.viewer.write().toggle_theme()
    }

    /// Changes the camera.
    pub fn set_camera(&self, camera: Camera) {
        self.viewer.write().set_camera(camera)
    }
}

/// Constructor of a [`ViewerHandle`].
///
/// ```no_run
/// use geoview::ViewerBuilder;
/// use geoview::layer::data_provider::DatasetRoot;
///
/// let handle = ViewerBuilder::new()
///     .with_dataset_root(DatasetRoot::url("http://localhost:5173"))
///     .with_initial_selection(2)
///     .build();
/// ```
pub struct ViewerBuilder {
    config: GeoviewConfig,
    provider: Option<Arc<dyn DatasetProvider>>,
    root: DatasetRoot,
    messenger: Option<Box<dyn Messenger>>,
}

impl Default for ViewerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerBuilder {
    /// Creates a builder with the built-in catalog, reading datasets relative to the working
    /// directory.
    pub fn new() -> Self {
        Self {
            config: GeoviewConfig::default(),
            provider: None,
            root: DatasetRoot::default(),
            messenger: None,
        }
    }

    /// Takes catalog, initial selection, theme and fetch timeout from the configuration.
    pub fn with_config(mut self, config: GeoviewConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the catalog.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.config.catalog = catalog;
        self
    }

    /// Resolves relative dataset locations against the root. Ignored if a custom provider is set.
    pub fn with_dataset_root(mut self, root: DatasetRoot) -> Self {
        self.root = root;
        self
    }

    /// Uses a custom dataset provider.
    pub fn with_dataset_provider(mut self, provider: impl DatasetProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Limits the time a single dataset fetch may take.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.config.fetch_timeout_ms = Some(millis);
        self
    }

    /// Selection that is active right after start.
    pub fn with_initial_selection(mut self, selection: SelectionId) -> Self {
        self.config.initial_selection = selection;
        self
    }

    /// Theme that is active right after start.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.config.theme = theme;
        self
    }

    /// Messenger notified after every state change.
    pub fn with_messenger(mut self, messenger: impl Messenger + 'static) -> Self {
        self.messenger = Some(Box::new(messenger));
        self
    }

    /// Builds the handle. The initial selection's layers are pending until
    /// [`ViewerHandle::load_pending`] or a selection change loads them.
    pub fn build(self) -> ViewerHandle {
        let provider = self
            .provider
            .unwrap_or_else(|| Arc::new(UrlDatasetProvider::new(self.root)));

        let mut loader = LayerDataLoader::from_shared(provider);
        if let Some(timeout) = self.config.fetch_timeout() {
            loader = loader.with_timeout(timeout);
        }

        let mut viewer = Viewer::new(
            Arc::new(self.config.catalog),
            self.config.initial_selection,
            self.config.theme,
        );
        viewer.set_messenger(self.messenger);

        ViewerHandle::new(viewer, loader)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use geojson::FeatureCollection;
    use tokio::sync::Semaphore;

    use super::*;
    use crate::camera::LatLon;
    use crate::error::GeoviewError;
    use crate::layer::data_provider::MemoryDatasetProvider;
    use crate::layer::LoadState;
    use crate::loader::tests::document;

    fn provider() -> MemoryDatasetProvider {
        let provider = MemoryDatasetProvider::new();
        for (_, selection) in Catalog::default().selections() {
            for layer in &selection.layers {
                provider.insert(layer.source_location.clone(), document(&[&layer.name]));
            }
        }
        provider
    }

    fn ids(viewer: &Viewer) -> Vec<u32> {
        viewer.layers().iter().map(|l| l.id.0).collect()
    }

    #[derive(Clone, Default)]
    struct CountingMessenger(Arc<AtomicUsize>);

    impl Messenger for CountingMessenger {
        fn request_redraw(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn selection_replaces_layers_and_resets_camera() {
        let mut viewer = Viewer::new(Arc::new(Catalog::default()), 1, Theme::Dark);
        assert_eq!(ids(&viewer), vec![101, 102, 103]);
        assert_eq!(viewer.camera(), Camera::new(LatLon::new(-7.165, -78.508), 16));

        viewer.set_camera(Camera::new(LatLon::new(0.0, 0.0), 3));
        let request = viewer.select_map(2);

        assert_eq!(request.selection(), 2);
        assert_eq!(request.generation(), viewer.generation());
        assert_eq!(ids(&viewer), vec![201, 202]);
        assert_eq!(viewer.camera(), Camera::new(LatLon::new(4.61, -74.05), 13));
        assert!(viewer.is_loading());
    }

    #[test]
    fn unknown_selection_has_no_layers() {
        let mut viewer = Viewer::new(Arc::new(Catalog::default()), 1, Theme::Dark);
        let camera = viewer.camera();
        let request = viewer.select_map(9);

        assert!(request.layers().is_empty());
        assert!(viewer.layers().is_empty());
        assert!(viewer.selection_config().is_none());
        assert_eq!(viewer.camera(), camera);
    }

    #[test]
    fn toggle_twice_restores_visibility() {
        let mut viewer = Viewer::new(Arc::new(Catalog::default()), 1, Theme::Dark);
        assert!(viewer.toggle_layer(LayerId(103)));
        assert!(viewer.layers()[2].visible);
        assert!(viewer.toggle_layer(LayerId(103)));
        assert!(!viewer.layers()[2].visible);

        assert!(!viewer.toggle_layer(LayerId(999)));
    }

    #[test]
    fn state_changes_request_redraw() {
        let messenger = CountingMessenger::default();
        let mut viewer = Viewer::new(Arc::new(Catalog::default()), 1, Theme::Dark);
        viewer.set_messenger(Some(Box::new(messenger.clone())));

        viewer.toggle_theme();
        viewer.set_theme(Theme::Light);
        viewer.toggle_layer(LayerId(101));
        let request = viewer.select_map(3);
        viewer.commit(request.generation(), request.layers().to_vec());

        assert_eq!(messenger.0.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn load_pending_commits_initial_selection() {
        let handle = ViewerBuilder::new().with_dataset_provider(provider()).build();
        assert!(handle.read().is_loading());

        assert_eq!(handle.load_pending().await, CommitOutcome::Applied);
        let viewer = handle.read();
        assert!(!viewer.is_loading());
        assert!(viewer.layers().iter().all(|l| l.is_available()));
    }

    struct CountingProvider {
        inner: MemoryDatasetProvider,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DatasetProvider for CountingProvider {
        async fn load(&self, location: &str) -> Result<FeatureCollection, GeoviewError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.load(location).await
        }
    }

    #[tokio::test]
    async fn loaded_layers_are_not_fetched_again() {
        let counting = Arc::new(CountingProvider {
            inner: provider(),
            calls: AtomicUsize::new(0),
        });
        let handle = ViewerHandle::new(
            Viewer::new(Arc::new(Catalog::default()), 1, Theme::Dark),
            LayerDataLoader::from_shared(counting.clone()),
        );

        assert_eq!(handle.load_pending().await, CommitOutcome::Applied);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 3);

        assert_eq!(handle.load_pending().await, CommitOutcome::Discarded);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 3);
        assert!(handle.read().layers().iter().all(|l| l.is_available()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn last_selection_wins() {
        let handle = ViewerBuilder::new().with_dataset_provider(provider()).build();

        for _ in 0..50 {
            let first = handle.select_map(2);
            assert_eq!(handle.read().selection(), 2);
            let second = handle.select_map(3);
            assert_eq!(handle.read().selection(), 3);

            first.await.expect("task panicked");
            assert_eq!(second.await.expect("task panicked"), CommitOutcome::Applied);

            let viewer = handle.read();
            assert_eq!(viewer.selection(), 3);
            assert_eq!(ids(&viewer), vec![301]);
            assert!(viewer.layers()[0].is_available());
        }
    }

    #[test]
    fn huge_fetch_timeout_saturates() {
        let builder = ViewerBuilder::new().with_fetch_timeout(Duration::MAX);
        assert_eq!(builder.config.fetch_timeout_ms, Some(u64::MAX));

        let builder = ViewerBuilder::new().with_fetch_timeout(Duration::from_millis(2500));
        assert_eq!(builder.config.fetch_timeout(), Some(Duration::from_millis(2500)));
    }

    #[tokio::test]
    async fn stale_batch_is_discarded() {
        let handle = ViewerBuilder::new().with_dataset_provider(provider()).build();

        let first = handle.write().select_map(1);
        let second = handle.write().select_map(2);

        assert_eq!(handle.complete(second).await, CommitOutcome::Applied);
        assert_eq!(handle.complete(first).await, CommitOutcome::Discarded);

        let viewer = handle.read();
        assert_eq!(viewer.selection(), 2);
        assert_eq!(ids(&viewer), vec![201, 202]);
        assert!(viewer.layers().iter().all(|l| l.is_available()));
    }

    #[tokio::test]
    async fn batch_is_committed_once() {
        let handle = ViewerBuilder::new().with_dataset_provider(provider()).build();
        let request = handle.write().select_map(4);

        assert_eq!(handle.complete(request.clone()).await, CommitOutcome::Applied);
        handle.toggle_layer(LayerId(401));
        assert_eq!(handle.complete(request).await, CommitOutcome::Discarded);
        assert!(!handle.read().layers()[0].visible);
    }

    #[tokio::test]
    async fn toggles_during_load_survive_commit() {
        let handle = ViewerBuilder::new().with_dataset_provider(provider()).build();
        let request = handle.write().select_map(1);

        handle.toggle_layer(LayerId(101));
        handle.toggle_layer(LayerId(103));
        handle.complete(request).await;

        let viewer = handle.read();
        let visible: Vec<_> = viewer.layers().iter().map(|l| l.visible).collect();
        assert_eq!(visible, vec![false, true, true]);
        assert!(viewer.layers().iter().all(|l| l.is_available()));
    }

    #[tokio::test]
    async fn failed_layers_stay_listed() {
        let provider = provider();
        provider.remove("/maps/Map1/calles_wgs84.json");
        let handle = ViewerBuilder::new().with_dataset_provider(provider).build();

        assert_eq!(handle.select_map_and_wait(1).await, CommitOutcome::Applied);
        let viewer = handle.read();
        assert_eq!(ids(&viewer), vec![101, 102, 103]);
        assert_matches!(viewer.layers()[1].state(), LoadState::Failed);
        assert!(viewer.layers()[0].is_available());
        assert!(viewer.layers()[2].is_available());
    }

    struct GatedProvider {
        inner: MemoryDatasetProvider,
        gate: Arc<Semaphore>,
    }

    #[async_trait]
    impl DatasetProvider for GatedProvider {
        async fn load(&self, location: &str) -> Result<FeatureCollection, GeoviewError> {
            if location.contains("/Map1/") {
                let _permit = self
                    .gate
                    .acquire()
                    .await
                    .map_err(|_| GeoviewError::Generic("gate closed".into()))?;
            }
            self.inner.load(location).await
        }
    }

    #[tokio::test]
    async fn late_batch_of_previous_selection_is_dropped() {
        let gate = Arc::new(Semaphore::new(0));
        let handle = ViewerBuilder::new()
            .with_dataset_provider(GatedProvider {
                inner: provider(),
                gate: gate.clone(),
            })
            .build();

        let slow = handle.select_map(1);
        tokio::task::yield_now().await;

        assert_eq!(handle.select_map_and_wait(3).await, CommitOutcome::Applied);

        gate.add_permits(3);
        assert_eq!(slow.await.expect("task panicked"), CommitOutcome::Discarded);

        let viewer = handle.read();
        assert_eq!(viewer.selection(), 3);
        assert_eq!(ids(&viewer), vec![301]);
        assert!(viewer.layers()[0].is_available());
    }
}
