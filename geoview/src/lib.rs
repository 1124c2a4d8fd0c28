//! Geoview is the core of an interactive GeoJSON map viewer. It knows which overlay datasets belong
//! to each predefined map view, loads them concurrently, styles their features according to the
//! active theme, builds popup summaries for them, and keeps an external base map widget in sync
//! with the application's camera.
//!
//! # Main components
//!
//! * [`Catalog`] is a static table of map selections. [`Catalog::resolve`] turns a selection id
//!   into an ordered list of [`LayerDescriptor`]s with no data attached.
//! * [`LayerDataLoader`] fetches the dataset of every descriptor concurrently through a
//!   [`DatasetProvider`](layer::data_provider::DatasetProvider). A failing layer is marked as
//!   failed and never affects its siblings.
//! * [`Viewer`] is the application state: active selection, layer list, camera and theme. Every
//!   load batch is tagged with a generation number so that results for an abandoned selection are
//!   discarded instead of being committed.
//! * [`MapRenderer`] derives the visible overlays, their per-feature [`FeatureStyle`] and
//!   [`PopupContent`], and issues commands to a [`MapWidget`] implementation provided by the host
//!   application.
//!
//! The map widget itself (tile rendering, panning, popups on screen) is outside of this crate. It
//! is reached only through the [`MapWidget`] trait.
//!
//! ```no_run
//! use geoview::{ViewerBuilder, MapRenderer};
//! use geoview::layer::data_provider::DatasetRoot;
//!
//! # async fn run(widget: &mut dyn geoview::MapWidget) -> Result<(), geoview::error::GeoviewError> {
//! let handle = ViewerBuilder::new()
//!     .with_dataset_root(DatasetRoot::directory("public"))
//!     .build();
//!
//! handle.select_map_and_wait(1).await;
//!
//! let mut renderer = MapRenderer::default();
//! renderer.render(&handle.read(), widget);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub(crate) mod async_runtime;
pub mod camera;
pub mod catalog;
pub mod config;
mod color;
pub mod error;
pub mod layer;
pub mod legend;
pub mod loader;
mod messenger;
pub mod platform;
pub mod popup;
pub mod render;
pub mod style;
pub mod viewer;
pub mod widget;

pub use camera::{Camera, CameraSync, LatLon};
pub use catalog::{Catalog, LayerConfig, SelectionConfig, SelectionId};
pub use color::Color;
pub use config::GeoviewConfig;
pub use layer::{LayerDescriptor, LayerId, LoadState};
pub use loader::LayerDataLoader;
pub use messenger::{DummyMessenger, Messenger};
pub use popup::{PopupContent, PopupPolicy};
pub use render::MapRenderer;
pub use style::{FeatureStyle, StylePolicy, Theme};
pub use viewer::{CommitOutcome, Viewer, ViewerBuilder, ViewerHandle};
pub use widget::MapWidget;
