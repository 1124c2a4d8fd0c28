//! This example loads every map selection from a dataset root and prints what a map widget would
//! be asked to draw.
//!
//! ```sh
//! cargo run --example headless_viewer -- public [config.json]
//! ```

use geoview::error::GeoviewError;
use geoview::layer::data_provider::DatasetRoot;
use geoview::legend::{layer_panel, LayerPanel};
use geoview::widget::{BaseLayer, Overlay};
use geoview::{GeoviewConfig, LatLon, MapRenderer, MapWidget, ViewerBuilder};

/// Widget that logs the commands it receives.
struct LoggingWidget;

impl MapWidget for LoggingWidget {
    fn set_base_layer(&mut self, base: &BaseLayer) {
        println!("  base layer: {} ({})", base.url_template, base.attribution.text());
    }

    fn set_overlays(&mut self, overlays: &[Overlay<'_>]) {
        for overlay in overlays {
            let popups = overlay
                .features()
                .iter()
                .filter_map(|f| overlay.popup(f))
                .count();
            println!(
                "  overlay {}: {} features, {} popups",
                overlay.layer().name,
                overlay.features().len(),
                popups
            );
        }
    }

    fn set_view(&mut self, center: LatLon, zoom: u8) {
        println!("  view: {:.5}, {:.5} at zoom {zoom}", center.lat(), center.lon());
    }
}

#[tokio::main]
async fn main() -> Result<(), GeoviewError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let root = args.next().unwrap_or_else(|| "public".into());
    let config = match args.next() {
        Some(path) => GeoviewConfig::from_json_file(path)?,
        None => GeoviewConfig::default(),
    };

    let selections: Vec<_> = config.catalog.selections().map(|(id, _)| id).collect();
    let mut renderer = MapRenderer::from_config(&config);
    let handle = ViewerBuilder::new()
        .with_config(config)
        .with_dataset_root(DatasetRoot::directory(root))
        .build();

    let mut widget = LoggingWidget;
    for selection in selections {
        handle.select_map_and_wait(selection).await;

        let viewer = handle.read();
        let title = viewer
            .selection_config()
            .map(|config| config.title().to_string())
            .unwrap_or_default();
        println!("{title}");
        println!("  {}", viewer.camera().status());

        match layer_panel(viewer.layers()) {
            LayerPanel::Empty => println!("  no layers"),
            LayerPanel::Layers(entries) => {
                for entry in entries {
                    println!(
                        "  [{}] {} {} {:?}",
                        if entry.visible { "x" } else { " " },
                        entry.color,
                        entry.name,
                        entry.status
                    );
                }
            }
        }

        renderer.render(&viewer, &mut widget);
    }

    Ok(())
}
