use leptos::prelude::*;
use leptos::server;
use shared_types::{EarthquakeFeatureCollection, MapBounds, MapSettings};

#[cfg(feature = "ssr")]
use crate::{config::get_config, usgs::shared_client};

#[server]
pub async fn fetch_earthquakes(
    bounds: MapBounds,
) -> Result<EarthquakeFeatureCollection, ServerFnError> {
    tracing::debug!(
        sw_lat = bounds.south_west.lat,
        sw_long = bounds.south_west.long,
        ne_lat = bounds.north_east.lat,
        ne_long = bounds.north_east.long,
        "fetching earthquakes"
    );

    let client = shared_client().map_err(|e| ServerFnError::new(e.to_string()))?;
    match client.fetch_earthquakes(bounds).await {
        Ok(collection) => {
            tracing::info!(count = collection.len(), "earthquake catalog query succeeded");
            Ok(collection)
        }
        Err(e) => {
            tracing::warn!(error = %e, "earthquake catalog query failed");
            Err(ServerFnError::new(format!("Catalog error: {}", e)))
        }
    }
}

#[server]
pub async fn get_map_settings() -> Result<MapSettings, ServerFnError> {
    match get_config() {
        Some(config) => Ok(config.map_settings()),
        None => Err(ServerFnError::new(
            "Map configuration not initialized".to_string(),
        )),
    }
}
