use shared_types::{EarthquakeFeatureCollection, LatLong, MapBounds};

use super::popup::PopupContent;

pub const DEFAULT_CENTER: LatLong = LatLong {
    lat: 37.8,
    long: -122.4,
};
pub const DEFAULT_ZOOM: f64 = 5.0;

/// Lifecycle of a map surface. `Loading -> Ready` happens once, `Disposed` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SurfacePhase {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    Disposed,
}

/// Events a surface reports back to whoever drives it.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Load,
    MoveEnd,
    FeatureClick { layer_id: String, feature_id: String },
    FeatureHoverEnter { layer_id: String },
    FeatureHoverLeave { layer_id: String },
}

/// What the sync controller needs from a map engine.
pub trait MapSurface {
    fn register_raster_layer(&mut self, id: &str, tile_url_template: &str, attribution: &str);

    fn register_point_layer(&mut self, id: &str, initial_data: &EarthquakeFeatureCollection);

    /// Replaces everything the source currently holds.
    fn replace_source_data(&mut self, source_id: &str, data: &EarthquakeFeatureCollection);

    fn set_layer_visible(&mut self, layer_id: &str, visible: bool);

    fn viewport_bounds(&self) -> MapBounds;

    fn fly_to(&mut self, coordinates: LatLong);

    fn show_popup(&mut self, coordinates: LatLong, content: &PopupContent);

    fn close_popup(&mut self);

    fn set_pointer_cursor(&mut self, pointer: bool);

    /// Detaches every listener and destroys the map. Called once.
    fn dispose(&mut self);
}

/// Circle radius in pixels for an event of the given magnitude.
pub fn marker_radius(magnitude: f64) -> f64 {
    (magnitude * 2.0).clamp(4.0, 20.0)
}

pub fn marker_color(magnitude: f64) -> &'static str {
    match magnitude {
        m if m >= 6.0 => "#b91c1c",
        m if m >= 4.5 => "#ea580c",
        m if m >= 3.5 => "#f59e0b",
        _ => "#facc15",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_grows_with_magnitude_within_limits() {
        assert_eq!(marker_radius(2.5), 5.0);
        assert!(marker_radius(5.0) > marker_radius(3.0));
        assert_eq!(marker_radius(0.5), 4.0);
        assert_eq!(marker_radius(9.5), 20.0);
    }

    #[test]
    fn color_buckets() {
        assert_eq!(marker_color(2.6), "#facc15");
        assert_eq!(marker_color(4.2), "#f59e0b");
        assert_eq!(marker_color(7.1), "#b91c1c");
    }
}
