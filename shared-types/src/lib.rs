use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct LatLong {
    pub lat: f64,
    pub long: f64,
}

/// Viewport snapshot of the map, south-west and north-east corners.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct MapBounds {
    pub north_east: LatLong,
    pub south_west: LatLong,
}

impl MapBounds {
    pub fn new(south_west: LatLong, north_east: LatLong) -> Self {
        Self {
            north_east,
            south_west,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EarthquakeFeature {
    pub id: String,
    /// `(lng, lat)`, GeoJSON axis order.
    pub coordinates: (f64, f64),
    pub magnitude: f64,
    pub time_millis: i64,
    pub place: Option<String>,
}

impl EarthquakeFeature {
    pub fn position(&self) -> LatLong {
        LatLong {
            lat: self.coordinates.1,
            long: self.coordinates.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct EarthquakeFeatureCollection {
    pub features: Vec<EarthquakeFeature>,
}

impl EarthquakeFeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&EarthquakeFeature> {
        self.features.iter().find(|f| f.id == id)
    }
}

/// Tile templates for the page, with access keys already filled in.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MapSettings {
    pub base_tile_url: String,
    pub base_attribution: String,
    pub outdoors_tile_url: String,
    pub outdoors_attribution: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quake() -> EarthquakeFeature {
        EarthquakeFeature {
            id: "nc73712345".to_string(),
            coordinates: (-122.4, 37.8),
            magnitude: 4.2,
            time_millis: 1_650_000_000_000,
            place: Some("3km N of Somewhere, CA".to_string()),
        }
    }

    #[test]
    fn position_swaps_geojson_axis_order() {
        let pos = quake().position();
        assert_eq!(pos.lat, 37.8);
        assert_eq!(pos.long, -122.4);
    }

    #[test]
    fn find_by_id() {
        let collection = EarthquakeFeatureCollection {
            features: vec![quake()],
        };
        assert!(collection.find("nc73712345").is_some());
        assert!(collection.find("missing").is_none());
    }
}
