use chrono::DateTime;
use shared_types::{EarthquakeFeature, LatLong};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PopupState {
    #[default]
    Closed,
    OpenAt(LatLong),
}

/// Catalog times are milliseconds since the Unix epoch.
pub fn format_event_time(time_millis: i64) -> String {
    match DateTime::from_timestamp_millis(time_millis) {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "Unknown time".to_string(),
    }
}

/// Text shown in the popup of a clicked event. Rendered as DOM text nodes, so
/// catalogue strings never go through an HTML parser.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub magnitude: String,
    pub place: Option<String>,
    pub time: String,
}

impl PopupContent {
    pub fn for_feature(feature: &EarthquakeFeature) -> Self {
        Self {
            magnitude: feature.magnitude.to_string(),
            place: feature.place.clone(),
            time: format_event_time(feature.time_millis),
        }
    }

    /// `(css class, label, text)` per popup row, top to bottom.
    pub fn rows(&self) -> Vec<(&'static str, Option<&'static str>, &str)> {
        let mut rows = vec![("quake-popup__mag", Some("Magnitude:"), self.magnitude.as_str())];
        if let Some(place) = &self.place {
            rows.push(("quake-popup__place", None, place.as_str()));
        }
        rows.push(("quake-popup__time", Some("Time:"), self.time.as_str()));
        rows
    }
}
