//! Client for the USGS FDSN event service.
//!
//! Query building and response decoding are plain functions so the browser
//! bundle and the tests can use them; the HTTP call itself only exists in
//! the server build.

use serde::Deserialize;
use shared_types::{EarthquakeFeature, EarthquakeFeatureCollection, MapBounds};

pub const USGS_EVENT_ENDPOINT: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";

pub const MIN_MAGNITUDE: f64 = 2.5;
pub const MAX_MAGNITUDE: f64 = 10.0;
pub const START_DATE: &str = "2022-01-01";
pub const END_DATE: &str = "2022-12-31";

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("catalog answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed catalog response: {0}")]
    Decode(String),
}

/// One bounding-box-scoped catalog query. Magnitude range and date window are
/// fixed; only the box varies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarthquakeQuery {
    pub bounds: MapBounds,
    pub min_magnitude: f64,
    pub max_magnitude: f64,
    pub start_date: &'static str,
    pub end_date: &'static str,
}

impl EarthquakeQuery {
    pub fn for_bounds(bounds: MapBounds) -> Self {
        Self {
            bounds,
            min_magnitude: MIN_MAGNITUDE,
            max_magnitude: MAX_MAGNITUDE,
            start_date: START_DATE,
            end_date: END_DATE,
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let MapBounds {
            north_east,
            south_west,
        } = self.bounds;

        vec![
            ("format", "geojson".to_string()),
            ("starttime", self.start_date.to_string()),
            ("endtime", self.end_date.to_string()),
            ("minmagnitude", self.min_magnitude.to_string()),
            ("maxmagnitude", self.max_magnitude.to_string()),
            ("minlatitude", south_west.lat.to_string()),
            ("maxlatitude", north_east.lat.to_string()),
            ("minlongitude", south_west.long.to_string()),
            ("maxlongitude", north_east.long.to_string()),
        ]
    }

    pub fn url(&self, endpoint: &str) -> String {
        let query = self
            .params()
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", endpoint, query)
    }
}

#[derive(Deserialize)]
struct RawCollection {
    features: Vec<RawFeature>,
}

#[derive(Deserialize)]
struct RawFeature {
    id: Option<String>,
    properties: RawProperties,
    geometry: Option<RawGeometry>,
}

#[derive(Deserialize)]
struct RawProperties {
    mag: Option<f64>,
    time: Option<i64>,
    place: Option<String>,
}

#[derive(Deserialize)]
struct RawGeometry {
    coordinates: Vec<f64>,
}

/// Decodes a USGS GeoJSON document. Events without a magnitude, a time or a
/// point geometry cannot be drawn and are dropped.
pub fn parse_feature_collection(body: &str) -> Result<EarthquakeFeatureCollection, FetchError> {
    let raw: RawCollection =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    let features = raw
        .features
        .into_iter()
        .enumerate()
        .filter_map(|(index, feature)| {
            let magnitude = feature.properties.mag?;
            let time_millis = feature.properties.time?;
            let coords = feature.geometry?.coordinates;
            let (lng, lat) = match coords.as_slice() {
                [lng, lat, ..] => (*lng, *lat),
                _ => return None,
            };
            Some(EarthquakeFeature {
                id: feature.id.unwrap_or_else(|| format!("event-{}", index)),
                coordinates: (lng, lat),
                magnitude,
                time_millis,
                place: feature.properties.place,
            })
        })
        .collect();

    Ok(EarthquakeFeatureCollection { features })
}

/// Turns a raw catalog answer into features. Any non-2xx status is a
/// [`FetchError::Status`]; the provider answers 400 once a query matches more
/// events than its result ceiling.
pub fn check_response(status: u16, body: String) -> Result<EarthquakeFeatureCollection, FetchError> {
    if !(200..300).contains(&status) {
        return Err(FetchError::Status { status, body });
    }
    parse_feature_collection(&body)
}

#[cfg(feature = "ssr")]
pub use client::{shared_client, UsgsClient};

#[cfg(feature = "ssr")]
mod client {
    use super::*;
    use std::sync::OnceLock;
    use std::time::Duration;

    static CLIENT: OnceLock<UsgsClient> = OnceLock::new();

    pub struct UsgsClient {
        http: reqwest::Client,
        endpoint: String,
    }

    impl UsgsClient {
        pub fn new(endpoint: impl Into<String>) -> Result<Self, FetchError> {
            let http = reqwest::Client::builder()
                .timeout(Duration::from_secs(20))
                .user_agent(concat!("quakemap/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            Ok(Self {
                http,
                endpoint: endpoint.into(),
            })
        }

        pub async fn fetch_earthquakes(
            &self,
            bounds: MapBounds,
        ) -> Result<EarthquakeFeatureCollection, FetchError> {
            let url = EarthquakeQuery::for_bounds(bounds).url(&self.endpoint);
            tracing::debug!(%url, "querying earthquake catalog");

            let response = self
                .http
                .get(&url)
                .send()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            check_response(status, body)
        }
    }

    pub fn shared_client() -> Result<&'static UsgsClient, FetchError> {
        if let Some(client) = CLIENT.get() {
            return Ok(client);
        }
        let _ = CLIENT.set(UsgsClient::new(USGS_EVENT_ENDPOINT)?);
        CLIENT
            .get()
            .ok_or_else(|| FetchError::Transport("client not initialized".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::LatLong;

    fn conus() -> MapBounds {
        MapBounds::new(
            LatLong {
                lat: 24.0,
                long: -125.0,
            },
            LatLong {
                lat: 49.0,
                long: -66.0,
            },
        )
    }

    #[test]
    fn query_encodes_bounds_magnitude_and_year() {
        let params = EarthquakeQuery::for_bounds(conus()).params();
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("minlatitude"), Some("24"));
        assert_eq!(get("maxlatitude"), Some("49"));
        assert_eq!(get("minlongitude"), Some("-125"));
        assert_eq!(get("maxlongitude"), Some("-66"));
        assert_eq!(get("minmagnitude"), Some("2.5"));
        assert_eq!(get("maxmagnitude"), Some("10"));
        assert_eq!(get("starttime"), Some("2022-01-01"));
        assert_eq!(get("endtime"), Some("2022-12-31"));
        assert_eq!(get("format"), Some("geojson"));
        assert_eq!(params.len(), 9);
    }

    #[test]
    fn url_joins_params_onto_endpoint() {
        let url = EarthquakeQuery::for_bounds(conus()).url(USGS_EVENT_ENDPOINT);
        assert_eq!(
            url,
            "https://earthquake.usgs.gov/fdsnws/event/1/query?format=geojson\
             &starttime=2022-01-01&endtime=2022-12-31&minmagnitude=2.5&maxmagnitude=10\
             &minlatitude=24&maxlatitude=49&minlongitude=-125&maxlongitude=-66"
        );
    }

    #[test]
    fn parses_usgs_geojson() {
        let body = r#"{
            "type": "FeatureCollection",
            "metadata": {"count": 3},
            "features": [
                {
                    "type": "Feature",
                    "id": "nc73712345",
                    "properties": {"mag": 4.2, "time": 1650000000000, "place": "5km NW of Somewhere"},
                    "geometry": {"type": "Point", "coordinates": [-122.4, 37.8, 8.1]}
                },
                {
                    "type": "Feature",
                    "id": "no-mag",
                    "properties": {"mag": null, "time": 1650000000000, "place": null},
                    "geometry": {"type": "Point", "coordinates": [-120.0, 36.0, 2.0]}
                },
                {
                    "type": "Feature",
                    "properties": {"mag": 3.1, "time": 1650000001000},
                    "geometry": {"type": "Point", "coordinates": [-118.0, 34.0]}
                }
            ]
        }"#;

        let collection = parse_feature_collection(body).unwrap();
        assert_eq!(collection.len(), 2);

        let first = &collection.features[0];
        assert_eq!(first.id, "nc73712345");
        assert_eq!(first.coordinates, (-122.4, 37.8));
        assert_eq!(first.magnitude, 4.2);
        assert_eq!(first.time_millis, 1_650_000_000_000);
        assert_eq!(first.place.as_deref(), Some("5km NW of Somewhere"));

        assert_eq!(collection.features[1].id, "event-2");
        assert_eq!(collection.features[1].place, None);
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let err = parse_feature_collection("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn result_ceiling_answer_is_a_status_error() {
        let body = "Error 400: Bad Request\n\n20001 matching events exceeds search limit of 20000.";
        let err = check_response(400, body.to_string()).unwrap_err();

        assert_eq!(
            err,
            FetchError::Status {
                status: 400,
                body: body.to_string(),
            }
        );
        assert!(err.to_string().starts_with("catalog answered 400"));
    }

    #[test]
    fn server_errors_are_not_decoded() {
        let err = check_response(503, r#"{"features": []}"#.to_string()).unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }

    #[test]
    fn success_with_bad_body_is_a_decode_error() {
        let err = check_response(200, "not json".to_string()).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn success_with_features_parses() {
        let body = r#"{"features": [{
            "id": "us7000abcd",
            "properties": {"mag": 5.0, "time": 1650000000000},
            "geometry": {"coordinates": [140.0, 36.0, 10.0]}
        }]}"#;
        let collection = check_response(200, body.to_string()).unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.features[0].id, "us7000abcd");
    }
}
