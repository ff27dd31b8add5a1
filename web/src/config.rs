use std::sync::OnceLock;

use shared_types::MapSettings;

pub const MAPBOX_TOKEN_VAR: &str = "MAPBOX_ACCESS_TOKEN";
pub const THUNDERFOREST_KEY_VAR: &str = "THUNDERFOREST_API_KEY";

const MAPBOX_STYLE: &str = "mapbox/light-v11";
const MAPBOX_ATTRIBUTION: &str = "&copy; <a href=\"https://www.mapbox.com/about/maps/\">Mapbox</a> &copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
const THUNDERFOREST_ATTRIBUTION: &str = "Maps &copy; <a href=\"https://www.thunderforest.com\">Thunderforest</a>, Data &copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required credential {0}")]
    MissingCredential(&'static str),
    #[error("credential {0} is set but empty")]
    EmptyCredential(&'static str),
    #[error("configuration already initialized")]
    AlreadyInitialized,
}

/// Access keys for the two tile providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub mapbox_access_token: String,
    pub thunderforest_api_key: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            let value = lookup(name).ok_or(ConfigError::MissingCredential(name))?;
            let value = value.trim();
            if value.is_empty() {
                return Err(ConfigError::EmptyCredential(name));
            }
            Ok(value.to_string())
        };

        Ok(Self {
            mapbox_access_token: required(MAPBOX_TOKEN_VAR)?,
            thunderforest_api_key: required(THUNDERFOREST_KEY_VAR)?,
        })
    }

    pub fn map_settings(&self) -> MapSettings {
        MapSettings {
            base_tile_url: format!(
                "https://api.mapbox.com/styles/v1/{}/tiles/{{z}}/{{x}}/{{y}}?access_token={}",
                MAPBOX_STYLE,
                urlencoding::encode(&self.mapbox_access_token)
            ),
            base_attribution: MAPBOX_ATTRIBUTION.to_string(),
            outdoors_tile_url: format!(
                "https://tile.thunderforest.com/outdoors/{{z}}/{{x}}/{{y}}.png?apikey={}",
                urlencoding::encode(&self.thunderforest_api_key)
            ),
            outdoors_attribution: THUNDERFOREST_ATTRIBUTION.to_string(),
        }
    }
}

/// Loads credentials from the environment and stores them for the process.
/// Called once from `main` before the server starts listening.
pub fn init_config() -> Result<&'static AppConfig, ConfigError> {
    let config = AppConfig::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    CONFIG.get().ok_or(ConfigError::AlreadyInitialized)
}

pub fn get_config() -> Option<&'static AppConfig> {
    CONFIG.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn loads_both_credentials() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (MAPBOX_TOKEN_VAR, "pk.abc"),
            (THUNDERFOREST_KEY_VAR, " tf123 "),
        ]))
        .unwrap();

        assert_eq!(config.mapbox_access_token, "pk.abc");
        assert_eq!(config.thunderforest_api_key, "tf123");
    }

    #[test]
    fn missing_credential_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[(MAPBOX_TOKEN_VAR, "pk.abc")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingCredential(THUNDERFOREST_KEY_VAR));

        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingCredential(MAPBOX_TOKEN_VAR));
    }

    #[test]
    fn blank_credential_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[
            (MAPBOX_TOKEN_VAR, "   "),
            (THUNDERFOREST_KEY_VAR, "tf123"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::EmptyCredential(MAPBOX_TOKEN_VAR));
    }

    #[test]
    fn settings_embed_keys_in_tile_templates() {
        let config = AppConfig {
            mapbox_access_token: "pk.abc".to_string(),
            thunderforest_api_key: "tf123".to_string(),
        };
        let settings = config.map_settings();

        assert_eq!(
            settings.outdoors_tile_url,
            "https://tile.thunderforest.com/outdoors/{z}/{x}/{y}.png?apikey=tf123"
        );
        assert!(settings.base_tile_url.contains("{z}/{x}/{y}"));
        assert!(settings.base_tile_url.ends_with("access_token=pk.abc"));
    }
}
