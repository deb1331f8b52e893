use crate::error::Result;
use crate::models::{AggTime, Point};
use crate::utils::constants::{
    CONFIG_ENV_PREFIX, COUNTRY_CENTROID_LAT, COUNTRY_CENTROID_LON, DEFAULT_CONFIG_FILE,
};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Runtime settings, layered from defaults, an optional TOML file and the
/// `WEATHER_EXTRACTOR__*` environment.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Settings {
    /// Target of country aggregation
    #[validate(nested)]
    pub country: Point,

    /// Time aggregation used when a query does not name one
    pub default_aggtime: AggTime,

    pub show_progress: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            country: Point::new(COUNTRY_CENTROID_LAT, COUNTRY_CENTROID_LON),
            default_aggtime: AggTime::Hour,
            show_progress: true,
        }
    }
}

impl Settings {
    /// Load settings; a missing config file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(file)
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn toml_file() -> NamedTempFile {
        Builder::new().suffix(".toml").tempfile().unwrap()
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.country, Point::new(46.1512, 14.9955));
        assert_eq!(settings.default_aggtime, AggTime::Hour);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = toml_file();
        writeln!(file, "default_aggtime = \"day\"\n\n[country]\nlat = 45.5\nlon = 13.7").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.country, Point::new(45.5, 13.7));
        assert_eq!(settings.default_aggtime, AggTime::Day);
        assert!(settings.show_progress);
    }

    #[test]
    fn test_invalid_country_is_rejected() {
        let mut file = toml_file();
        writeln!(file, "[country]\nlat = 120.0\nlon = 13.7").unwrap();

        assert!(Settings::load(Some(file.path())).is_err());
    }
}
