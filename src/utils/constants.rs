/// Parameter short names
pub const PARAM_DEWPOINT: &str = "2d";
pub const PARAM_TEMPERATURE: &str = "2t";
pub const PARAM_WIND_U: &str = "10u";
pub const PARAM_WIND_V: &str = "10v";
pub const PARAM_PRECIPITATION_TYPE: &str = "ptype";
pub const PARAM_SNOW_FALL: &str = "sf";
pub const PARAM_SUNSHINE_DURATION: &str = "sund";
pub const PARAM_SURFACE_PRESSURE: &str = "sp";
pub const PARAM_CLOUD_COVER: &str = "tcc";
pub const PARAM_TOTAL_PRECIPITATION: &str = "tp";
pub const PARAM_WIND_SPEED: &str = "ws";
pub const PARAM_RELATIVE_HUMIDITY: &str = "rh";

/// Parameters accumulated from the start of the forecast
pub const ACCUMULATED_PARAMS: [&str; 3] = [
    PARAM_SUNSHINE_DURATION,
    PARAM_TOTAL_PRECIPITATION,
    PARAM_SNOW_FALL,
];

/// Country aggregation centroid (Slovenia)
pub const COUNTRY_CENTROID_LAT: f64 = 46.1512;
pub const COUNTRY_CENTROID_LON: f64 = 14.9955;

/// Magnus formula constants
pub const KELVIN_OFFSET: f64 = 273.15;
pub const MAGNUS_A: f64 = 17.625;
pub const MAGNUS_B: f64 = 243.04;

/// Value of a mean-aggregated target that received no grid points
pub const EMPTY_TARGET_VALUE: f64 = 0.0;

/// File name suffixes
pub const SNAPSHOT_SUFFIX: &str = ".snapshot.json";
pub const MESSAGES_SUFFIX: &str = ".jsonl";
pub const OWM_SUFFIX: &str = ".json";

/// Configuration defaults
pub const DEFAULT_CONFIG_FILE: &str = "weather-extractor.toml";
pub const CONFIG_ENV_PREFIX: &str = "WEATHER_EXTRACTOR";
