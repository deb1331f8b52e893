use crate::error::{Result, WeatherError};
use crate::models::aggregation::floor_day;
use crate::models::{Message, MessageType, PointSet};
use crate::utils::constants::{
    PARAM_CLOUD_COVER, PARAM_RELATIVE_HUMIDITY, PARAM_SNOW_FALL, PARAM_SURFACE_PRESSURE,
    PARAM_TEMPERATURE, PARAM_TOTAL_PRECIPITATION, PARAM_WIND_SPEED,
};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

const OWM_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
struct OwmResponse {
    city: OwmCity,
    list: Vec<OwmEntry>,
}

#[derive(Debug, Deserialize)]
struct OwmCity {
    coord: OwmCoord,
}

#[derive(Debug, Deserialize)]
struct OwmCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwmEntry {
    dt_txt: String,
    main: OwmMain,
    clouds: Option<OwmClouds>,
    wind: Option<OwmWind>,
    rain: Option<OwmVolume>,
    snow: Option<OwmVolume>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
    grnd_level: f64,
}

#[derive(Debug, Deserialize)]
struct OwmClouds {
    all: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmVolume {
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

/// Converts an OpenWeatherMap 5 day / 3 hour forecast response into
/// single-point forecast messages.
pub struct OwmReader;

impl OwmReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_messages(&self, path: &Path) -> Result<Vec<Message>> {
        let content = fs::read_to_string(path)?;
        let messages = self.parse(&content)?;
        debug!(
            "Read {} OpenWeatherMap messages from {}",
            messages.len(),
            path.display()
        );
        Ok(messages)
    }

    pub fn parse(&self, content: &str) -> Result<Vec<Message>> {
        let response: OwmResponse = serde_json::from_str(content)?;
        let first = response
            .list
            .first()
            .ok_or_else(|| WeatherError::InvalidFormat("forecast list is empty".to_string()))?;

        let grid = PointSet::new(vec![response.city.coord.lat], vec![response.city.coord.lon])?;
        let base = floor_day(NaiveDateTime::parse_from_str(&first.dt_txt, OWM_TIME_FORMAT)?);

        let mut messages = Vec::with_capacity(response.list.len() * 7);
        // Precipitation is accumulated from the forecast start, as in the archive data
        let mut tp_accumulated = 0.0;

        for entry in &response.list {
            let validity = NaiveDateTime::parse_from_str(&entry.dt_txt, OWM_TIME_FORMAT)?;
            let mut push = |name: &str, value: f64| {
                messages.push(Message::new(
                    name,
                    vec![value],
                    base,
                    validity,
                    grid.clone(),
                    MessageType::Forecast,
                ));
            };

            if let Some(rain) = entry.rain.as_ref().and_then(|r| r.three_hours) {
                tp_accumulated += rain / 1000.0;
            }

            push(PARAM_TEMPERATURE, entry.main.temp);
            // Kept in percent like the derived `rh`, not scaled to a 0..1 fraction
            push(PARAM_RELATIVE_HUMIDITY, entry.main.humidity);
            push(PARAM_SURFACE_PRESSURE, entry.main.grnd_level / 100.0);
            push(
                PARAM_CLOUD_COVER,
                entry.clouds.as_ref().map_or(0.0, |c| c.all / 100.0),
            );
            push(PARAM_WIND_SPEED, entry.wind.as_ref().map_or(0.0, |w| w.speed));
            push(PARAM_TOTAL_PRECIPITATION, tp_accumulated);
            push(
                PARAM_SNOW_FALL,
                entry
                    .snow
                    .as_ref()
                    .and_then(|s| s.three_hours)
                    .map_or(0.0, |s| s / 100.0),
            );
        }

        Ok(messages)
    }
}

impl Default for OwmReader {
    fn default() -> Self {
        Self::new()
    }
}
