use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WeatherError};
use crate::models::PointSet;

/// Provenance of a message, as tagged by the source archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    #[serde(rename = "fc", alias = "forecast")]
    Forecast,
    #[serde(rename = "an", alias = "actual")]
    Actual,
}

/// One decoded forecast or analysis message: a single parameter on a single
/// grid for one base time and one validity time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub short_name: String,
    pub values: Vec<f64>,
    /// Forecast base time
    pub valid_date_time: NaiveDateTime,
    /// Time the values apply to
    pub validity_date_time: NaiveDateTime,
    #[serde(flatten)]
    pub grid: PointSet,
    #[serde(rename = "type")]
    pub kind: MessageType,
}

impl Message {
    pub fn new(
        short_name: impl Into<String>,
        values: Vec<f64>,
        valid_date_time: NaiveDateTime,
        validity_date_time: NaiveDateTime,
        grid: PointSet,
        kind: MessageType,
    ) -> Self {
        Self {
            short_name: short_name.into(),
            values,
            valid_date_time,
            validity_date_time,
            grid,
            kind,
        }
    }

    /// Check the length and ordering invariants of a message.
    pub fn validate_shape(&self) -> Result<()> {
        if self.grid.lats.len() != self.values.len() {
            return Err(WeatherError::LengthMismatch {
                context: format!("latitudes of '{}'", self.short_name),
                expected: self.values.len(),
                found: self.grid.lats.len(),
            });
        }
        if self.grid.lons.len() != self.values.len() {
            return Err(WeatherError::LengthMismatch {
                context: format!("longitudes of '{}'", self.short_name),
                expected: self.values.len(),
                found: self.grid.lons.len(),
            });
        }
        if self.validity_date_time < self.valid_date_time {
            return Err(WeatherError::InvalidFormat(format!(
                "'{}' is valid at {} before its base time {}",
                self.short_name, self.validity_date_time, self.valid_date_time
            )));
        }
        Ok(())
    }

    /// Drop the provenance tag.
    pub fn into_record(self) -> WeatherRecord {
        WeatherRecord {
            short_name: self.short_name,
            valid_date_time: self.valid_date_time,
            validity_date_time: self.validity_date_time,
            grid: self.grid,
            values: self.values,
        }
    }
}

/// Query result row: a message without its provenance tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    pub short_name: String,
    pub valid_date_time: NaiveDateTime,
    pub validity_date_time: NaiveDateTime,
    #[serde(flatten)]
    pub grid: PointSet,
    pub values: Vec<f64>,
}

impl WeatherRecord {
    /// Forecast lead in calendar days.
    pub fn day_offset(&self) -> i64 {
        self.validity_date_time
            .date()
            .signed_duration_since(self.valid_date_time.date())
            .num_days()
    }

    /// Forecast lead in whole hours.
    pub fn hour_offset(&self) -> i64 {
        self.validity_date_time
            .signed_duration_since(self.valid_date_time)
            .num_hours()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn grid() -> PointSet {
        PointSet::new(vec![46.0, 46.5], vec![14.0, 14.5]).unwrap()
    }

    #[test]
    fn test_validate_shape() {
        let ok = Message::new("2t", vec![280.0, 281.0], at(10, 0), at(10, 6), grid(), MessageType::Forecast);
        assert!(ok.validate_shape().is_ok());

        let short = Message::new("2t", vec![280.0], at(10, 0), at(10, 6), grid(), MessageType::Forecast);
        assert!(short.validate_shape().is_err());

        let backwards = Message::new("2t", vec![280.0, 281.0], at(10, 6), at(10, 0), grid(), MessageType::Forecast);
        assert!(backwards.validate_shape().is_err());
    }

    #[test]
    fn test_json_field_names() {
        let message = Message::new("10u", vec![1.5, 2.5], at(10, 0), at(11, 12), grid(), MessageType::Actual);
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["shortName"], "10u");
        assert_eq!(json["type"], "an");
        assert_eq!(json["lats"][1], 46.5);
        assert!(json.get("validityDateTime").is_some());

        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_offsets() {
        let record = Message::new("tp", vec![0.0, 0.0], at(10, 12), at(12, 6), grid(), MessageType::Forecast)
            .into_record();
        assert_eq!(record.day_offset(), 2);
        assert_eq!(record.hour_offset(), 42);
    }
}
