use crate::error::{Result, WeatherError};
use crate::models::Message;
use crate::utils::constants::{
    KELVIN_OFFSET, MAGNUS_A, MAGNUS_B, PARAM_DEWPOINT, PARAM_RELATIVE_HUMIDITY,
    PARAM_TEMPERATURE, PARAM_WIND_SPEED, PARAM_WIND_U, PARAM_WIND_V,
};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// A parameter computed point by point from two base parameters.
#[derive(Debug, Clone, Copy)]
pub struct DerivedDefinition {
    pub output: &'static str,
    pub inputs: [&'static str; 2],
    pub formula: fn(f64, f64) -> f64,
}

impl DerivedDefinition {
    pub fn wind_speed() -> Self {
        Self {
            output: PARAM_WIND_SPEED,
            inputs: [PARAM_WIND_U, PARAM_WIND_V],
            formula: wind_speed,
        }
    }

    pub fn relative_humidity() -> Self {
        Self {
            output: PARAM_RELATIVE_HUMIDITY,
            inputs: [PARAM_TEMPERATURE, PARAM_DEWPOINT],
            formula: relative_humidity,
        }
    }

    fn apply(&self, first: &Message, second: &Message) -> Result<Message> {
        if first.values.len() != second.values.len() {
            return Err(WeatherError::LengthMismatch {
                context: format!("inputs of derived parameter '{}'", self.output),
                expected: first.values.len(),
                found: second.values.len(),
            });
        }

        let values = first
            .values
            .iter()
            .zip(&second.values)
            .map(|(&a, &b)| (self.formula)(a, b))
            .collect();

        Ok(Message {
            short_name: self.output.to_string(),
            values,
            valid_date_time: first.valid_date_time,
            validity_date_time: first.validity_date_time,
            grid: first.grid.clone(),
            kind: first.kind,
        })
    }
}

/// Wind speed in m/s from the U and V components.
pub fn wind_speed(u: f64, v: f64) -> f64 {
    (u * u + v * v).sqrt()
}

/// Relative humidity in percent from 2 m temperature and dewpoint in Kelvin,
/// using the Magnus approximation (Lawrence 2005, BAMS 86-2).
pub fn relative_humidity(temperature: f64, dewpoint: f64) -> f64 {
    let t_surface = temperature - KELVIN_OFFSET;
    let t_dew = dewpoint - KELVIN_OFFSET;
    100.0 * ((MAGNUS_A * t_dew) / (MAGNUS_B + t_dew)).exp()
        / ((MAGNUS_A * t_surface) / (MAGNUS_B + t_surface)).exp()
}

/// Extends a message set with parameters derived from base parameters.
pub struct ParameterExtender {
    definitions: Vec<DerivedDefinition>,
}

impl ParameterExtender {
    pub fn new() -> Self {
        Self {
            definitions: vec![
                DerivedDefinition::wind_speed(),
                DerivedDefinition::relative_humidity(),
            ],
        }
    }

    /// Append derived messages for every base/validity time group that has
    /// all inputs of a definition and not yet its output.
    ///
    /// Existing messages are kept untouched, so running this twice is a no-op
    /// the second time.
    pub fn extend(&self, mut messages: Vec<Message>) -> Result<Vec<Message>> {
        let mut derived = Vec::new();
        {
            let groups = self.group_by_time(&messages);

            for definition in &self.definitions {
                let mut added = 0usize;
                for ((base, validity), group) in &groups {
                    if group.contains_key(definition.output) {
                        continue;
                    }

                    let (Some(first), Some(second)) = (
                        group.get(definition.inputs[0]),
                        group.get(definition.inputs[1]),
                    ) else {
                        debug!(
                            "Skipping '{}' for {} -> {}: inputs missing",
                            definition.output, base, validity
                        );
                        continue;
                    };

                    derived.push(definition.apply(first, second)?);
                    added += 1;
                }

                if added > 0 {
                    info!("Derived {} '{}' messages", added, definition.output);
                }
            }
        }

        messages.extend(derived);
        Ok(messages)
    }

    /// Group messages by base and validity time, then by parameter name.
    /// The first message of a parameter in a group wins.
    fn group_by_time<'a>(
        &self,
        messages: &'a [Message],
    ) -> BTreeMap<(NaiveDateTime, NaiveDateTime), BTreeMap<&'a str, &'a Message>> {
        let mut grouped: BTreeMap<_, BTreeMap<&str, &Message>> = BTreeMap::new();

        for message in messages {
            grouped
                .entry((message.valid_date_time, message.validity_date_time))
                .or_default()
                .entry(message.short_name.as_str())
                .or_insert(message);
        }

        grouped
    }
}

impl Default for ParameterExtender {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageType, PointSet};
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn message(name: &str, values: Vec<f64>, validity_hour: u32) -> Message {
        let grid = PointSet::new(vec![46.0; values.len()], vec![14.5; values.len()]).unwrap();
        Message::new(name, values, at(10, 0), at(10, validity_hour), grid, MessageType::Forecast)
    }

    #[test]
    fn test_wind_speed() {
        let messages = vec![message("10u", vec![3.0], 6), message("10v", vec![4.0], 6)];
        let extended = ParameterExtender::new().extend(messages).unwrap();

        assert_eq!(extended.len(), 3);
        let ws = &extended[2];
        assert_eq!(ws.short_name, "ws");
        assert_eq!(ws.values, vec![5.0]);
        assert_eq!(ws.validity_date_time, at(10, 6));
        assert_eq!(ws.kind, MessageType::Forecast);
    }

    #[test]
    fn test_relative_humidity() {
        let messages = vec![message("2t", vec![293.15], 0), message("2d", vec![283.15], 0)];
        let extended = ParameterExtender::new().extend(messages).unwrap();

        let rh = extended.iter().find(|m| m.short_name == "rh").unwrap();
        assert!(rh.values[0] > 40.0 && rh.values[0] < 60.0);
        assert!((rh.values[0] - 52.6).abs() < 0.1);
    }

    #[test]
    fn test_saturated_air() {
        assert!((relative_humidity(283.15, 283.15) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_extend_is_idempotent() {
        let messages = vec![
            message("10u", vec![3.0, 1.0], 0),
            message("10v", vec![4.0, 1.0], 0),
            message("2t", vec![293.15, 280.0], 0),
            message("2d", vec![283.15, 275.0], 0),
            message("10u", vec![0.0, 2.0], 6),
            message("10v", vec![1.0, 0.0], 6),
        ];
        let extender = ParameterExtender::new();
        let once = extender.extend(messages).unwrap();
        let twice = extender.extend(once.clone()).unwrap();

        assert_eq!(once.len(), 9);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_missing_inputs_are_skipped() {
        // 10v only exists at 06, so wind speed is only derived there
        let messages = vec![
            message("10u", vec![3.0], 0),
            message("10u", vec![3.0], 6),
            message("10v", vec![4.0], 6),
            message("2t", vec![290.0], 6),
        ];
        let extended = ParameterExtender::new().extend(messages).unwrap();

        let derived: Vec<_> = extended.iter().skip(4).collect();
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].short_name, "ws");
        assert_eq!(derived[0].validity_date_time, at(10, 6));
    }

    #[test]
    fn test_existing_output_is_kept() {
        let messages = vec![
            message("10u", vec![3.0], 0),
            message("10v", vec![4.0], 0),
            message("ws", vec![7.0], 0),
        ];
        let extended = ParameterExtender::new().extend(messages.clone()).unwrap();
        assert_eq!(extended, messages);
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        let messages = vec![message("10u", vec![3.0, 1.0], 0), message("10v", vec![4.0], 0)];
        assert!(matches!(
            ParameterExtender::new().extend(messages),
            Err(WeatherError::LengthMismatch { .. })
        ));
    }
}
