use crate::error::{Result, WeatherError};
use crate::models::{Message, MessageType};
use crate::utils::constants::ACCUMULATED_PARAMS;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct StoreSummary {
    pub total_messages: usize,
    pub forecast_messages: usize,
    pub actual_messages: usize,
    pub parameters: BTreeMap<String, usize>,
    pub base_range: (NaiveDateTime, NaiveDateTime),
    pub validity_range: (NaiveDateTime, NaiveDateTime),
    pub grid: GridSummary,
}

#[derive(Debug)]
pub struct GridSummary {
    pub points: usize,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

pub struct StoreAnalyzer;

impl StoreAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, messages: &[Message]) -> Result<StoreSummary> {
        let first = messages
            .first()
            .ok_or_else(|| WeatherError::validation("No messages to summarize"))?;

        let mut parameters = BTreeMap::new();
        let mut forecast_messages = 0;
        let mut actual_messages = 0;
        let mut base_range = (first.valid_date_time, first.valid_date_time);
        let mut validity_range = (first.validity_date_time, first.validity_date_time);

        for message in messages {
            *parameters.entry(message.short_name.clone()).or_insert(0) += 1;

            match message.kind {
                MessageType::Forecast => forecast_messages += 1,
                MessageType::Actual => actual_messages += 1,
            }

            base_range.0 = base_range.0.min(message.valid_date_time);
            base_range.1 = base_range.1.max(message.valid_date_time);
            validity_range.0 = validity_range.0.min(message.validity_date_time);
            validity_range.1 = validity_range.1.max(message.validity_date_time);
        }

        // Grids do not change between messages, the first one is representative
        let (min_lat, max_lat, min_lon, max_lon) = first
            .grid
            .bounds()
            .ok_or_else(|| WeatherError::InvalidFormat("first message has an empty grid".to_string()))?;

        Ok(StoreSummary {
            total_messages: messages.len(),
            forecast_messages,
            actual_messages,
            parameters,
            base_range,
            validity_range,
            grid: GridSummary {
                points: first.grid.len(),
                min_lat,
                max_lat,
                min_lon,
                max_lon,
            },
        })
    }
}

impl Default for StoreAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreSummary {
    pub fn summary(&self) -> String {
        let parameters = self
            .parameters
            .iter()
            .map(|(name, count)| {
                let marker = if ACCUMULATED_PARAMS.contains(&name.as_str()) {
                    "*"
                } else {
                    ""
                };
                format!("{}{} ({})", name, marker, count)
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Messages: {} total ({} forecast, {} actual)\n\
            Parameters: {}\n\
            Base times: {} to {} ({} days)\n\
            Validity times: {} to {}\n\
            Grid: {} points, {:.2}°N-{:.2}°N, {:.2}°E-{:.2}°E\n\
            (* accumulated from the start of the forecast)",
            self.total_messages,
            self.forecast_messages,
            self.actual_messages,
            parameters,
            self.base_range.0,
            self.base_range.1,
            self.base_range
                .1
                .date()
                .signed_duration_since(self.base_range.0.date())
                .num_days()
                + 1,
            self.validity_range.0,
            self.validity_range.1,
            self.grid.points,
            self.grid.min_lat,
            self.grid.max_lat,
            self.grid.min_lon,
            self.grid.max_lon
        )
    }
}
