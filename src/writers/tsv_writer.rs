use crate::error::{Result, WeatherError};
use crate::models::WeatherRecord;
use chrono::NaiveDateTime;
use clap::ValueEnum;
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const WIDE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const WIDE_KEY_COLUMNS: [&str; 4] = ["date", "offset", "latitude", "longitude"];

/// Row layout of the exported file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TsvLayout {
    /// One row per record and point
    #[default]
    Long,
    /// One row per base time, validity time and point, one column per parameter
    Wide,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRow<'a> {
    short_name: &'a str,
    valid_date_time: NaiveDateTime,
    validity_date_time: NaiveDateTime,
    day_offset: i64,
    point: usize,
    lat: f64,
    lon: f64,
    value: f64,
}

/// Writes query results as tab-separated text.
pub struct TsvWriter {
    layout: TsvLayout,
    skip_params: Vec<String>,
}

impl TsvWriter {
    pub fn new() -> Self {
        Self {
            layout: TsvLayout::Long,
            skip_params: Vec::new(),
        }
    }

    pub fn with_layout(mut self, layout: TsvLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Leave out parameters, e.g. `ptype` whose codes make no sense averaged.
    pub fn with_skipped_params(mut self, params: &[&str]) -> Self {
        self.skip_params = params.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Write records to a file, returning the number of rows written
    pub fn write_records(&self, records: &[WeatherRecord], path: &Path) -> Result<usize> {
        let file = File::create(path)?;
        self.write_to(records, file)
    }

    pub fn write_to<W: Write>(&self, records: &[WeatherRecord], writer: W) -> Result<usize> {
        let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(writer);
        let records: Vec<&WeatherRecord> = records
            .iter()
            .filter(|r| !self.skip_params.contains(&r.short_name))
            .collect();

        let rows = match self.layout {
            TsvLayout::Long => Self::write_long(&records, &mut writer)?,
            TsvLayout::Wide => Self::write_wide(&records, &mut writer)?,
        };

        writer.flush()?;
        Ok(rows)
    }

    fn write_long<W: Write>(records: &[&WeatherRecord], writer: &mut Writer<W>) -> Result<usize> {
        let mut rows = 0;
        for record in records {
            let day_offset = record.day_offset();
            for (point, (location, &value)) in record.grid.iter().zip(&record.values).enumerate() {
                writer.serialize(ExportRow {
                    short_name: &record.short_name,
                    valid_date_time: record.valid_date_time,
                    validity_date_time: record.validity_date_time,
                    day_offset,
                    point,
                    lat: location.lat,
                    lon: location.lon,
                    value,
                })?;
                rows += 1;
            }
        }
        Ok(rows)
    }

    /// Parameters missing from a time group are left empty. The first record
    /// of a parameter in a group wins.
    fn write_wide<W: Write>(records: &[&WeatherRecord], writer: &mut Writer<W>) -> Result<usize> {
        let params: BTreeSet<&str> = records.iter().map(|r| r.short_name.as_str()).collect();

        let mut header: Vec<&str> = WIDE_KEY_COLUMNS.to_vec();
        header.extend(params.iter().copied());
        writer.write_record(&header)?;

        let mut groups: BTreeMap<(NaiveDateTime, NaiveDateTime), BTreeMap<&str, &WeatherRecord>> =
            BTreeMap::new();
        for &record in records {
            groups
                .entry((record.valid_date_time, record.validity_date_time))
                .or_default()
                .entry(record.short_name.as_str())
                .or_insert(record);
        }

        let mut rows = 0;
        for ((valid, validity), group) in &groups {
            let Some(first) = group.values().next() else {
                continue;
            };
            let grid = &first.grid;

            for record in group.values() {
                if record.values.len() != grid.len() {
                    return Err(WeatherError::LengthMismatch {
                        context: format!("'{}' values at {} -> {}", record.short_name, valid, validity),
                        expected: grid.len(),
                        found: record.values.len(),
                    });
                }
            }

            let date = valid.format(WIDE_DATE_FORMAT).to_string();
            let offset = first.hour_offset().to_string();
            for (point, location) in grid.iter().enumerate() {
                let mut row = vec![
                    date.clone(),
                    offset.clone(),
                    format_value(location.lat),
                    format_value(location.lon),
                ];
                row.extend(params.iter().map(|name| {
                    group
                        .get(name)
                        .map(|r| format_value(r.values[point]))
                        .unwrap_or_default()
                }));
                writer.write_record(&row)?;
                rows += 1;
            }
        }
        Ok(rows)
    }
}

// Shortest round-trip form, keeping the trailing `.0` of whole numbers
fn format_value(value: f64) -> String {
    format!("{:?}", value)
}

impl Default for TsvWriter {
    fn default() -> Self {
        Self::new()
    }
}
