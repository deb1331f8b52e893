use crate::error::{Result, WeatherError};
use crate::models::aggregation::floor_day;
use crate::models::{AggTime, WeatherRecord};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use tracing::debug;

type GroupKey = (NaiveDateTime, NaiveDateTime, String);

/// Buckets records over time and reduces each bucket by the element-wise mean.
pub struct TemporalAggregator;

impl TemporalAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Group by (base day, validity bucket, parameter) and average the values
    /// of each group. `AggTime::Hour` returns the records unchanged.
    pub fn aggregate(&self, records: Vec<WeatherRecord>, aggtime: AggTime) -> Result<Vec<WeatherRecord>> {
        if aggtime == AggTime::Hour {
            return Ok(records);
        }

        let input_len = records.len();
        let grouped = self.group_by_bucket(records, aggtime);

        let result = grouped
            .into_iter()
            .map(|((base_day, bucket, short_name), members)| {
                let values = Self::mean_values(&short_name, bucket, &members)?;
                let grid = members[0].grid.clone();
                Ok(WeatherRecord {
                    short_name,
                    valid_date_time: base_day,
                    validity_date_time: bucket,
                    grid,
                    values,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Aggregated {} records into {} {} buckets",
            input_len,
            result.len(),
            aggtime
        );
        Ok(result)
    }

    fn group_by_bucket(
        &self,
        records: Vec<WeatherRecord>,
        aggtime: AggTime,
    ) -> BTreeMap<GroupKey, Vec<WeatherRecord>> {
        let mut grouped: BTreeMap<GroupKey, Vec<WeatherRecord>> = BTreeMap::new();

        for record in records {
            let key = (
                floor_day(record.valid_date_time),
                aggtime.bucket(record.validity_date_time),
                record.short_name.clone(),
            );
            grouped.entry(key).or_default().push(record);
        }

        grouped
    }

    fn mean_values(short_name: &str, bucket: NaiveDateTime, members: &[WeatherRecord]) -> Result<Vec<f64>> {
        let len = members[0].values.len();
        let mut sums = vec![0.0; len];

        for member in members {
            if member.values.len() != len {
                return Err(WeatherError::LengthMismatch {
                    context: format!("'{}' values in bucket {}", short_name, bucket),
                    expected: len,
                    found: member.values.len(),
                });
            }
            for (sum, value) in sums.iter_mut().zip(&member.values) {
                *sum += value;
            }
        }

        let count = members.len() as f64;
        Ok(sums.into_iter().map(|sum| sum / count).collect())
    }
}

impl Default for TemporalAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PointSet;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn record(name: &str, base: NaiveDateTime, validity: NaiveDateTime, values: Vec<f64>) -> WeatherRecord {
        WeatherRecord {
            short_name: name.to_string(),
            valid_date_time: base,
            validity_date_time: validity,
            grid: PointSet::new(vec![46.0; values.len()], vec![14.5; values.len()]).unwrap(),
            values,
        }
    }

    #[test]
    fn test_hour_is_identity() {
        let records = vec![
            record("2t", at(10, 0), at(10, 6), vec![2.0]),
            record("2t", at(10, 0), at(10, 3), vec![4.0]),
        ];
        let result = TemporalAggregator::new().aggregate(records.clone(), AggTime::Hour).unwrap();
        assert_eq!(result, records);
    }

    #[test]
    fn test_day_mean() {
        let records = vec![
            record("2t", at(10, 0), at(10, 6), vec![2.0]),
            record("2t", at(10, 0), at(10, 12), vec![4.0]),
        ];
        let result = TemporalAggregator::new().aggregate(records, AggTime::Day).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].values, vec![3.0]);
        assert_eq!(result[0].valid_date_time, at(10, 0));
        assert_eq!(result[0].validity_date_time, at(10, 0));
    }

    #[test]
    fn test_groups_split_by_parameter_and_base_day() {
        let records = vec![
            record("tp", at(10, 0), at(11, 6), vec![1.0, 3.0]),
            record("2t", at(10, 12), at(11, 6), vec![280.0, 282.0]),
            record("2t", at(10, 0), at(11, 18), vec![284.0, 286.0]),
            record("2t", at(9, 0), at(11, 6), vec![270.0, 270.0]),
        ];
        let result = TemporalAggregator::new().aggregate(records, AggTime::Day).unwrap();

        let keys: Vec<_> = result
            .iter()
            .map(|r| (r.valid_date_time, r.short_name.as_str()))
            .collect();
        assert_eq!(keys, vec![(at(9, 0), "2t"), (at(10, 0), "2t"), (at(10, 0), "tp")]);
        // 00 and 12 runs of the same day share a group
        assert_eq!(result[1].values, vec![282.0, 284.0]);
        assert_eq!(result[2].values, vec![1.0, 3.0]);
    }

    #[test]
    fn test_week_mean() {
        // Mon 7th and Sun 13th fall in one week, Mon 14th starts the next
        let records = vec![
            record("ws", at(7, 0), at(7, 0), vec![1.0]),
            record("ws", at(7, 0), at(13, 0), vec![3.0]),
            record("ws", at(7, 0), at(14, 0), vec![10.0]),
        ];
        let result = TemporalAggregator::new().aggregate(records, AggTime::Week).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].validity_date_time, at(13, 0));
        assert_eq!(result[0].values, vec![2.0]);
        assert_eq!(result[1].validity_date_time, at(20, 0));
        assert_eq!(result[1].values, vec![10.0]);
    }

    #[test]
    fn test_mismatched_lengths() {
        let records = vec![
            record("2t", at(10, 0), at(10, 6), vec![2.0]),
            record("2t", at(10, 0), at(10, 12), vec![4.0, 5.0]),
        ];
        assert!(matches!(
            TemporalAggregator::new().aggregate(records, AggTime::Day),
            Err(WeatherError::LengthMismatch { .. })
        ));
    }
}
