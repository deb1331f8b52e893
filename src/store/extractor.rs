use crate::error::{Result, WeatherError};
use crate::models::{Message, Point, QueryOptions, WeatherRecord};
use crate::processors::{ParameterExtender, SpatialAggregator, TemporalAggregator};
use crate::readers::{write_snapshot, LoadFormat};
use crate::utils::progress::ProgressReporter;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Lifecycle of the message store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Empty,
    /// Messages loaded as they were stored
    Loaded,
    /// Messages loaded and extended with derived parameters
    Extended,
}

/// In-memory message store answering actual-weather and forecast queries.
///
/// The best estimate of actual weather for a day is the forecast issued on
/// that same day.
pub struct WeatherExtractor {
    messages: Vec<Message>,
    state: StoreState,
    extender: ParameterExtender,
    spatial: SpatialAggregator,
    temporal: TemporalAggregator,
}

impl WeatherExtractor {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            state: StoreState::Empty,
            extender: ParameterExtender::new(),
            spatial: SpatialAggregator::new(),
            temporal: TemporalAggregator::new(),
        }
    }

    /// Use a different centroid for country aggregation.
    pub fn with_country(mut self, country: Point) -> Self {
        self.spatial = SpatialAggregator::with_country(country);
        self
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Replace the store with a batch of decoded messages and derive the
    /// computed parameters.
    pub fn load_messages(&mut self, messages: Vec<Message>) -> Result<()> {
        let extended = self.extender.extend(messages)?;
        self.replace(extended, StoreState::Extended);
        Ok(())
    }

    /// Replace the store with the contents of the given files.
    ///
    /// The format is inferred from the file names when not given. Only
    /// decoded message batches are extended with derived parameters.
    pub fn load<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        format: Option<LoadFormat>,
        progress: Option<&ProgressReporter>,
    ) -> Result<()> {
        let format = match format {
            Some(format) => format,
            None => LoadFormat::infer(paths)?,
        };

        let mut messages = Vec::new();
        for (i, path) in paths.iter().enumerate() {
            let path = path.as_ref();
            if let Some(progress) = progress {
                progress.set_message(&format!("Loading {}", path.display()));
            }
            messages.extend(format.read(path)?);
            if let Some(progress) = progress {
                progress.update((i + 1) as u64);
            }
        }

        if format.needs_extension() {
            let extended = self.extender.extend(messages)?;
            self.replace(extended, StoreState::Extended);
        } else {
            self.replace(messages, StoreState::Loaded);
        }
        Ok(())
    }

    /// Write the current messages to a snapshot file, returning its path.
    pub fn store(&self, path: &Path) -> Result<PathBuf> {
        write_snapshot(&self.messages, path)
    }

    fn replace(&mut self, mut messages: Vec<Message>, state: StoreState) {
        // Stable, so messages sharing a base time keep their load order
        messages.sort_by_key(|m| m.valid_date_time);
        info!("Loaded {} messages ({:?})", messages.len(), state);
        self.messages = messages;
        self.state = state;
    }

    /// Best estimate of actual weather for each day in `[from_date, to_date]`:
    /// forecasts valid on the same day they were issued.
    pub fn get_actual(
        &self,
        from_date: NaiveDate,
        to_date: NaiveDate,
        options: &QueryOptions,
    ) -> Result<Vec<WeatherRecord>> {
        if from_date > to_date {
            return Err(WeatherError::validation(format!(
                "from date {} is after to date {}",
                from_date, to_date
            )));
        }
        options.aggloc.validate()?;

        let selected: Vec<&Message> = self
            .messages
            .iter()
            .filter(|m| {
                let base = m.valid_date_time.date();
                (from_date..=to_date).contains(&base) && m.validity_date_time.date() == base
            })
            .collect();

        debug!(
            "Actual weather {} to {}: {} messages selected",
            from_date,
            to_date,
            selected.len()
        );
        self.aggregate(selected, options)
    }

    /// Forecast issued on `base_date` for the days `[from_date, to_date]`.
    pub fn get_forecast(
        &self,
        base_date: NaiveDate,
        from_date: NaiveDate,
        to_date: NaiveDate,
        options: &QueryOptions,
    ) -> Result<Vec<WeatherRecord>> {
        if !(base_date <= from_date && from_date <= to_date) {
            return Err(WeatherError::validation(format!(
                "expected base date <= from date <= to date, got {} / {} / {}",
                base_date, from_date, to_date
            )));
        }
        options.aggloc.validate()?;

        let selected: Vec<&Message> = self
            .messages
            .iter()
            .filter(|m| {
                m.valid_date_time.date() == base_date
                    && (from_date..=to_date).contains(&m.validity_date_time.date())
            })
            .collect();

        debug!(
            "Forecast from {} for {} to {}: {} messages selected",
            base_date,
            from_date,
            to_date,
            selected.len()
        );
        self.aggregate(selected, options)
    }

    /// Drop provenance, then aggregate over space and time.
    fn aggregate(&self, selected: Vec<&Message>, options: &QueryOptions) -> Result<Vec<WeatherRecord>> {
        if selected.is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<WeatherRecord> = selected
            .into_iter()
            .map(|m| m.clone().into_record())
            .collect();

        let records = self
            .spatial
            .aggregate_with_policy(records, &options.aggloc, options.policy())?;
        self.temporal.aggregate(records, options.aggtime)
    }
}

impl Default for WeatherExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AggLoc, AggTime, BoundingBox, MessageType, PointSet};
    use chrono::NaiveDateTime;
    use pretty_assertions::assert_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 5, day).unwrap()
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        date(day).and_hms_opt(hour, 0, 0).unwrap()
    }

    fn grid() -> PointSet {
        PointSet::new(vec![45.0, 45.0, 46.0, 46.0], vec![13.0, 14.0, 13.0, 14.0]).unwrap()
    }

    fn message(name: &str, base: NaiveDateTime, validity: NaiveDateTime, values: Vec<f64>) -> Message {
        Message::new(name, values, base, validity, grid(), MessageType::Forecast)
    }

    /// Forecasts issued on the 10th and 11th, each running two days ahead
    fn extractor() -> WeatherExtractor {
        let mut messages = Vec::new();
        for base_day in [11, 10] {
            let base = at(base_day, 0);
            for (offset, hour) in [(0, 6), (0, 18), (1, 6), (2, 6)] {
                let validity = at(base_day + offset, hour);
                let v = (base_day * 100 + offset * 10) as f64 + hour as f64 / 6.0;
                messages.push(message("2t", base, validity, vec![v, v + 1.0, v + 2.0, v + 3.0]));
                messages.push(message("10u", base, validity, vec![3.0; 4]));
                messages.push(message("10v", base, validity, vec![4.0; 4]));
            }
        }

        let mut extractor = WeatherExtractor::new();
        extractor.load_messages(messages).unwrap();
        extractor
    }

    #[test]
    fn test_load_extends_and_sorts() {
        let extractor = extractor();
        assert_eq!(extractor.state(), StoreState::Extended);
        assert_eq!(extractor.len(), 32);
        assert!(extractor
            .messages()
            .windows(2)
            .all(|w| w[0].valid_date_time <= w[1].valid_date_time));
        assert_eq!(
            extractor.messages().iter().filter(|m| m.short_name == "ws").count(),
            8
        );
    }

    #[test]
    fn test_fresh_load_replaces_state() {
        let mut extractor = extractor();
        extractor
            .load_messages(vec![message("2t", at(12, 0), at(12, 6), vec![1.0; 4])])
            .unwrap();
        assert_eq!(extractor.len(), 1);
    }

    #[test]
    fn test_actual_keeps_same_day_forecasts() {
        let extractor = extractor();
        let result = extractor
            .get_actual(date(10), date(11), &QueryOptions::default())
            .unwrap();

        // 2 same-day validity times per base day, 4 parameters each
        assert_eq!(result.len(), 16);
        assert!(result
            .iter()
            .all(|r| r.validity_date_time.date() == r.valid_date_time.date()));
    }

    #[test]
    fn test_grid_hour_roundtrip() {
        let extractor = extractor();
        let result = extractor
            .get_forecast(date(10), date(10), date(12), &QueryOptions::default())
            .unwrap();

        let loaded: Vec<WeatherRecord> = extractor
            .messages()
            .iter()
            .filter(|m| m.valid_date_time.date() == date(10))
            .map(|m| m.clone().into_record())
            .collect();
        assert_eq!(result, loaded);
    }

    #[test]
    fn test_forecast_same_day_window() {
        let extractor = extractor();
        let result = extractor
            .get_forecast(date(10), date(10), date(10), &QueryOptions::default())
            .unwrap();

        assert_eq!(result.len(), 8);
        assert!(result.iter().all(|r| r.day_offset() == 0));
    }

    #[test]
    fn test_midday_run_is_selected_by_calendar_date() {
        let mut extractor = extractor();
        let mut messages = extractor.messages().to_vec();
        messages.push(message("2t", at(12, 12), at(12, 18), vec![7.0; 4]));
        messages.push(message("2t", at(12, 12), at(13, 6), vec![8.0; 4]));
        extractor.load_messages(messages).unwrap();

        let options = QueryOptions::default();
        let actual = extractor.get_actual(date(12), date(12), &options).unwrap();
        assert_eq!(actual.len(), 1);
        assert_eq!(actual[0].valid_date_time, at(12, 12));
        assert_eq!(actual[0].validity_date_time, at(12, 18));

        let forecast = extractor
            .get_forecast(date(12), date(12), date(13), &options)
            .unwrap();
        let validities: Vec<_> = forecast.iter().map(|r| r.validity_date_time).collect();
        assert_eq!(validities, vec![at(12, 18), at(13, 6)]);
        assert!(forecast.iter().all(|r| r.valid_date_time == at(12, 12)));
    }

    #[test]
    fn test_forecast_daily_country() {
        let extractor = extractor().with_country(Point::new(45.0, 13.0));
        let options = QueryOptions::new(AggTime::Day, AggLoc::Country);
        let result = extractor
            .get_forecast(date(11), date(11), date(11), &options)
            .unwrap();

        let tt: Vec<_> = result.iter().filter(|r| r.short_name == "2t").collect();
        assert_eq!(tt.len(), 1);
        // mean of 1100 + 1 and 1100 + 3 at the first grid point
        assert_eq!(tt[0].values, vec![1102.0]);
        assert_eq!(tt[0].grid, PointSet::single(Point::new(45.0, 13.0)));
    }

    #[test]
    fn test_bbox_daily_mean() {
        let extractor = extractor();
        let bbox = BoundingBox::from_corners(Point::new(45.0, 13.0), Point::new(46.0, 14.0)).unwrap();
        let options = QueryOptions::new(AggTime::Day, AggLoc::BoundingBox(bbox));
        let result = extractor
            .get_actual(date(10), date(10), &options)
            .unwrap();

        let ws: Vec<_> = result.iter().filter(|r| r.short_name == "ws").collect();
        assert_eq!(ws.len(), 1);
        assert_eq!(ws[0].values, vec![5.0]);
    }

    #[test]
    fn test_empty_window_is_not_an_error() {
        let extractor = extractor();
        let options = QueryOptions::new(AggTime::Day, AggLoc::Country);
        assert!(extractor
            .get_actual(date(20), date(25), &options)
            .unwrap()
            .is_empty());
        assert!(WeatherExtractor::new()
            .get_forecast(date(1), date(1), date(2), &options)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_invalid_queries() {
        let extractor = extractor();
        let options = QueryOptions::default();

        assert!(extractor
            .get_actual(date(11), date(10), &options)
            .unwrap_err()
            .is_validation());
        assert!(extractor
            .get_forecast(date(11), date(10), date(12), &options)
            .unwrap_err()
            .is_validation());
        assert!(extractor
            .get_forecast(date(10), date(12), date(11), &options)
            .unwrap_err()
            .is_validation());

        let no_points = QueryOptions::new(AggTime::Hour, AggLoc::Points(vec![]));
        assert!(extractor
            .get_actual(date(10), date(11), &no_points)
            .unwrap_err()
            .is_validation());
    }
}
