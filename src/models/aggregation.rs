use chrono::{Datelike, Days, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::{Result, WeatherError};
use crate::models::{BoundingBox, Point};

/// Temporal aggregation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggTime {
    #[default]
    Hour,
    Day,
    Week,
}

impl AggTime {
    /// Start label of the bucket `timestamp` falls in.
    ///
    /// Weeks run Monday to Sunday and are labelled by their closing Sunday.
    pub fn bucket(&self, timestamp: NaiveDateTime) -> NaiveDateTime {
        match self {
            AggTime::Hour => timestamp,
            AggTime::Day => floor_day(timestamp),
            AggTime::Week => {
                let to_sunday = 6 - timestamp.weekday().num_days_from_monday();
                let sunday = timestamp.date() + Days::new(u64::from(to_sunday));
                sunday.and_time(NaiveTime::MIN)
            }
        }
    }
}

pub(crate) fn floor_day(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp.date().and_time(NaiveTime::MIN)
}

impl FromStr for AggTime {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "hour" | "h" => Ok(AggTime::Hour),
            "day" | "d" => Ok(AggTime::Day),
            "week" | "w" => Ok(AggTime::Week),
            _ => Err(WeatherError::validation(format!(
                "unsupported time aggregation '{}', expected hour, day or week",
                s
            ))),
        }
    }
}

impl fmt::Display for AggTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggTime::Hour => "hour",
            AggTime::Day => "day",
            AggTime::Week => "week",
        };
        f.write_str(name)
    }
}

/// How grid values are reduced onto the target points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggPolicy {
    /// Each target takes the value of its nearest grid point.
    One,
    /// Each grid point contributes to the mean of its nearest target.
    Mean,
}

impl FromStr for AggPolicy {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "one" => Ok(AggPolicy::One),
            "mean" => Ok(AggPolicy::Mean),
            _ => Err(WeatherError::validation(format!(
                "unsupported aggregation policy '{}', expected one or mean",
                s
            ))),
        }
    }
}

/// Spatial aggregation level.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AggLoc {
    /// Native grid, no aggregation
    #[default]
    Grid,
    Points(Vec<Point>),
    /// Configured country centroid
    Country,
    BoundingBox(BoundingBox),
}

impl AggLoc {
    /// Build a location mode from its name and the optional arguments it may need.
    pub fn from_args(
        kind: &str,
        points: Option<Vec<Point>>,
        bounding_box: Option<BoundingBox>,
    ) -> Result<Self> {
        match kind.to_lowercase().as_str() {
            "grid" => Ok(AggLoc::Grid),
            "country" => Ok(AggLoc::Country),
            "points" => {
                let points = points.ok_or_else(|| {
                    WeatherError::validation("points cannot be empty if aggloc is set to 'points'")
                })?;
                let aggloc = AggLoc::Points(points);
                aggloc.validate()?;
                Ok(aggloc)
            }
            "bbox" => bounding_box.map(AggLoc::BoundingBox).ok_or_else(|| {
                WeatherError::validation("bounding box cannot be empty if aggloc is set to 'bbox'")
            }),
            _ => Err(WeatherError::validation(format!(
                "unsupported location aggregation '{}', expected grid, points, country or bbox",
                kind
            ))),
        }
    }

    /// Policy used when the caller does not choose one.
    pub fn default_policy(&self) -> AggPolicy {
        match self {
            AggLoc::BoundingBox(_) => AggPolicy::Mean,
            _ => AggPolicy::One,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let AggLoc::Points(points) = self {
            if points.is_empty() {
                return Err(WeatherError::validation(
                    "points cannot be empty if aggloc is set to 'points'",
                ));
            }
            for point in points {
                point.validate()?;
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        match self {
            AggLoc::Grid => "grid",
            AggLoc::Points(_) => "points",
            AggLoc::Country => "country",
            AggLoc::BoundingBox(_) => "bbox",
        }
    }
}

/// Aggregation settings shared by actual and forecast queries.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub aggtime: AggTime,
    pub aggloc: AggLoc,
    /// Overrides [`AggLoc::default_policy`]
    pub policy: Option<AggPolicy>,
}

impl QueryOptions {
    pub fn new(aggtime: AggTime, aggloc: AggLoc) -> Self {
        Self {
            aggtime,
            aggloc,
            policy: None,
        }
    }

    pub fn with_policy(mut self, policy: AggPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn policy(&self) -> AggPolicy {
        self.policy.unwrap_or_else(|| self.aggloc.default_policy())
    }
}
